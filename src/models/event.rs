use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Event {
    /// Resolves the event's start instant in UTC.
    ///
    /// `date` may be a full RFC 3339 timestamp, in which case `time` is ignored,
    /// or a bare `YYYY-MM-DD` date combined with an optional `HH:MM[:SS]` time.
    /// Returns `None` when the date is missing or unparseable.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        let time = self
            .time
            .as_deref()
            .map(str::trim)
            .and_then(|t| {
                NaiveTime::parse_from_str(t, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                    .ok()
            })
            .or_else(|| NaiveTime::from_hms_opt(0, 0, 0))?;
        Some(date.and_time(time).and_utc())
    }
}
