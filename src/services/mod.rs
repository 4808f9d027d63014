pub mod backend;
pub mod calendar;
pub mod grouping;
pub mod scanner;
pub mod wallet;
