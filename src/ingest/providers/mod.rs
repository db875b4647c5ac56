pub mod calendar;
pub mod rss;
