/// CSV export of drill event logs and timelines.
pub mod export;
