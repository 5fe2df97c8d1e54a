pub mod dispatch;
pub mod listing;
