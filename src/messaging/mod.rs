pub mod dispatch;
pub mod message;
