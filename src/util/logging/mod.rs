//! 日志辅助：统一的事件名

pub mod standards;

pub use standards::events;
