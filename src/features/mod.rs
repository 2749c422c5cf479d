//! # Features
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod authorization;
pub mod membership;
pub mod reminders;

pub use reminders::{NotificationDispatcher, ReminderScheduler};
