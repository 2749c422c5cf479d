//! # Reminders Feature
//!
//! Dated group reminders: creation through the ledger, daily firing inside
//! the 2/1/0-day window, and fan-out to the group and to registered members.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod dates;
pub mod dispatcher;
pub mod firing;
pub mod ledger;
pub mod scheduler;

pub use dates::{normalize_digits, parse_due_date};
pub use dispatcher::{mention_text, DispatchReport, NotificationDispatcher};
pub use firing::{days_until, is_firing, FIRING_WINDOW};
pub use ledger::{create_reminder, list_reminders};
pub use scheduler::{ReminderScheduler, TickSummary};
