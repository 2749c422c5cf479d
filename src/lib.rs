// Core layer - shared types, configuration and errors
pub mod core;

// Persistence
pub mod database;

// Features layer - membership, authorization, reminders
pub mod features;

// Chat platform boundary
pub mod transport;

// Application layer
pub mod commands;

#[cfg(test)]
mod testing;

pub use crate::core::Config;
pub use database::{Dataset, GroupState, GroupStore, MemberRecord, Reminder};
pub use features::{NotificationDispatcher, ReminderScheduler};
pub use transport::{ChatTransport, InboundMessage, TelegramTransport};
