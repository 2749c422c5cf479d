//! # Command System
//!
//! Inbound message routing: slash commands and the reminder prefix.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod handler;
pub mod parse;

pub use handler::CommandHandler;
pub use parse::{classify, split_request, Command, Inbound, RequestError, REMINDER_KEYWORDS};
