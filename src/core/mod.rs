//! # Core Module
//!
//! Shared identifiers, configuration, and the error taxonomy used by every
//! feature.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use config::Config;
pub use error::{BotError, ParseError};
pub use types::{ChatRole, GroupId, UserId, UserRef};
