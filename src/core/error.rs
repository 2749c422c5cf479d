//! Error taxonomy
//!
//! Every variant here is recoverable: handlers and the scheduler report or
//! log them and keep running.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use thiserror::Error;

/// Malformed due-date input. User-correctable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("`{0}` does not match YYYY.MM.DD")]
    Pattern(String),
    #[error("`{0}` is not a valid calendar date")]
    InvalidDate(String),
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Requester lacks the role needed for the action
    #[error("not authorized to {0}")]
    Authorization(&'static str),

    /// External authority (membership, role snapshot) unreachable
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// A single outbound send failed
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("persistence failed: {0}")]
    Persistence(String),
}

impl BotError {
    /// Delivery failure from a timed-out send
    pub fn timed_out(recipient: i64) -> Self {
        BotError::Delivery(format!("send to {recipient} timed out"))
    }
}
