//! # Transport
//!
//! Boundary to the chat platform. The core only talks to the platform through
//! `ChatTransport`; inbound traffic arrives as `InboundMessage`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod telegram;

use async_trait::async_trait;

use crate::core::{BotError, ChatRole, GroupId, UserId, UserRef};

pub use telegram::TelegramTransport;

/// Outbound calls the core makes into the chat platform
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Whether `user_id` currently belongs to `channel`
    async fn is_member_of_channel(&self, channel: &str, user_id: UserId) -> Result<bool, BotError>;

    /// Authoritative (user, role) list of a group's creator and administrators
    async fn get_administrators(&self, group_id: GroupId)
        -> Result<Vec<(UserId, ChatRole)>, BotError>;

    /// Post to a group chat; mentions in `text` use the platform's markup
    async fn send_to_group(&self, group_id: GroupId, text: &str) -> Result<(), BotError>;

    async fn send_direct(&self, user_id: UserId, text: &str) -> Result<(), BotError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
}

/// A text message received from a user
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub from: UserRef,
    pub text: String,
    /// Author of the message this one replies to
    pub reply_to: Option<UserRef>,
}
