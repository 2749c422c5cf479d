//! # Telegram Transport
//!
//! `ChatTransport` over the Telegram Bot HTTP API, plus long polling for
//! inbound updates.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::core::{BotError, ChatRole, GroupId, UserId, UserRef};

use super::{ChatKind, ChatTransport, InboundMessage};

const API_BASE: &str = "https://api.telegram.org";

/// Long-poll wait passed to getUpdates
pub const POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct TgMessage {
    #[serde(default)]
    from: Option<TgUser>,
    chat: TgChat,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    reply_to_message: Option<Box<TgMessage>>,
}

#[derive(Debug, Clone, Deserialize)]
struct TgUser {
    id: i64,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

impl TgUser {
    fn to_user_ref(&self) -> UserRef {
        let display_name = match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        };
        UserRef::new(self.id, self.username.clone(), display_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TgChat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TgChatMember {
    status: String,
    user: TgUser,
}

impl Update {
    /// Human text messages from private chats and groups; everything else is dropped
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let from = message.from.as_ref().filter(|u| !u.is_bot)?;
        let text = message.text.clone()?;

        let chat_kind = match message.chat.kind.as_str() {
            "private" => ChatKind::Private,
            "group" | "supergroup" => ChatKind::Group,
            _ => return None,
        };

        Some(InboundMessage {
            chat_id: message.chat.id,
            chat_kind,
            from: from.to_user_ref(),
            text,
            reply_to: message
                .reply_to_message
                .as_ref()
                .and_then(|m| m.from.as_ref())
                .map(TgUser::to_user_ref),
        })
    }
}

pub struct TelegramTransport {
    client: Client,
    base_url: String,
}

impl TelegramTransport {
    pub fn new(token: &str) -> Result<Self> {
        // Must outlast the long-poll wait
        let client = Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 30))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{API_BASE}/bot{token}"),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T, String> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("{method}: {}", e.without_url()))?;

        let parsed: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| format!("{method}: invalid response: {}", e.without_url()))?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(format!(
                "{method}: {}",
                description.unwrap_or_else(|| "request rejected".to_string())
            )),
        }
    }

    /// Fetch pending updates, waiting up to `POLL_TIMEOUT_SECS` for new ones
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": POLL_TIMEOUT_SECS,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }

        self.call("getUpdates", body).await.map_err(|e| anyhow!(e))
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
    ) -> Result<(), BotError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if markdown {
            body["parse_mode"] = json!("Markdown");
        }

        let _: Value = self
            .call("sendMessage", body)
            .await
            .map_err(BotError::Delivery)?;
        debug!("Sent message to {chat_id}");
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn is_member_of_channel(&self, channel: &str, user_id: UserId) -> Result<bool, BotError> {
        let member: TgChatMember = self
            .call(
                "getChatMember",
                json!({ "chat_id": channel, "user_id": user_id }),
            )
            .await
            .map_err(BotError::Lookup)?;

        Ok(ChatRole::from_status(&member.status).is_some())
    }

    async fn get_administrators(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<(UserId, ChatRole)>, BotError> {
        let admins: Vec<TgChatMember> = self
            .call("getChatAdministrators", json!({ "chat_id": group_id }))
            .await
            .map_err(BotError::Lookup)?;

        Ok(admins
            .into_iter()
            .filter_map(|m| ChatRole::from_status(&m.status).map(|role| (m.user.id, role)))
            .collect())
    }

    async fn send_to_group(&self, group_id: GroupId, text: &str) -> Result<(), BotError> {
        self.send_message(group_id, text, true).await
    }

    async fn send_direct(&self, user_id: UserId, text: &str) -> Result<(), BotError> {
        self.send_message(user_id, text, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_group_message_with_reply() {
        let inbound = update(
            r#"{
                "update_id": 10,
                "message": {
                    "message_id": 1,
                    "from": {"id": 5, "is_bot": false, "first_name": "Sara", "last_name": "K", "username": "sarak"},
                    "chat": {"id": -1001, "type": "supergroup", "title": "Class"},
                    "text": "/setadmin",
                    "reply_to_message": {
                        "message_id": 0,
                        "from": {"id": 6, "is_bot": false, "first_name": "Reza"},
                        "chat": {"id": -1001, "type": "supergroup"}
                    }
                }
            }"#,
        )
        .into_inbound()
        .unwrap();

        assert_eq!(inbound.chat_id, -1001);
        assert_eq!(inbound.chat_kind, ChatKind::Group);
        assert_eq!(inbound.from.display_name, "Sara K");
        assert_eq!(inbound.from.username.as_deref(), Some("sarak"));
        assert_eq!(inbound.text, "/setadmin");
        let target = inbound.reply_to.unwrap();
        assert_eq!(target.id, 6);
        assert_eq!(target.username, None);
    }

    #[test]
    fn test_filtered_updates() {
        // bot author
        assert!(update(
            r#"{"update_id": 1, "message": {"from": {"id": 1, "is_bot": true, "first_name": "b"},
                "chat": {"id": 1, "type": "private"}, "text": "hi"}}"#
        )
        .into_inbound()
        .is_none());

        // no text
        assert!(update(
            r#"{"update_id": 2, "message": {"from": {"id": 1, "first_name": "a"},
                "chat": {"id": 1, "type": "private"}}}"#
        )
        .into_inbound()
        .is_none());

        // channel post
        assert!(update(
            r#"{"update_id": 3, "message": {"from": {"id": 1, "first_name": "a"},
                "chat": {"id": -5, "type": "channel"}, "text": "x"}}"#
        )
        .into_inbound()
        .is_none());

        // non-message update
        assert!(update(r#"{"update_id": 4}"#).into_inbound().is_none());
    }

    #[test]
    fn test_api_error_envelope() {
        let parsed: ApiResponse<Value> = serde_json::from_str(
            r#"{"ok": false, "error_code": 403, "description": "Forbidden: bot was blocked by the user"}"#,
        )
        .unwrap();
        assert!(!parsed.ok);
        assert!(parsed.result.is_none());
        assert_eq!(
            parsed.description.as_deref(),
            Some("Forbidden: bot was blocked by the user")
        );
    }
}
