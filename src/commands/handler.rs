//! Inbound message handling
//!
//! Routes commands and reminder requests through membership, authorization
//! and the ledger. Each mutation is one `GroupStore::transact` call.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation with start, join, setadmin, removeadmin,
//!   reminders and the reminder prefix

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::core::{BotError, ChatRole, Config, GroupId, UserId, UserRef};
use crate::database::{GroupState, GroupStore};
use crate::features::authorization::{can_manage_admins, can_manage_reminders, live_role};
use crate::features::membership::{
    find_by_username, grant_admin, refresh_roles, revoke_admin, upsert_member,
};
use crate::features::reminders::{create_reminder, list_reminders, parse_due_date};
use crate::transport::{ChatKind, ChatTransport, InboundMessage};

use super::parse::{classify, split_request, Command, Inbound, RequestError, REMINDER_KEYWORDS};

const DATE_FORMAT_HINT: &str = "YYYY.MM.DD";

pub struct CommandHandler {
    store: Arc<GroupStore>,
    transport: Arc<dyn ChatTransport>,
    required_channel: Option<String>,
}

impl CommandHandler {
    pub fn new(store: Arc<GroupStore>, transport: Arc<dyn ChatTransport>, config: &Config) -> Self {
        Self {
            store,
            transport,
            required_channel: config.required_channel.clone(),
        }
    }

    /// Handle one inbound message, returning the reply to post in the same chat
    pub async fn handle_message(&self, msg: &InboundMessage) -> Result<Option<String>> {
        match (classify(&msg.text), msg.chat_kind) {
            (Inbound::Command(Command::Start), ChatKind::Private) => Ok(Some(self.welcome_text())),
            (Inbound::Command(Command::Start), ChatKind::Group) => self.handle_group_start(msg).await,
            (Inbound::Command(Command::Join), ChatKind::Group) => self.handle_join(msg).await,
            (Inbound::Command(Command::SetAdmin(arg)), ChatKind::Group) => {
                self.handle_admin_change(msg, arg.as_deref(), true).await
            }
            (Inbound::Command(Command::RemoveAdmin(arg)), ChatKind::Group) => {
                self.handle_admin_change(msg, arg.as_deref(), false).await
            }
            (Inbound::Command(Command::Reminders), ChatKind::Group) => {
                self.handle_list(msg.chat_id).await
            }
            (
                Inbound::Command(
                    Command::Join
                    | Command::SetAdmin(_)
                    | Command::RemoveAdmin(_)
                    | Command::Reminders,
                ),
                ChatKind::Private,
            ) => Ok(Some("This command only works in a group.".to_string())),
            (Inbound::Command(Command::Unknown(_)), _) => Ok(None),
            (Inbound::ReminderRequest(body), ChatKind::Group) => {
                self.record_member(msg.chat_id, &msg.from).await?;
                self.handle_reminder_request(msg, body).await
            }
            (Inbound::Text, ChatKind::Group) => {
                self.record_member(msg.chat_id, &msg.from).await?;
                Ok(None)
            }
            (Inbound::ReminderRequest(_) | Inbound::Text, ChatKind::Private) => {
                Ok(Some(self.welcome_text()))
            }
        }
    }

    fn welcome_text(&self) -> String {
        let mut text = format!(
            "👋 Hi! I'm a reminder bot.\n\
             To add a reminder in a group, send:\n\
             {}/{DATE_FORMAT_HINT} <title>\n\
             Reminders go out 2 days before, 1 day before, and on the day.\n\
             Use /join in a group to also get reminders privately.",
            REMINDER_KEYWORDS[1]
        );
        if let Some(channel) = &self.required_channel {
            text.push_str(&format!(
                "\n\nNote: you must be a member of {channel} to create reminders."
            ));
        }
        text
    }

    async fn record_member(&self, group_id: GroupId, user: &UserRef) -> Result<()> {
        self.store
            .transact(|data| {
                upsert_member(data.get_or_create(group_id), user);
            })
            .await
    }

    /// Fetch the group's administrator list; `None` when the lookup fails
    async fn fetch_roles(&self, group_id: GroupId) -> Option<Vec<(UserId, ChatRole)>> {
        match self.transport.get_administrators(group_id).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Role snapshot for group {group_id} unavailable: {e}");
                None
            }
        }
    }

    /// Refresh `admins` and `owners` from the transport. Existing roles are
    /// kept when the lookup fails.
    pub async fn refresh_group_roles(&self, group_id: GroupId) -> Result<bool> {
        let Some(snapshot) = self.fetch_roles(group_id).await else {
            return Ok(false);
        };
        self.store
            .transact(|data| refresh_roles(data.get_or_create(group_id), &snapshot))
            .await?;
        Ok(true)
    }

    async fn handle_group_start(&self, msg: &InboundMessage) -> Result<Option<String>> {
        let snapshot = self.fetch_roles(msg.chat_id).await;
        self.store
            .transact(|data| {
                let group = data.get_or_create(msg.chat_id);
                upsert_member(group, &msg.from);
                if let Some(snapshot) = &snapshot {
                    refresh_roles(group, snapshot);
                }
            })
            .await?;

        Ok(Some(format!(
            "✅ Bot is active. Messages starting with {}/ are treated as reminders.",
            REMINDER_KEYWORDS[1]
        )))
    }

    async fn handle_join(&self, msg: &InboundMessage) -> Result<Option<String>> {
        self.record_member(msg.chat_id, &msg.from).await?;
        info!("User {} joined reminders in group {}", msg.from.id, msg.chat_id);
        Ok(Some(
            "✅ You're registered to receive reminders privately. Make sure you've started a chat with me."
                .to_string(),
        ))
    }

    async fn handle_admin_change(
        &self,
        msg: &InboundMessage,
        username: Option<&str>,
        grant: bool,
    ) -> Result<Option<String>> {
        let Some(snapshot) = self.fetch_roles(msg.chat_id).await else {
            return Ok(Some("❌ Could not verify your permissions, try again later.".to_string()));
        };
        if !can_manage_admins(Some(live_role(&snapshot, msg.from.id))) {
            info!(
                "{} (user {} in group {})",
                BotError::Authorization("manage admins"),
                msg.from.id,
                msg.chat_id
            );
            return Ok(Some(
                "❌ Only the group's creator or administrators can manage admins.".to_string(),
            ));
        }

        let target = self
            .store
            .transact(|data| {
                let group = data.get_or_create(msg.chat_id);
                let target = resolve_target(group, msg.reply_to.as_ref(), username)?;
                if grant {
                    grant_admin(group, target.id);
                } else {
                    revoke_admin(group, target.id);
                }
                Some(target)
            })
            .await?;

        let command = if grant { "setadmin" } else { "removeadmin" };
        let Some(target) = target else {
            return Ok(Some(format!(
                "Usage: /{command} @username, or reply to the member's message with /{command}."
            )));
        };

        info!(
            "User {} {} admin {} in group {}",
            msg.from.id,
            if grant { "granted" } else { "revoked" },
            target.id,
            msg.chat_id
        );
        Ok(Some(if grant {
            format!("✅ {} is now an admin.", target.label())
        } else {
            format!("✅ {} is no longer an admin.", target.label())
        }))
    }

    async fn handle_list(&self, group_id: GroupId) -> Result<Option<String>> {
        let dataset = self.store.snapshot().await;
        let reminders = dataset.group(group_id).map(list_reminders).unwrap_or_default();

        if reminders.is_empty() {
            return Ok(Some("📋 No reminders in this group yet.".to_string()));
        }

        let mut text = String::from("📋 Reminders:\n");
        for reminder in reminders {
            text.push_str(&format!("• {} - {}\n", reminder.due_date_text, reminder.title));
        }
        Ok(Some(text.trim_end().to_string()))
    }

    async fn handle_reminder_request(
        &self,
        msg: &InboundMessage,
        body: &str,
    ) -> Result<Option<String>> {
        let user_id = msg.from.id;
        let group_id = msg.chat_id;

        if let Some(channel) = &self.required_channel {
            let is_member = match self.transport.is_member_of_channel(channel, user_id).await {
                Ok(is_member) => is_member,
                Err(e) => {
                    warn!("Channel check for user {user_id} failed, denying: {e}");
                    false
                }
            };
            if !is_member {
                return Ok(Some(format!(
                    "⚠️ You must be a member of {channel} to create reminders."
                )));
            }
        }

        let (date_text, title) = match split_request(body) {
            Ok(parts) => parts,
            Err(RequestError::Empty) => {
                return Ok(Some(format!(
                    "❌ Wrong format. Example: {}/1404.08.07 Science Exam",
                    REMINDER_KEYWORDS[1]
                )))
            }
            Err(RequestError::MissingTitle) => {
                return Ok(Some(
                    "❌ Put a space after the date, then the title.".to_string(),
                ))
            }
        };

        if let Err(e) = parse_due_date(date_text) {
            info!("Rejected reminder date from user {user_id}: {e}");
            return Ok(Some(format!("❌ The date must be in {DATE_FORMAT_HINT} format.")));
        }

        let snapshot = self.fetch_roles(group_id).await;
        let role = snapshot.as_deref().map(|s| live_role(s, user_id));

        let outcome = self
            .store
            .transact(|data| -> Result<_, BotError> {
                if !can_manage_reminders(data.get_or_create(group_id), user_id, role) {
                    return Err(BotError::Authorization("create reminders"));
                }
                let reminder = create_reminder(data, group_id, date_text, title, user_id)?;
                if let Some(snapshot) = &snapshot {
                    refresh_roles(data.get_or_create(group_id), snapshot);
                }
                Ok(reminder)
            })
            .await?;

        match outcome {
            Ok(reminder) => Ok(Some(format!(
                "✅ Reminder «{}» set for {}. Notifications go out 2 days before, 1 day before, and on the day.",
                reminder.title, reminder.due_date_text
            ))),
            Err(BotError::Authorization(action)) => {
                info!("User {user_id} in group {group_id} not authorized to {action}");
                Ok(Some(
                    "❌ Only the group's owner or admins can create reminders.".to_string(),
                ))
            }
            Err(e) => {
                warn!("Reminder request from {user_id} in group {group_id} failed: {e}");
                Ok(Some(format!("❌ The date must be in {DATE_FORMAT_HINT} format.")))
            }
        }
    }
}

/// Reply author first, then a username looked up in the roster
fn resolve_target(
    group: &GroupState,
    reply_to: Option<&UserRef>,
    username: Option<&str>,
) -> Option<UserRef> {
    reply_to
        .cloned()
        .or_else(|| username.and_then(|name| find_by_username(group, name)))
}
