//! # Notification Dispatcher
//!
//! Turns one firing reminder into a group broadcast plus one direct message
//! per registered member. Every send is independent: a failed or timed-out
//! recipient is logged and skipped.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::core::BotError;
use crate::database::{MemberRecord, Reminder};
use crate::transport::ChatTransport;

/// Outcome of one dispatch call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub broadcast_delivered: bool,
    pub direct_delivered: usize,
    pub direct_failed: usize,
}

pub struct NotificationDispatcher {
    transport: Arc<dyn ChatTransport>,
    max_mentions: usize,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn ChatTransport>, max_mentions: usize, send_timeout: Duration) -> Self {
        Self {
            transport,
            max_mentions,
            send_timeout,
        }
    }

    /// Notify the reminder's group and every member registered for direct messages
    pub async fn dispatch(&self, reminder: &Reminder, members: &[MemberRecord]) -> DispatchReport {
        let mut report = DispatchReport::default();

        let mentions = mention_text(members, self.max_mentions);
        let broadcast = broadcast_text(reminder, &mentions);
        let group_id = reminder.group_id;

        match timeout(self.send_timeout, self.transport.send_to_group(group_id, &broadcast)).await {
            Ok(Ok(())) => report.broadcast_delivered = true,
            Ok(Err(e)) => warn!("Reminder {} broadcast to group {group_id}: {e}", reminder.id),
            Err(_) => warn!(
                "Reminder {} broadcast: {}",
                reminder.id,
                BotError::timed_out(group_id)
            ),
        }

        let direct = direct_text(reminder);
        for member in members.iter().filter(|m| m.registered_for_direct) {
            match timeout(self.send_timeout, self.transport.send_direct(member.id, &direct)).await {
                Ok(Ok(())) => report.direct_delivered += 1,
                Ok(Err(e)) => {
                    warn!("Reminder {} direct to user {}: {e}", reminder.id, member.id);
                    report.direct_failed += 1;
                }
                Err(_) => {
                    warn!(
                        "Reminder {} direct to user {}: {}",
                        reminder.id,
                        member.id,
                        BotError::timed_out(member.id)
                    );
                    report.direct_failed += 1;
                }
            }
        }

        info!(
            "Dispatched reminder {} ({}) to group {group_id}: broadcast={}, direct {} ok / {} failed",
            reminder.id,
            reminder.title,
            report.broadcast_delivered,
            report.direct_delivered,
            report.direct_failed
        );

        report
    }
}

/// Space-separated mentions for at most `cap` members, in roster order.
///
/// Members with a username get `@username`; the rest get an inline user link.
pub fn mention_text(members: &[MemberRecord], cap: usize) -> String {
    members
        .iter()
        .take(cap)
        .map(|m| match m.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => format!("@{}", escape_markdown(username)),
            None => {
                let name = if m.display_name.trim().is_empty() {
                    "member"
                } else {
                    m.display_name.trim()
                };
                format!("[{}](tg://user?id={})", link_text(name), m.id)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn broadcast_text(reminder: &Reminder, mentions: &str) -> String {
    let mut text = format!(
        "🔔 Reminder: {}\n({})",
        escape_markdown(&reminder.title),
        reminder.due_date_text
    );
    if !mentions.is_empty() {
        text.push_str("\n\n");
        text.push_str(mentions);
    }
    text
}

pub fn direct_text(reminder: &Reminder) -> String {
    format!(
        "🔔 Reminder from group {}:\n{}\n({})",
        reminder.group_id, reminder.title, reminder.due_date_text
    )
}

/// Link text is taken verbatim inside the entity, so brackets that would
/// close it early are swapped for parentheses instead of escaped
fn link_text(name: &str) -> String {
    name.replace('[', "(").replace(']', ")")
}

/// Escape the characters that open an entity in Telegram's legacy Markdown
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
