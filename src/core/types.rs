//! Identifier and value types shared between the store, the features and the
//! transport.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use serde::{Deserialize, Serialize};

/// Stable identifier of a group chat
pub type GroupId = i64;

/// Stable identifier of a user
pub type UserId = i64;

/// Role a user holds in a chat according to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Creator,
    Administrator,
    Member,
}

impl ChatRole {
    /// Map a transport membership status onto a role.
    ///
    /// Statuses that do not denote current membership (`left`, `kicked`,
    /// `restricted`, ...) yield `None`.
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "creator" => Some(ChatRole::Creator),
            "administrator" => Some(ChatRole::Administrator),
            "member" => Some(ChatRole::Member),
            _ => None,
        }
    }

    /// Creator or administrator
    pub fn is_privileged(self) -> bool {
        matches!(self, ChatRole::Creator | ChatRole::Administrator)
    }
}

/// A resolved reference to a user, either taken from an inbound message or
/// looked up in a group's roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: UserId,
    pub username: Option<String>,
    pub display_name: String,
}

impl UserRef {
    pub fn new(id: UserId, username: Option<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            username,
            display_name: display_name.into(),
        }
    }

    /// Human-readable label: display name, then `@username`, then the raw ID
    pub fn label(&self) -> String {
        if !self.display_name.trim().is_empty() {
            self.display_name.clone()
        } else if let Some(username) = &self.username {
            format!("@{username}")
        } else {
            self.id.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_status() {
        assert_eq!(ChatRole::from_status("creator"), Some(ChatRole::Creator));
        assert_eq!(
            ChatRole::from_status("administrator"),
            Some(ChatRole::Administrator)
        );
        assert_eq!(ChatRole::from_status("member"), Some(ChatRole::Member));
        assert_eq!(ChatRole::from_status("left"), None);
        assert_eq!(ChatRole::from_status("kicked"), None);
    }

    #[test]
    fn test_role_privilege() {
        assert!(ChatRole::Creator.is_privileged());
        assert!(ChatRole::Administrator.is_privileged());
        assert!(!ChatRole::Member.is_privileged());
    }

    #[test]
    fn test_user_ref_label_fallbacks() {
        assert_eq!(UserRef::new(1, None, "Sara").label(), "Sara");
        assert_eq!(
            UserRef::new(2, Some("reza".to_string()), "").label(),
            "@reza"
        );
        assert_eq!(UserRef::new(3, None, "  ").label(), "3");
    }
}
