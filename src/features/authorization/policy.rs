//! Authorization policy
//!
//! Reminder management accepts any of three independent signals: the live
//! transport role, recorded ownership, or an explicit admin grant. Managing
//! admins accepts only the live role, so explicit grants cannot extend
//! themselves.

use crate::core::{ChatRole, UserId};
use crate::database::GroupState;

/// Role of `user_id` according to an administrator snapshot.
///
/// Anyone absent from the snapshot is a plain member.
pub fn live_role(snapshot: &[(UserId, ChatRole)], user_id: UserId) -> ChatRole {
    snapshot
        .iter()
        .find(|(id, _)| *id == user_id)
        .map(|(_, role)| *role)
        .unwrap_or(ChatRole::Member)
}

/// `live_role` is `None` when the transport could not be asked.
pub fn can_manage_reminders(
    group: &GroupState,
    user_id: UserId,
    live_role: Option<ChatRole>,
) -> bool {
    live_role.is_some_and(ChatRole::is_privileged)
        || group.owners.contains(&user_id)
        || group.admins.contains(&user_id)
}

pub fn can_manage_admins(live_role: Option<ChatRole>) -> bool {
    live_role.is_some_and(ChatRole::is_privileged)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = 42;

    #[test]
    fn test_can_manage_reminders_all_combinations() {
        for live in [false, true] {
            for owner in [false, true] {
                for admin in [false, true] {
                    let mut group = GroupState::default();
                    if owner {
                        group.owners.insert(USER);
                    }
                    if admin {
                        group.admins.insert(USER);
                    }
                    let role = if live {
                        Some(ChatRole::Administrator)
                    } else {
                        Some(ChatRole::Member)
                    };

                    assert_eq!(
                        can_manage_reminders(&group, USER, role),
                        live || owner || admin,
                        "live={live} owner={owner} admin={admin}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_creator_role_and_unknown_role() {
        let group = GroupState::default();
        assert!(can_manage_reminders(&group, USER, Some(ChatRole::Creator)));
        assert!(!can_manage_reminders(&group, USER, None));

        let mut owned = GroupState::default();
        owned.owners.insert(USER);
        assert!(can_manage_reminders(&owned, USER, None));
    }

    #[test]
    fn test_other_users_roles_do_not_leak() {
        let mut group = GroupState::default();
        group.owners.insert(1);
        group.admins.insert(2);
        assert!(!can_manage_reminders(&group, USER, Some(ChatRole::Member)));
    }

    #[test]
    fn test_can_manage_admins_requires_live_role() {
        assert!(can_manage_admins(Some(ChatRole::Creator)));
        assert!(can_manage_admins(Some(ChatRole::Administrator)));
        assert!(!can_manage_admins(Some(ChatRole::Member)));
        assert!(!can_manage_admins(None));
    }

    #[test]
    fn test_live_role_from_snapshot() {
        let snapshot = vec![(1, ChatRole::Creator), (2, ChatRole::Administrator)];
        assert_eq!(live_role(&snapshot, 1), ChatRole::Creator);
        assert_eq!(live_role(&snapshot, 2), ChatRole::Administrator);
        assert_eq!(live_role(&snapshot, 3), ChatRole::Member);
    }
}
