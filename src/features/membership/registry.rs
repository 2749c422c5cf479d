//! Roster operations over a single `GroupState`.
//!
//! Owners only ever accumulate: a creator who is later demoted by the
//! transport stays in `owners`.

use log::debug;

use crate::core::{ChatRole, UserId, UserRef};
use crate::database::{GroupState, MemberRecord};

/// Create or update the member record for `user`.
///
/// Any interaction marks the member as reachable for direct notifications.
/// Returns `true` when a new record was appended.
pub fn upsert_member(group: &mut GroupState, user: &UserRef) -> bool {
    match group.members.iter_mut().find(|m| m.id == user.id) {
        Some(existing) => {
            existing.username = user.username.clone();
            existing.display_name = user.display_name.clone();
            existing.registered_for_direct = true;
            false
        }
        None => {
            debug!("New member {} ({})", user.id, user.label());
            group.members.push(MemberRecord {
                id: user.id,
                username: user.username.clone(),
                display_name: user.display_name.clone(),
                registered_for_direct: true,
            });
            true
        }
    }
}

/// Replace `admins` from an authoritative (user, role) list and record any
/// creator as an owner.
pub fn refresh_roles(group: &mut GroupState, snapshot: &[(UserId, ChatRole)]) {
    group.admins = snapshot
        .iter()
        .filter(|(_, role)| role.is_privileged())
        .map(|(id, _)| *id)
        .collect();

    for (id, role) in snapshot {
        if *role == ChatRole::Creator && group.owners.insert(*id) {
            debug!("Recorded {id} as group owner");
        }
    }
}

/// Returns `true` if the user was not already an admin
pub fn grant_admin(group: &mut GroupState, user_id: UserId) -> bool {
    group.admins.insert(user_id)
}

/// Returns `true` if the user was an admin
pub fn revoke_admin(group: &mut GroupState, user_id: UserId) -> bool {
    group.admins.remove(&user_id)
}

/// Case-insensitive lookup of a member by username (leading `@` optional)
pub fn find_by_username(group: &GroupState, username: &str) -> Option<UserRef> {
    let wanted = username.trim().trim_start_matches('@');
    if wanted.is_empty() {
        return None;
    }

    group
        .members
        .iter()
        .find(|m| {
            m.username
                .as_deref()
                .is_some_and(|u| u.eq_ignore_ascii_case(wanted))
        })
        .map(|m| UserRef::new(m.id, m.username.clone(), m.display_name.clone()))
}
