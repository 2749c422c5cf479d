//! # Membership Feature
//!
//! Roster and role bookkeeping for a group: member upserts, role refresh from
//! the transport's administrator list, and explicit admin grants.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod registry;

pub use registry::{find_by_username, grant_admin, refresh_roles, revoke_admin, upsert_member};
