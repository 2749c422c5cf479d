//! # Authorization Feature
//!
//! Pure decisions on who may create reminders and who may manage admins.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod policy;

pub use policy::{can_manage_admins, can_manage_reminders, live_role};
