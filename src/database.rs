//! # Group Store
//!
//! JSON-document persistence for every group's roster, roles and reminders.
//! The whole dataset is read and written as one unit; `GroupStore::transact`
//! serialises load-mutate-save sequences so concurrent callers never lose
//! each other's updates.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::core::{BotError, GroupId, ParseError, UserId};
use crate::features::reminders::dates::parse_due_date;

/// Schema version written by this build
pub const DATASET_VERSION: u32 = 1;

/// Full persisted state: group ID -> group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Missing in documents written before versioning was introduced
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub groups: BTreeMap<GroupId, GroupState>,
}

impl Dataset {
    pub fn new() -> Self {
        Self {
            version: DATASET_VERSION,
            groups: BTreeMap::new(),
        }
    }

    /// Fetch a group, creating empty state on first interaction
    pub fn get_or_create(&mut self, group_id: GroupId) -> &mut GroupState {
        self.groups.entry(group_id).or_default()
    }

    pub fn group(&self, group_id: GroupId) -> Option<&GroupState> {
        self.groups.get(&group_id)
    }

    /// True if any group already holds a reminder with this ID
    pub fn contains_reminder(&self, reminder_id: &str) -> bool {
        self.groups
            .values()
            .any(|g| g.reminders.iter().any(|r| r.id == reminder_id))
    }

    fn migrate(&mut self) {
        if self.version < DATASET_VERSION {
            debug!(
                "Migrating dataset from version {} to {}",
                self.version, DATASET_VERSION
            );
            self.version = DATASET_VERSION;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupState {
    /// Users observed as the group's creator; never pruned
    #[serde(default)]
    pub owners: BTreeSet<UserId>,
    #[serde(default)]
    pub admins: BTreeSet<UserId>,
    /// First-seen order, unique by ID
    #[serde(default)]
    pub members: Vec<MemberRecord>,
    /// Creation order
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "name", default)]
    pub display_name: String,
    /// Set once the member has interacted; gates direct notifications
    #[serde(rename = "started", default)]
    pub registered_for_direct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    /// Due date exactly as the creator typed it
    #[serde(rename = "date")]
    pub due_date_text: String,
    pub title: String,
    pub creator_id: UserId,
    #[serde(rename = "chat_id")]
    pub group_id: GroupId,
    /// Reference-zone date of the last dispatch, when once-per-day dedup is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notified: Option<NaiveDate>,
}

impl Reminder {
    /// Calendar date the reminder is due
    pub fn due_date(&self) -> Result<NaiveDate, ParseError> {
        parse_due_date(&self.due_date_text)
    }
}

/// Owner of the dataset document on disk
pub struct GroupStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl GroupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the dataset.
    ///
    /// A missing document yields an empty dataset. A corrupt one is moved
    /// aside and also yields an empty dataset, so the bot stays usable. An
    /// unreadable one is logged and read as empty, but is left in place.
    pub async fn load(&self) -> Dataset {
        match self.read().await {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!("{e}");
                Dataset::new()
            }
        }
    }

    /// Like `load`, but an I/O failure other than a missing file is an error
    async fn read(&self) -> Result<Dataset, BotError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No dataset at {}, starting empty", self.path.display());
                return Ok(Dataset::new());
            }
            Err(e) => {
                return Err(BotError::Persistence(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        match serde_json::from_slice::<Dataset>(&raw) {
            Ok(mut dataset) => {
                dataset.migrate();
                Ok(dataset)
            }
            Err(e) => {
                warn!(
                    "{}",
                    BotError::Persistence(format!(
                        "dataset {} is corrupt ({e}); reinitialising",
                        self.path.display()
                    ))
                );
                self.quarantine().await;
                Ok(Dataset::new())
            }
        }
    }

    /// Atomically replace the dataset document (temp file + rename)
    pub async fn save(&self, dataset: &Dataset) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let payload =
            serde_json::to_vec_pretty(dataset).context("failed to encode dataset")?;

        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, payload)
            .await
            .with_context(|| format!("failed to write {}", temp_path.display()))?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e).with_context(|| format!("failed to replace {}", self.path.display()));
        }

        Ok(())
    }

    /// Load, mutate and save as one serialised step.
    ///
    /// The closure's return value is handed back once the save succeeds.
    /// Nothing is mutated or written if the document cannot be read.
    pub async fn transact<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Dataset) -> T,
    {
        let _guard = self.lock.lock().await;
        let mut dataset = self.read().await?;
        let out = mutate(&mut dataset);
        self.save(&dataset).await?;
        Ok(out)
    }

    /// Consistent read-only view; waits for any in-flight transaction
    pub async fn snapshot(&self) -> Dataset {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn quarantine(&self) {
        let stamp = chrono::Utc::now().timestamp();
        let mut target = self.path.clone().into_os_string();
        target.push(format!(".corrupt-{stamp}"));
        if let Err(e) = tokio::fs::rename(&self.path, &target).await {
            warn!(
                "Failed to move corrupt dataset aside to {:?}: {e}",
                target
            );
        } else {
            warn!("Corrupt dataset preserved at {:?}", target);
        }
    }
}
