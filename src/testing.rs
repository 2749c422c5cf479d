//! Test doubles shared by the unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::core::{BotError, ChatRole, Config, GroupId, UserId};
use crate::database::MemberRecord;
use crate::transport::ChatTransport;

/// In-memory transport that records successful sends and can be scripted
/// to fail or stall specific recipients and lookups.
#[derive(Default)]
pub struct RecordingTransport {
    group_sends: Mutex<Vec<(GroupId, String)>>,
    direct_sends: Mutex<Vec<(UserId, String)>>,
    failing_groups: Mutex<HashSet<GroupId>>,
    failing_directs: Mutex<HashSet<UserId>>,
    hanging_directs: Mutex<HashSet<UserId>>,
    administrators: Mutex<HashMap<GroupId, Vec<(UserId, ChatRole)>>>,
    channel_members: Mutex<HashSet<UserId>>,
    lookups_fail: AtomicBool,
}

impl RecordingTransport {
    pub fn group_sends(&self) -> Vec<(GroupId, String)> {
        self.group_sends.lock().unwrap().clone()
    }

    pub fn direct_sends(&self) -> Vec<(UserId, String)> {
        self.direct_sends.lock().unwrap().clone()
    }

    pub fn fail_group(&self, group_id: GroupId) {
        self.failing_groups.lock().unwrap().insert(group_id);
    }

    pub fn fail_direct(&self, user_id: UserId) {
        self.failing_directs.lock().unwrap().insert(user_id);
    }

    pub fn hang_direct(&self, user_id: UserId) {
        self.hanging_directs.lock().unwrap().insert(user_id);
    }

    pub fn set_administrators(&self, group_id: GroupId, admins: Vec<(UserId, ChatRole)>) {
        self.administrators.lock().unwrap().insert(group_id, admins);
    }

    pub fn add_channel_member(&self, user_id: UserId) {
        self.channel_members.lock().unwrap().insert(user_id);
    }

    pub fn fail_lookups(&self) {
        self.lookups_fail.store(true, Ordering::SeqCst);
    }

    fn check_lookup(&self) -> Result<(), BotError> {
        if self.lookups_fail.load(Ordering::SeqCst) {
            Err(BotError::Lookup("transport unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn is_member_of_channel(&self, _channel: &str, user_id: UserId) -> Result<bool, BotError> {
        self.check_lookup()?;
        Ok(self.channel_members.lock().unwrap().contains(&user_id))
    }

    async fn get_administrators(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<(UserId, ChatRole)>, BotError> {
        self.check_lookup()?;
        Ok(self
            .administrators
            .lock()
            .unwrap()
            .get(&group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_to_group(&self, group_id: GroupId, text: &str) -> Result<(), BotError> {
        if self.failing_groups.lock().unwrap().contains(&group_id) {
            return Err(BotError::Delivery(format!("chat {group_id} not found")));
        }
        self.group_sends
            .lock()
            .unwrap()
            .push((group_id, text.to_string()));
        Ok(())
    }

    async fn send_direct(&self, user_id: UserId, text: &str) -> Result<(), BotError> {
        let hangs = self.hanging_directs.lock().unwrap().contains(&user_id);
        if hangs {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.failing_directs.lock().unwrap().contains(&user_id) {
            return Err(BotError::Delivery(format!("bot was blocked by {user_id}")));
        }
        self.direct_sends
            .lock()
            .unwrap()
            .push((user_id, text.to_string()));
        Ok(())
    }
}

pub fn member(id: UserId, username: Option<&str>, name: &str, registered: bool) -> MemberRecord {
    MemberRecord {
        id,
        username: username.map(str::to_string),
        display_name: name.to_string(),
        registered_for_direct: registered,
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "BOT_TOKEN" => Some("test-token".to_string()),
        "SEND_TIMEOUT_SECS" => Some("1".to_string()),
        _ => None,
    })
    .unwrap()
}
