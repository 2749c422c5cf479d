//! # Reminder Scheduler
//!
//! Periodic loop that reloads the dataset, finds reminders inside the firing
//! window for the reference zone's current date, and dispatches them
//! concurrently. Errors in a cycle are logged and the loop carries on.
//!
//! With once-per-day dedup enabled, the reminders picked for a tick are
//! stamped with `last_notified` in the same store transaction that selects
//! them, so a restart or a sub-daily interval never repeats a day.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use chrono::{FixedOffset, NaiveDate, Utc};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::core::Config;
use crate::database::{Dataset, GroupStore, MemberRecord, Reminder};

use super::dispatcher::NotificationDispatcher;
use super::firing::{days_until, is_firing};

/// Totals for one scheduler cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub fired: usize,
    pub broadcasts_failed: usize,
    pub direct_delivered: usize,
    pub direct_failed: usize,
    /// Once-per-day stamps for this tick could not be saved
    pub stamp_failed: bool,
}

pub struct ReminderScheduler {
    store: Arc<GroupStore>,
    dispatcher: Arc<NotificationDispatcher>,
    offset: FixedOffset,
    interval: Duration,
    once_per_day: bool,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<GroupStore>,
        dispatcher: Arc<NotificationDispatcher>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            dispatcher,
            offset: config.reference_offset(),
            interval: config.check_interval(),
            once_per_day: config.notify_once_per_day,
        }
    }

    /// Current calendar date in the reference zone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Run for the lifetime of the process. The first cycle runs immediately.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Reminder scheduler started (interval: {} minutes, once per day: {})",
            self.interval.as_secs() / 60,
            self.once_per_day
        );

        loop {
            interval.tick().await;
            self.run_cycle(self.today()).await;
        }
    }

    /// One scheduler cycle with its outcome logged. Never fails.
    pub async fn run_cycle(&self, today: NaiveDate) -> TickSummary {
        let summary = self.tick(today).await;
        if summary.fired > 0 {
            info!(
                "Scheduler tick for {today}: {} reminders fired, {} direct ok, {} direct failed, {} broadcasts failed",
                summary.fired,
                summary.direct_delivered,
                summary.direct_failed,
                summary.broadcasts_failed
            );
        } else {
            debug!("Scheduler tick for {today}: nothing due");
        }
        summary
    }

    /// Evaluate every reminder against `today` and dispatch the ones that fire
    ///
    /// If the dedup stamps cannot be saved, the selection is redone on a
    /// read-only snapshot and dispatched anyway; a later tick may repeat it.
    pub async fn tick(&self, today: NaiveDate) -> TickSummary {
        let mut stamp_failed = false;
        let due = if self.once_per_day {
            match self
                .store
                .transact(|dataset| select_due(dataset, today, true))
                .await
            {
                Ok(due) => due,
                Err(e) => {
                    error!("Failed to record notifications for {today}, sending without dedup: {e:#}");
                    stamp_failed = true;
                    let mut dataset = self.store.snapshot().await;
                    select_due(&mut dataset, today, true)
                }
            }
        } else {
            let mut dataset = self.store.snapshot().await;
            select_due(&mut dataset, today, false)
        };

        let mut summary = TickSummary {
            fired: due.len(),
            stamp_failed,
            ..TickSummary::default()
        };

        let mut tasks = JoinSet::new();
        for (reminder, members) in due {
            let dispatcher = self.dispatcher.clone();
            tasks.spawn(async move { dispatcher.dispatch(&reminder, &members).await });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => {
                    if !report.broadcast_delivered {
                        summary.broadcasts_failed += 1;
                    }
                    summary.direct_delivered += report.direct_delivered;
                    summary.direct_failed += report.direct_failed;
                }
                Err(e) => error!("Reminder dispatch task failed: {e}"),
            }
        }

        summary
    }
}

/// Collect firing reminders with a copy of their group's roster.
///
/// With `mark` set, reminders already notified today are skipped and the
/// selected ones are stamped with `today`.
fn select_due(
    dataset: &mut Dataset,
    today: NaiveDate,
    mark: bool,
) -> Vec<(Reminder, Vec<MemberRecord>)> {
    let mut due = Vec::new();

    for (group_id, group) in dataset.groups.iter_mut() {
        let members = &group.members;
        for reminder in group.reminders.iter_mut() {
            let due_date = match reminder.due_date() {
                Ok(date) => date,
                Err(e) => {
                    debug!("Skipping reminder {} in group {group_id}: {e}", reminder.id);
                    continue;
                }
            };

            if !is_firing(due_date, today) {
                continue;
            }
            if mark && reminder.last_notified == Some(today) {
                debug!("Reminder {} already notified on {today}", reminder.id);
                continue;
            }

            debug!(
                "Reminder {} in group {group_id} fires ({} days left)",
                reminder.id,
                days_until(due_date, today)
            );
            if mark {
                reminder.last_notified = Some(today);
            }
            due.push((reminder.clone(), members.clone()));
        }
    }

    due
}
