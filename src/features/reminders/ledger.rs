//! Reminder ledger
//!
//! Append-only: reminders are created and listed, never edited or removed.

use log::info;

use crate::core::{GroupId, ParseError, UserId};
use crate::database::{Dataset, GroupState, Reminder};

use super::dates::parse_due_date;

/// Validate `due_date_text` and append a new reminder to the group.
///
/// The date text and title are stored exactly as given. On a parse error the
/// dataset is left untouched.
pub fn create_reminder(
    dataset: &mut Dataset,
    group_id: GroupId,
    due_date_text: &str,
    title: &str,
    creator_id: UserId,
) -> Result<Reminder, ParseError> {
    parse_due_date(due_date_text)?;

    let mut id = uuid::Uuid::new_v4().to_string();
    while dataset.contains_reminder(&id) {
        id = uuid::Uuid::new_v4().to_string();
    }

    let reminder = Reminder {
        id,
        due_date_text: due_date_text.to_string(),
        title: title.to_string(),
        creator_id,
        group_id,
        last_notified: None,
    };

    dataset
        .get_or_create(group_id)
        .reminders
        .push(reminder.clone());

    info!(
        "Created reminder {} for group {} due {} by {}",
        reminder.id, group_id, reminder.due_date_text, creator_id
    );

    Ok(reminder)
}

/// Reminders in creation order
pub fn list_reminders(group: &GroupState) -> &[Reminder] {
    &group.reminders
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_create_appends_with_unique_ids() {
        let mut dataset = Dataset::new();

        let first = create_reminder(&mut dataset, 1, "1404.08.07", "Science Exam", 10).unwrap();
        let second = create_reminder(&mut dataset, 2, "۱۴۰۴.۰۹.۰۱", "Math Quiz", 11).unwrap();
        let third = create_reminder(&mut dataset, 1, "1404.08.09", "Lab Report", 10).unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.id, third.id);

        let titles: Vec<_> = list_reminders(dataset.group(1).unwrap())
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Science Exam", "Lab Report"]);

        let stored = &dataset.group(2).unwrap().reminders[0];
        assert_eq!(stored.due_date_text, "۱۴۰۴.۰۹.۰۱");
        assert_eq!(stored.group_id, 2);
        assert_eq!(stored.creator_id, 11);
        assert_eq!(
            stored.due_date().unwrap(),
            NaiveDate::from_ymd_opt(1404, 9, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_error_does_not_mutate() {
        let mut dataset = Dataset::new();
        create_reminder(&mut dataset, 1, "1404.08.07", "Kept", 10).unwrap();
        let before = dataset.clone();

        for bad in ["1404.08", "tomorrow", "1404.02.31", "1404.08.07.1"] {
            assert!(create_reminder(&mut dataset, 1, bad, "Dropped", 10).is_err());
            assert!(create_reminder(&mut dataset, 5, bad, "Dropped", 10).is_err());
        }

        assert_eq!(dataset, before);
        assert!(dataset.group(5).is_none());
    }
}
