//! Entry/exit reconciliation.
//!
//! An entry appends a new open record. An exit closes the open record(s)
//! carrying the same personal_id, as selected by the [`ExitPolicy`].

use crate::{EventKind, ExitPolicy, Outcome, VisitEvent, VisitRecord};
use chrono::NaiveDateTime;

/// Apply an event to the in-memory record sequence
///
/// `now` stamps the entry or exit. No field validation is performed.
pub fn apply_event(
    records: &mut Vec<VisitRecord>,
    event: &VisitEvent,
    now: NaiveDateTime,
    policy: ExitPolicy,
) -> Outcome {
    match event.kind {
        EventKind::Entry => register_entry(records, event, now),
        EventKind::Exit => register_exit(records, event, now, policy),
    }
}

fn next_id(records: &[VisitRecord]) -> u64 {
    records.iter().map(|r| r.id).max().unwrap_or(0) + 1
}

fn register_entry(records: &mut Vec<VisitRecord>, event: &VisitEvent, now: NaiveDateTime) -> Outcome {
    let id = next_id(records);
    records.push(VisitRecord {
        id,
        name: event.name.clone(),
        personal_id: event.personal_id.clone(),
        company: event.company.clone(),
        destination: event.destination.clone(),
        entry_date: now.date(),
        entry_time: now.time(),
        exit_date: None,
        exit_time: None,
    });

    tracing::info!(id, personal_id = %event.personal_id, "Entry registered");
    Outcome::EntryRegistered {
        id,
        name: event.name.clone(),
    }
}

fn register_exit(
    records: &mut [VisitRecord],
    event: &VisitEvent,
    now: NaiveDateTime,
    policy: ExitPolicy,
) -> Outcome {
    let mut matches: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_open() && r.personal_id.trim() == event.personal_id.trim())
        .map(|(i, _)| i)
        .collect();

    if matches.is_empty() {
        tracing::info!(personal_id = %event.personal_id, "Exit without pending entry");
        return Outcome::NoPendingEntry {
            personal_id: event.personal_id.clone(),
        };
    }

    if policy == ExitPolicy::CloseMostRecent {
        matches.drain(..matches.len() - 1);
    }

    let closed = matches
        .into_iter()
        .map(|i| {
            let record = &mut records[i];
            record.exit_date = Some(now.date());
            record.exit_time = Some(now.time());
            record.id
        })
        .collect::<Vec<_>>();

    if closed.len() > 1 {
        tracing::warn!(
            personal_id = %event.personal_id,
            count = closed.len(),
            "Exit closed several open records"
        );
    }
    tracing::info!(personal_id = %event.personal_id, ?closed, "Exit registered");

    Outcome::ExitRegistered {
        name: event.name.clone(),
        closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{present_count, total_count};
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_entries_get_sequential_ids() {
        let mut records = Vec::new();
        for i in 0..5 {
            let event = VisitEvent::entry(format!("V{}", i), format!("{}", i), "Acme", "Lobby");
            apply_event(&mut records, &event, at(5, 8, i), ExitPolicy::CloseAll);
        }

        assert_eq!(total_count(&records), 5);
        for (position, record) in records.iter().enumerate() {
            assert_eq!(record.id, position as u64 + 1);
            assert!(record.is_open());
        }
    }

    #[test]
    fn test_id_follows_highest_existing() {
        let mut records = Vec::new();
        let event = VisitEvent::entry("Alice", "111", "Acme", "Floor2");
        apply_event(&mut records, &event, at(5, 8, 0), ExitPolicy::CloseAll);
        records[0].id = 41;

        let outcome = apply_event(&mut records, &event, at(5, 9, 0), ExitPolicy::CloseAll);
        assert_eq!(
            outcome,
            Outcome::EntryRegistered {
                id: 42,
                name: "Alice".into()
            }
        );
    }

    #[test]
    fn test_alice_enters_and_leaves() {
        let mut records = Vec::new();
        let outcome = apply_event(
            &mut records,
            &VisitEvent::entry("Alice", "111", "Acme", "Floor2"),
            at(5, 8, 15),
            ExitPolicy::CloseAll,
        );
        assert_eq!(outcome.to_string(), "Entry registered for Alice");
        assert_eq!(records.len(), 1);
        assert_eq!(present_count(&records), 1);

        let outcome = apply_event(
            &mut records,
            &VisitEvent::exit("Alice", "111"),
            at(5, 17, 30),
            ExitPolicy::CloseAll,
        );
        assert_eq!(outcome.to_string(), "Exit registered for Alice");
        assert_eq!(present_count(&records), 0);
        assert_eq!(records[0].exit_date, Some(at(5, 17, 30).date()));
        assert_eq!(records[0].exit_time, Some(at(5, 17, 30).time()));
    }

    #[test]
    fn test_exit_for_second_visitor_leaves_first_open() {
        let mut records = Vec::new();
        for (name, id) in [("Alice", "111"), ("Bob", "222")] {
            apply_event(
                &mut records,
                &VisitEvent::entry(name, id, "Acme", "Floor2"),
                at(5, 8, 0),
                ExitPolicy::CloseAll,
            );
        }
        assert_eq!(present_count(&records), 2);

        apply_event(
            &mut records,
            &VisitEvent::exit("Bob", "222"),
            at(5, 12, 0),
            ExitPolicy::CloseAll,
        );
        assert_eq!(present_count(&records), 1);
        assert!(records[0].is_open());
        assert!(!records[1].is_open());
    }

    #[test]
    fn test_exit_without_match_changes_nothing() {
        let mut records = Vec::new();
        apply_event(
            &mut records,
            &VisitEvent::entry("Alice", "111", "Acme", "Floor2"),
            at(5, 8, 0),
            ExitPolicy::CloseAll,
        );
        let before = records.clone();

        let outcome = apply_event(
            &mut records,
            &VisitEvent::exit("Mallory", "999"),
            at(5, 9, 0),
            ExitPolicy::CloseAll,
        );
        assert_eq!(
            outcome,
            Outcome::NoPendingEntry {
                personal_id: "999".into()
            }
        );
        assert_eq!(records, before);
    }

    #[test]
    fn test_closed_record_is_not_closed_again() {
        let mut records = Vec::new();
        apply_event(
            &mut records,
            &VisitEvent::entry("Alice", "111", "Acme", "Floor2"),
            at(5, 8, 0),
            ExitPolicy::CloseAll,
        );
        apply_event(&mut records, &VisitEvent::exit("Alice", "111"), at(5, 9, 0), ExitPolicy::CloseAll);

        let outcome =
            apply_event(&mut records, &VisitEvent::exit("Alice", "111"), at(5, 10, 0), ExitPolicy::CloseAll);
        assert!(!outcome.mutated());
        assert_eq!(records[0].exit_time, Some(at(5, 9, 0).time()));
    }

    fn duplicate_open_entries() -> Vec<VisitRecord> {
        let mut records = Vec::new();
        for hour in [8, 9, 10] {
            let personal_id = if hour == 9 { "222" } else { "111" };
            apply_event(
                &mut records,
                &VisitEvent::entry("Alice", personal_id, "Acme", "Floor2"),
                at(5, hour, 0),
                ExitPolicy::CloseAll,
            );
        }
        records
    }

    #[test]
    fn test_close_all_policy_closes_every_match() {
        let mut records = duplicate_open_entries();
        let outcome =
            apply_event(&mut records, &VisitEvent::exit("Alice", "111"), at(5, 11, 0), ExitPolicy::CloseAll);

        assert_eq!(
            outcome,
            Outcome::ExitRegistered {
                name: "Alice".into(),
                closed: vec![1, 3]
            }
        );
        assert_eq!(present_count(&records), 1);
        assert!(records[1].is_open());
    }

    #[test]
    fn test_close_most_recent_policy_closes_last_match() {
        let mut records = duplicate_open_entries();
        let outcome = apply_event(
            &mut records,
            &VisitEvent::exit("Alice", "111"),
            at(5, 11, 0),
            ExitPolicy::CloseMostRecent,
        );

        assert_eq!(
            outcome,
            Outcome::ExitRegistered {
                name: "Alice".into(),
                closed: vec![3]
            }
        );
        assert!(records[0].is_open());
        assert!(!records[2].is_open());
    }

    #[test]
    fn test_exit_matches_personal_id_ignoring_whitespace() {
        // Hand-edited files may carry padded ids
        let padded = VisitEvent {
            kind: EventKind::Entry,
            name: "Alice".into(),
            personal_id: " 111 ".into(),
            company: "Acme".into(),
            destination: "Floor2".into(),
        };
        let mut records = Vec::new();
        apply_event(&mut records, &padded, at(5, 9, 0), ExitPolicy::CloseAll);

        let outcome = apply_event(
            &mut records,
            &VisitEvent::exit("Alice", "111 "),
            at(5, 10, 0),
            ExitPolicy::CloseAll,
        );
        assert_eq!(
            outcome,
            Outcome::ExitRegistered {
                name: "Alice".into(),
                closed: vec![1]
            }
        );
        assert!(!records[0].is_open());
    }
}
