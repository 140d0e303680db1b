//! Upsert-and-resort merge applied to activation facts regardless of the channel they came from.
//!
//! The list invariant: identities are unique and entries are ordered by start
//! time ascending, entries without a start time last, ties keeping their
//! relative order.

use crate::state::event::{Activation, ActivationStatus};

/// Outcome of placing one activation into a list.
enum Placement {
    /// An entry with the same identity was overwritten at its position.
    Replaced { start_time_changed: bool },
    /// The activation was new and pushed at the end.
    Appended,
}

/// Merge one incoming activation into `activations`.
///
/// An existing entry is replaced in place so its visible position stays put;
/// only an append (or a replacement that moved the start time) triggers a
/// stable re-sort.
pub fn upsert(activations: &mut Vec<Activation>, incoming: Activation) {
    match place(activations, incoming) {
        Placement::Replaced {
            start_time_changed: false,
        } => {}
        Placement::Replaced {
            start_time_changed: true,
        }
        | Placement::Appended => sort(activations),
    }
}

/// Normalise a freshly fetched list: duplicates collapse onto the first
/// occurrence (the later fact wins) and the result is sorted once.
pub fn load(incoming: Vec<Activation>) -> Vec<Activation> {
    let mut activations = Vec::with_capacity(incoming.len());
    for activation in incoming {
        place(&mut activations, activation);
    }
    sort(&mut activations);
    activations
}

/// First activation in list order whose status is active.
pub fn active(activations: &[Activation]) -> Option<&Activation> {
    activations
        .iter()
        .find(|activation| activation.status == ActivationStatus::Active)
}

fn place(activations: &mut Vec<Activation>, incoming: Activation) -> Placement {
    match activations
        .iter_mut()
        .find(|existing| existing.id == incoming.id)
    {
        Some(existing) => {
            let start_time_changed = existing.start_time != incoming.start_time;
            *existing = incoming;
            Placement::Replaced { start_time_changed }
        }
        None => {
            activations.push(incoming);
            Placement::Appended
        }
    }
}

fn sort(activations: &mut [Activation]) {
    // `sort_by_key` is stable, which keeps ties in insertion order.
    activations.sort_by_key(|activation| (activation.start_time.is_none(), activation.start_time));
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use time::{Duration, OffsetDateTime, macros::datetime};

    use super::*;
    use crate::state::event::ActivationKind;

    const BASE: OffsetDateTime = datetime!(2026-03-01 19:00 UTC);

    fn activation(id: &str, status: ActivationStatus, offset_min: Option<i64>) -> Activation {
        Activation {
            id: id.into(),
            kind: ActivationKind::Trivia,
            status,
            start_time: offset_min.map(|minutes| BASE + Duration::minutes(minutes)),
            title: None,
        }
    }

    fn ids(activations: &[Activation]) -> Vec<&str> {
        activations.iter().map(|a| a.id.as_str()).collect()
    }

    fn assert_invariant(activations: &[Activation]) {
        let unique: HashSet<_> = activations.iter().map(|a| &a.id).collect();
        assert_eq!(unique.len(), activations.len(), "duplicate identity");

        let mut seen_missing = false;
        let mut previous = None;
        for activation in activations {
            match activation.start_time {
                Some(start) => {
                    assert!(!seen_missing, "timed entry after an untimed one");
                    if let Some(prev) = previous {
                        assert!(prev <= start, "not sorted ascending");
                    }
                    previous = Some(start);
                }
                None => seen_missing = true,
            }
        }
    }

    #[test]
    fn append_sorts_by_start_time_with_missing_last() {
        let mut list = Vec::new();
        upsert(&mut list, activation("none", ActivationStatus::Pending, None));
        upsert(&mut list, activation("late", ActivationStatus::Pending, Some(30)));
        upsert(&mut list, activation("early", ActivationStatus::Pending, Some(5)));

        assert_eq!(ids(&list), vec!["early", "late", "none"]);
    }

    #[test]
    fn equal_start_times_keep_arrival_order() {
        let mut list = Vec::new();
        upsert(&mut list, activation("b", ActivationStatus::Pending, Some(10)));
        upsert(&mut list, activation("a", ActivationStatus::Pending, Some(10)));
        upsert(&mut list, activation("x", ActivationStatus::Pending, None));
        upsert(&mut list, activation("w", ActivationStatus::Pending, None));

        assert_eq!(ids(&list), vec!["b", "a", "x", "w"]);
    }

    #[test]
    fn status_update_replaces_in_place() {
        let mut list = load(vec![
            activation("one", ActivationStatus::Pending, Some(0)),
            activation("two", ActivationStatus::Pending, Some(10)),
        ]);

        upsert(&mut list, activation("one", ActivationStatus::Active, Some(0)));

        assert_eq!(ids(&list), vec!["one", "two"]);
        assert_eq!(list[0].status, ActivationStatus::Active);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn rescheduled_activation_moves_to_keep_order() {
        let mut list = load(vec![
            activation("one", ActivationStatus::Pending, Some(0)),
            activation("two", ActivationStatus::Pending, Some(10)),
        ]);

        upsert(&mut list, activation("one", ActivationStatus::Pending, Some(20)));

        assert_eq!(ids(&list), vec!["two", "one"]);
        assert_invariant(&list);
    }

    #[test]
    fn load_collapses_duplicates_with_last_fact_winning() {
        let list = load(vec![
            activation("dup", ActivationStatus::Pending, Some(10)),
            activation("other", ActivationStatus::Pending, Some(0)),
            activation("dup", ActivationStatus::Ended, Some(10)),
        ]);

        assert_eq!(ids(&list), vec!["other", "dup"]);
        assert_eq!(list[1].status, ActivationStatus::Ended);
    }

    #[test]
    fn active_is_first_active_in_list_order() {
        let list = load(vec![
            activation("later", ActivationStatus::Active, Some(20)),
            activation("ended", ActivationStatus::Ended, Some(0)),
            activation("earlier", ActivationStatus::Active, Some(10)),
            activation("untimed", ActivationStatus::Active, None),
        ]);

        assert_eq!(active(&list).map(|a| a.id.as_str()), Some("earlier"));
    }

    #[test]
    fn active_is_none_without_active_entries() {
        let list = load(vec![
            activation("a", ActivationStatus::Pending, Some(0)),
            activation("b", ActivationStatus::Ended, Some(5)),
        ]);
        assert!(active(&list).is_none());
        assert!(active(&[]).is_none());
    }

    #[test]
    fn later_fact_wins_for_same_identity() {
        let mut list = Vec::new();
        upsert(&mut list, activation("q1", ActivationStatus::Active, Some(5)));
        upsert(&mut list, activation("q1", ActivationStatus::Ended, Some(5)));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, ActivationStatus::Ended);

        upsert(&mut list, activation("q1", ActivationStatus::Active, Some(5)));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].status, ActivationStatus::Active);
    }

    #[test]
    fn interleaved_facts_keep_invariant() {
        let facts = [
            activation("c", ActivationStatus::Pending, None),
            activation("a", ActivationStatus::Pending, Some(15)),
            activation("b", ActivationStatus::Active, Some(3)),
            activation("a", ActivationStatus::Active, Some(15)),
            activation("d", ActivationStatus::Pending, Some(3)),
            activation("c", ActivationStatus::Active, Some(1)),
            activation("b", ActivationStatus::Ended, None),
            activation("e", ActivationStatus::Pending, None),
        ];

        let mut list = Vec::new();
        for fact in facts.iter().cloned() {
            upsert(&mut list, fact);
            assert_invariant(&list);
        }
        assert_eq!(list.len(), 5);

        // A poll delivering the same facts in one batch agrees on membership.
        let reloaded = load(facts.to_vec());
        assert_invariant(&reloaded);
        let mut from_push: Vec<_> = ids(&list);
        let mut from_poll: Vec<_> = ids(&reloaded);
        from_push.sort_unstable();
        from_poll.sort_unstable();
        assert_eq!(from_push, from_poll);
    }
}
