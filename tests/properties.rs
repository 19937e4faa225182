//! Property-based tests for the membership diff.
//!
//! Uses `proptest` to check that arbitrary observation sequences keep the
//! tracker consistent: the first observation is all enters, repeated
//! observations are silent, enters and exits are exact set differences, and
//! the running enter/exit balance always equals the tracked size.

use std::collections::HashSet;

use proptest::prelude::*;

use edgemon::{Category, CategoryTracker, Direction, TrackerState};

// ──────────────────── strategies ────────────────────

fn arb_observation() -> impl Strategy<Value = HashSet<u8>> {
    prop::collection::hash_set(0u8..32, 0..16)
}

fn arb_history() -> impl Strategy<Value = Vec<HashSet<u8>>> {
    prop::collection::vec(arb_observation(), 1..12)
}

fn tracker() -> CategoryTracker<u8> {
    CategoryTracker::new(Category::SLOW_CONSUMER)
}

// ──────────────────── properties ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn first_observation_is_all_enters(observed in arb_observation()) {
        let mut t = tracker();
        prop_assert_eq!(t.state(), TrackerState::Uninitialized);

        let r = t.reconcile(observed.clone());

        prop_assert_eq!(&r.entered, &observed);
        prop_assert!(r.exited.is_empty());
        prop_assert_eq!(t.current(), &observed);
        prop_assert_eq!(t.state(), TrackerState::Tracking);
    }

    #[test]
    fn repeated_observation_is_silent(history in arb_history()) {
        let mut t = tracker();
        for observed in history {
            t.reconcile(observed.clone());
            let again = t.reconcile(observed.clone());
            prop_assert!(again.is_empty());
            prop_assert_eq!(t.current(), &observed);
        }
    }

    #[test]
    fn transitions_are_set_differences(history in arb_history()) {
        let mut t = tracker();
        let mut previous: HashSet<u8> = HashSet::new();
        for observed in history {
            let r = t.reconcile(observed.clone());

            let expected_enter: HashSet<u8> = observed.difference(&previous).copied().collect();
            let expected_exit: HashSet<u8> = previous.difference(&observed).copied().collect();
            prop_assert_eq!(&r.entered, &expected_enter);
            prop_assert_eq!(&r.exited, &expected_exit);
            prop_assert!(r.entered.is_disjoint(&r.exited));

            previous = observed;
        }
    }

    #[test]
    fn enter_exit_balance_matches_size(history in arb_history()) {
        let mut t = tracker();
        let mut balance: i64 = 0;
        for observed in history {
            for event in t.reconcile(observed).into_events(&Category::SLOW_CONSUMER) {
                balance += match event.direction {
                    Direction::Enter => 1,
                    Direction::Exit => -1,
                };
            }
            prop_assert_eq!(balance, i64::try_from(t.len()).unwrap());
        }
    }

    #[test]
    fn events_list_exits_before_enters(before in arb_observation(), after in arb_observation()) {
        let mut t = tracker();
        t.reconcile(before);
        let events = t.reconcile(after).into_events(&Category::SLOW_CONSUMER);

        let first_enter = events.iter().position(|e| e.is_enter()).unwrap_or(events.len());
        prop_assert!(events[first_enter..].iter().all(|e| e.is_enter()));
    }
}
