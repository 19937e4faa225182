//! Per-category membership tracking.
//!
//! A [`CategoryTracker`] remembers which resources matched its category at the
//! last poll and turns each new observation into the set of resources that
//! entered and the set that exited.

use std::collections::HashSet;

use chrono::Utc;

use crate::category::{Category, Direction, TrackerState};
use crate::event::TransitionEvent;
use crate::identity::ResourceIdentity;

/// Outcome of one [`CategoryTracker::reconcile`] call.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<R: ResourceIdentity> {
    pub entered: HashSet<R>,
    pub exited: HashSet<R>,
}

impl<R: ResourceIdentity> Reconciliation<R> {
    /// Returns true if no resource crossed the category boundary.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }

    /// Total number of transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entered.len() + self.exited.len()
    }

    /// Converts the outcome into events: every exit first, then every enter.
    ///
    /// All events of one reconciliation share a timestamp. Order within the
    /// exits (and within the enters) follows set iteration order.
    #[must_use]
    pub fn into_events(self, category: &Category) -> Vec<TransitionEvent<R>> {
        let now = Utc::now();
        let mut events = Vec::with_capacity(self.len());
        events.extend(
            self.exited
                .into_iter()
                .map(|r| TransitionEvent::at(category.clone(), Direction::Exit, r, now)),
        );
        events.extend(
            self.entered
                .into_iter()
                .map(|r| TransitionEvent::at(category.clone(), Direction::Enter, r, now)),
        );
        events
    }
}

/// Holds the current membership of one category.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use edgemon::{Category, CategoryTracker};
///
/// let mut tracker = CategoryTracker::new(Category::SLOW_CONSUMER);
///
/// let first = tracker.reconcile(HashSet::from(["c1", "c2"]));
/// assert_eq!(first.entered.len(), 2);
///
/// let second = tracker.reconcile(HashSet::from(["c2"]));
/// assert!(second.entered.is_empty());
/// assert!(second.exited.contains("c1"));
/// ```
#[derive(Debug, Clone)]
pub struct CategoryTracker<R: ResourceIdentity> {
    category: Category,
    current: HashSet<R>,
    state: TrackerState,
    reconciliations: u64,
}

impl<R: ResourceIdentity> CategoryTracker<R> {
    /// Creates an empty, uninitialized tracker.
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            current: HashSet::new(),
            state: TrackerState::Uninitialized,
            reconciliations: 0,
        }
    }

    /// The category this tracker follows.
    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TrackerState {
        self.state
    }

    /// The resources matching the category as of the last reconcile.
    #[must_use]
    pub const fn current(&self) -> &HashSet<R> {
        &self.current
    }

    /// Returns true if `resource` is currently a member.
    #[must_use]
    pub fn contains(&self, resource: &R) -> bool {
        self.current.contains(resource)
    }

    /// Number of current members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Returns true if the category currently has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Number of successful reconciles so far.
    #[must_use]
    pub const fn reconciliations(&self) -> u64 {
        self.reconciliations
    }

    /// Folds a fresh observation into the tracked membership.
    ///
    /// `exited = current - observed`, `entered = observed - current`. The
    /// tracked set is updated in place by removing the exited members and
    /// inserting the entered ones, so members present in both keep the value
    /// stored when they first entered. The first call after construction
    /// reports every observed resource as entered.
    pub fn reconcile(&mut self, observed: HashSet<R>) -> Reconciliation<R> {
        let exited: HashSet<R> = self
            .current
            .iter()
            .filter(|r| !observed.contains(*r))
            .cloned()
            .collect();
        for r in &exited {
            self.current.remove(r);
        }

        let mut entered = HashSet::new();
        for r in observed {
            if !self.current.contains(&r) {
                self.current.insert(r.clone());
                entered.insert(r);
            }
        }

        self.state = TrackerState::Tracking;
        self.reconciliations += 1;

        Reconciliation { entered, exited }
    }
}
