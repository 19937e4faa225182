//! Transition events delivered to listeners.
//!
//! Events are serializable so they can be forwarded to external sinks by a
//! listener without extra mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::{Category, Direction};

/// A single membership transition of one resource in one category.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent<R> {
    pub event_id: Uuid,
    pub category: Category,
    pub direction: Direction,
    pub resource: R,
    pub timestamp: DateTime<Utc>,
}

impl<R> TransitionEvent<R> {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(category: Category, direction: Direction, resource: R) -> Self {
        Self::at(category, direction, resource, Utc::now())
    }

    /// Creates an event with an explicit timestamp.
    #[must_use]
    pub fn at(category: Category, direction: Direction, resource: R, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            category,
            direction,
            resource,
            timestamp,
        }
    }

    /// Shorthand for an [`Direction::Enter`] event.
    #[must_use]
    pub fn enter(category: Category, resource: R) -> Self {
        Self::new(category, Direction::Enter, resource)
    }

    /// Shorthand for an [`Direction::Exit`] event.
    #[must_use]
    pub fn exit(category: Category, resource: R) -> Self {
        Self::new(category, Direction::Exit, resource)
    }

    /// Returns true if the resource entered the category.
    #[must_use]
    pub fn is_enter(&self) -> bool {
        self.direction == Direction::Enter
    }

    /// Returns true if the resource left the category.
    #[must_use]
    pub fn is_exit(&self) -> bool {
        self.direction == Direction::Exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_exit_constructors() {
        let enter = TransitionEvent::enter(Category::SLOW_CONSUMER, "c-1");
        assert!(enter.is_enter());
        assert!(!enter.is_exit());
        assert_eq!(enter.resource, "c-1");

        let exit = TransitionEvent::exit(Category::SLOW_CONSUMER, "c-1");
        assert!(exit.is_exit());
        assert_ne!(enter.event_id, exit.event_id);
    }

    #[test]
    fn test_event_serializes_direction_snake_case() {
        let event = TransitionEvent::enter(Category::PRODUCER_BLOCKED, 7u32);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["direction"], "enter");
        assert_eq!(json["category"], "producer-blocked");
        assert_eq!(json["resource"], 7);

        let back: TransitionEvent<u32> = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
