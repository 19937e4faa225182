//! Categories and transition directions.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of a monitored category (e.g. "consumers currently flagged slow").
///
/// # Examples
///
/// ```
/// use edgemon::Category;
///
/// let c = Category::new("slow-consumer").unwrap();
/// assert_eq!(c, Category::SLOW_CONSUMER);
/// assert!(Category::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(Cow<'static, str>);

impl Category {
    /// Consumers the broker currently flags as slow.
    pub const SLOW_CONSUMER: Self = Self(Cow::Borrowed("slow-consumer"));

    /// Producers the broker currently blocks for flow control.
    pub const PRODUCER_BLOCKED: Self = Self(Cow::Borrowed("producer-blocked"));

    /// Creates a category from an owned or borrowed name.
    ///
    /// Surrounding whitespace is trimmed; an empty result is rejected.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyCategoryName);
        }
        Ok(Self(Cow::Owned(trimmed.to_string())))
    }

    /// Creates a category from a static name without validation.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the category name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Category {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0.into_owned()
    }
}

/// Direction of a membership transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The resource started matching the category (START).
    Enter,
    /// The resource stopped matching the category (END).
    Exit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => write!(f, "enter"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// Lifecycle of a category tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackerState {
    /// No observation has been reconciled yet.
    #[default]
    Uninitialized,
    /// At least one observation has been reconciled.
    Tracking,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new_trims() {
        let c = Category::new("  slow-consumer ").unwrap();
        assert_eq!(c.as_str(), "slow-consumer");
        assert_eq!(c, Category::SLOW_CONSUMER);
    }

    #[test]
    fn test_category_rejects_empty() {
        assert!(matches!(Category::new(""), Err(ConfigError::EmptyCategoryName)));
    }

    #[test]
    fn test_category_serde_roundtrip_validates() {
        let json = serde_json::to_string(&Category::PRODUCER_BLOCKED).unwrap();
        assert_eq!(json, "\"producer-blocked\"");

        let parsed: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Category::PRODUCER_BLOCKED);

        assert!(serde_json::from_str::<Category>("\"  \"").is_err());
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Enter.to_string(), "enter");
        assert_eq!(Direction::Exit.to_string(), "exit");
    }

    #[test]
    fn test_tracker_state_default() {
        assert_eq!(TrackerState::default(), TrackerState::Uninitialized);
    }
}
