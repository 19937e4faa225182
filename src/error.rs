//! Error types for edgemon.
//!
//! All errors are strongly typed using thiserror. Poll failures and listener
//! failures carry the category they happened in, so callers of
//! [`Monitor::check_updates`](crate::Monitor::check_updates) can tell which
//! category misbehaved without parsing messages.

use thiserror::Error;

use crate::category::Category;
use crate::dispatcher::ListenerId;

/// Configuration errors, detected while wiring a monitor and before any poll.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    #[error("Category '{category}' is configured more than once")]
    DuplicateCategory {
        category: Category,
    },

    #[error("Monitor needs at least one category")]
    NoCategories,

    #[error("Invalid object name '{name}': {reason}")]
    InvalidObjectName {
        name: String,
        reason: String,
    },

    #[error("Invalid attribute filter: {reason}")]
    InvalidAttributeFilter {
        reason: String,
    },

    #[error("Invalid broker name '{name}': {reason}")]
    InvalidBrokerName {
        name: String,
        reason: String,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField {
        field: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {message}")]
    Parse {
        message: String,
    },

    #[error("Failed to read configuration from {path}: {message}")]
    Io {
        path: String,
        message: String,
    },
}

/// Failures reported by a poll function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("Connection failed: {message}")]
    Connection {
        message: String,
    },

    #[error("Query failed: {message}")]
    Query {
        message: String,
    },

    #[error("Poll timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },
}

impl PollError {
    /// Creates a query failure.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Creates a connection failure.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

/// Failure raised by a listener callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("Listener failed: {message}")]
    Failed {
        message: String,
    },
}

impl ListenerError {
    /// Creates a listener failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Errors receiving from a [`TransitionStream`](crate::TransitionStream).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("Stream disconnected")]
    Disconnected,

    #[error("Stream receive timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },
}

/// Top-level error type for edgemon.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Poll of category '{category}' failed: {source}")]
    Poll {
        category: Category,
        #[source]
        source: PollError,
    },

    #[error("Listener {listener} failed on category '{category}': {source}")]
    Listener {
        category: Category,
        listener: ListenerId,
        #[source]
        source: ListenerError,
        /// Poll failures of earlier categories in the same check.
        prior_poll_errors: Vec<(Category, PollError)>,
    },

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl MonitorError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a poll error.
    #[must_use]
    pub const fn is_poll(&self) -> bool {
        matches!(self, Self::Poll { .. })
    }

    /// Returns true if this is a listener error.
    #[must_use]
    pub const fn is_listener(&self) -> bool {
        matches!(self, Self::Listener { .. })
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// The category the error happened in, if any.
    #[must_use]
    pub const fn category(&self) -> Option<&Category> {
        match self {
            Self::Poll { category, .. } | Self::Listener { category, .. } => Some(category),
            _ => None,
        }
    }

    /// Poll failures that preceded a listener failure in the same check.
    #[must_use]
    pub fn prior_poll_errors(&self) -> &[(Category, PollError)] {
        match self {
            Self::Listener {
                prior_poll_errors, ..
            } => prior_poll_errors,
            _ => &[],
        }
    }

    /// Returns true if calling `check_updates` again may succeed.
    ///
    /// The monitor itself never retries.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Poll { source, .. } => {
                matches!(source, PollError::Connection { .. } | PollError::Timeout { .. })
            }
            Self::Stream(e) => matches!(e, StreamError::Timeout { .. }),
            _ => false,
        }
    }
}

/// Result type alias for edgemon operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
