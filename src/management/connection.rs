//! Management connection abstraction.
//!
//! A [`ManagementConnection`] answers one question: which managed objects
//! matching a name pattern currently have a given attribute value. Opening the
//! connection, authentication, and reconnects belong to the implementor.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{ConfigError, PollError};
use crate::monitor::PollFn;

use super::object_name::{ObjectInstance, ObjectNamePattern};

/// Errors reported by a management connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The connection is down or could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server refused the request.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Server-side failure.
    #[error("Management backend error: {0}")]
    Backend(String),
}

impl From<QueryError> for PollError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Connection(message) => Self::Connection { message },
            QueryError::Rejected(message) | QueryError::Backend(message) => Self::Query { message },
        }
    }
}

/// Attribute equality filter, e.g. `SlowConsumer = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAttributeFilter")]
pub struct AttributeFilter {
    attribute: String,
    expected: Value,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAttributeFilter {
    attribute: String,
    expected: Value,
}

impl TryFrom<RawAttributeFilter> for AttributeFilter {
    type Error = ConfigError;

    fn try_from(raw: RawAttributeFilter) -> Result<Self, Self::Error> {
        Self::equals(raw.attribute, raw.expected)
    }
}

impl AttributeFilter {
    /// Matches objects whose `attribute` equals `expected`.
    pub fn equals(attribute: impl Into<String>, expected: impl Into<Value>) -> Result<Self, ConfigError> {
        let attribute = attribute.into();
        if attribute.trim().is_empty() {
            return Err(ConfigError::InvalidAttributeFilter {
                reason: "attribute name cannot be empty".to_string(),
            });
        }
        if attribute.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidAttributeFilter {
                reason: format!("attribute name '{attribute}' contains whitespace"),
            });
        }
        let expected = expected.into();
        if expected.is_null() {
            return Err(ConfigError::InvalidAttributeFilter {
                reason: format!("expected value for '{attribute}' cannot be null"),
            });
        }
        Ok(Self { attribute, expected })
    }

    /// Matches objects whose boolean `attribute` is true.
    pub fn is_true(attribute: impl Into<String>) -> Result<Self, ConfigError> {
        Self::equals(attribute, true)
    }

    /// The attribute being tested.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The value it must equal.
    #[must_use]
    pub const fn expected(&self) -> &Value {
        &self.expected
    }

    /// Evaluates the filter against an object's attributes. Missing attributes
    /// never match.
    #[must_use]
    pub fn matches(&self, attributes: &Map<String, Value>) -> bool {
        attributes.get(&self.attribute) == Some(&self.expected)
    }
}

impl fmt::Display for AttributeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.attribute, self.expected)
    }
}

/// Query access to a management server.
pub trait ManagementConnection: Send + Sync {
    /// Returns every object matching `pattern` whose attributes satisfy `filter`.
    fn query(
        &self,
        pattern: &ObjectNamePattern,
        filter: &AttributeFilter,
    ) -> Result<HashSet<ObjectInstance>, QueryError>;
}

impl<T: ManagementConnection + ?Sized> ManagementConnection for Arc<T> {
    fn query(
        &self,
        pattern: &ObjectNamePattern,
        filter: &AttributeFilter,
    ) -> Result<HashSet<ObjectInstance>, QueryError> {
        (**self).query(pattern, filter)
    }
}

/// Wraps a `(pattern, filter)` query as a monitor poll function.
#[must_use]
pub fn attribute_poll<C>(connection: C, pattern: ObjectNamePattern, filter: AttributeFilter) -> PollFn<ObjectInstance>
where
    C: ManagementConnection + 'static,
{
    Box::new(move || connection.query(&pattern, &filter).map_err(PollError::from))
}
