//! Message broker wiring.
//!
//! Builds a [`Monitor<ObjectInstance>`] that watches a broker's consumers and
//! producers through a [`ManagementConnection`]. By default two categories are
//! tracked:
//!
//! | category           | object name (per broker)                                  | filter                  |
//! |--------------------|-----------------------------------------------------------|-------------------------|
//! | `slow-consumer`    | `...,endpoint=Consumer,clientId=*,consumerId=*`           | `SlowConsumer = true`   |
//! | `producer-blocked` | `...,endpoint=Producer,clientId=*,producerId=*`           | `ProducerBlocked = true`|
//!
//! Custom categories can be supplied as [`CategoryDefinition`]s; a `{broker}`
//! placeholder in their object name is replaced by the configured broker name.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::category::Category;
use crate::config::{parse_json, read_to_string, MonitorConfig};
use crate::error::{ConfigError, MonitorResult};
use crate::monitor::{Monitor, PollFn};

use super::connection::{attribute_poll, AttributeFilter, ManagementConnection};
use super::object_name::{ObjectInstance, ObjectName, ObjectNamePattern};

/// Object name domain used by the broker.
pub const BROKER_DOMAIN: &str = "org.apache.activemq";

/// Consumer attribute set while the broker considers the consumer slow.
pub const SLOW_CONSUMER_ATTRIBUTE: &str = "SlowConsumer";

/// Producer attribute set while flow control blocks the producer.
pub const PRODUCER_BLOCKED_ATTRIBUTE: &str = "ProducerBlocked";

const BROKER_PLACEHOLDER: &str = "{broker}";

/// Checks that `name` can be embedded as the `brokerName` property value.
pub fn validate_broker_name(name: &str) -> Result<(), ConfigError> {
    let reject = |reason: &str| ConfigError::InvalidBrokerName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(reject("cannot be empty"));
    }
    if name.contains([':', ',', '=', '"', '\n']) {
        return Err(reject("contains a reserved object name character"));
    }
    if name.contains(['*', '?']) {
        return Err(reject("cannot contain wildcards"));
    }
    Ok(())
}

fn endpoint_template(endpoint: &str, id_key: &str) -> String {
    format!(
        "{BROKER_DOMAIN}:type=Broker,brokerName={BROKER_PLACEHOLDER},destinationType=*,destinationName=*,endpoint={endpoint},clientId=*,{id_key}=*"
    )
}

fn expand(template: &str, broker: &str) -> String {
    template.replace(BROKER_PLACEHOLDER, broker)
}

/// Pattern matching every consumer of `broker`.
pub fn consumers_pattern(broker: &str) -> Result<ObjectNamePattern, ConfigError> {
    validate_broker_name(broker)?;
    ObjectNamePattern::parse(&expand(&endpoint_template("Consumer", "consumerId"), broker))
}

/// Pattern matching every producer of `broker`.
pub fn producers_pattern(broker: &str) -> Result<ObjectNamePattern, ConfigError> {
    validate_broker_name(broker)?;
    ObjectNamePattern::parse(&expand(&endpoint_template("Producer", "producerId"), broker))
}

fn endpoint_name(
    broker: &str,
    destination_type: &str,
    destination_name: &str,
    endpoint: &str,
    client_id: &str,
    id_key: &str,
    id: &str,
) -> Result<ObjectName, ConfigError> {
    validate_broker_name(broker)?;
    let name = ObjectName::parse(&format!(
        "{BROKER_DOMAIN}:type=Broker,brokerName={broker},destinationType={destination_type},destinationName={destination_name},endpoint={endpoint},clientId={client_id},{id_key}={id}"
    ))?;
    if name.is_pattern() {
        return Err(ConfigError::InvalidObjectName {
            name: name.to_string(),
            reason: "endpoint names cannot contain wildcards".to_string(),
        });
    }
    Ok(name)
}

/// Concrete object name of one consumer endpoint.
pub fn consumer_name(
    broker: &str,
    destination_type: &str,
    destination_name: &str,
    client_id: &str,
    consumer_id: &str,
) -> Result<ObjectName, ConfigError> {
    endpoint_name(
        broker,
        destination_type,
        destination_name,
        "Consumer",
        client_id,
        "consumerId",
        consumer_id,
    )
}

/// Concrete object name of one producer endpoint.
pub fn producer_name(
    broker: &str,
    destination_type: &str,
    destination_name: &str,
    client_id: &str,
    producer_id: &str,
) -> Result<ObjectName, ConfigError> {
    endpoint_name(
        broker,
        destination_type,
        destination_name,
        "Producer",
        client_id,
        "producerId",
        producer_id,
    )
}

fn default_expected() -> Value {
    Value::Bool(true)
}

#[allow(missing_docs)]
/// One monitored category: which objects to query and which attribute value
/// puts them in the category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDefinition {
    pub category: Category,
    /// Object name pattern; `{broker}` is replaced by the broker name.
    pub object_name: String,
    pub attribute: String,
    #[serde(default = "default_expected")]
    pub expected: Value,
}

impl CategoryDefinition {
    /// Resolves the definition against `broker`.
    pub fn compile(&self, broker: &str) -> Result<(ObjectNamePattern, AttributeFilter), ConfigError> {
        validate_broker_name(broker)?;
        let pattern = ObjectNamePattern::parse(&expand(&self.object_name, broker))?;
        let filter = AttributeFilter::equals(self.attribute.clone(), self.expected.clone())?;
        Ok((pattern, filter))
    }
}

/// The slow-consumer and producer-blocked categories.
#[must_use]
pub fn default_categories() -> Vec<CategoryDefinition> {
    vec![
        CategoryDefinition {
            category: Category::SLOW_CONSUMER,
            object_name: endpoint_template("Consumer", "consumerId"),
            attribute: SLOW_CONSUMER_ATTRIBUTE.to_string(),
            expected: default_expected(),
        },
        CategoryDefinition {
            category: Category::PRODUCER_BLOCKED,
            object_name: endpoint_template("Producer", "producerId"),
            attribute: PRODUCER_BLOCKED_ATTRIBUTE.to_string(),
            expected: default_expected(),
        },
    ]
}

#[allow(missing_docs)]
/// Broker monitor configuration.
///
/// ```json
/// {
///   "broker_name": "localhost",
///   "monitor": { "poll_failure_policy": "continue" },
///   "categories": []
/// }
/// ```
///
/// An empty `categories` list selects [`default_categories`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerMonitorConfig {
    pub broker_name: String,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub categories: Vec<CategoryDefinition>,
}

impl BrokerMonitorConfig {
    /// Default categories for `broker_name`.
    #[must_use]
    pub fn new(broker_name: impl Into<String>) -> Self {
        Self {
            broker_name: broker_name.into(),
            monitor: MonitorConfig::default(),
            categories: Vec::new(),
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = parse_json(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses, and validates a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read_to_string(path.as_ref())?)
    }

    /// Checks the broker name, the monitor settings, and every category.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_broker_name(&self.broker_name)?;
        self.monitor.validate()?;
        for def in self.resolved_categories() {
            def.compile(&self.broker_name)?;
        }
        Ok(())
    }

    /// Configured categories, or the defaults when none are configured.
    #[must_use]
    pub fn resolved_categories(&self) -> Vec<CategoryDefinition> {
        if self.categories.is_empty() {
            default_categories()
        } else {
            self.categories.clone()
        }
    }
}

/// Builds a monitor polling `connection` for every configured category.
///
/// Nothing is queried until the first `check_updates`.
pub fn build_monitor(
    connection: Arc<dyn ManagementConnection>,
    cfg: &BrokerMonitorConfig,
) -> MonitorResult<Monitor<ObjectInstance>> {
    validate_broker_name(&cfg.broker_name)?;

    let mut categories: Vec<(Category, PollFn<ObjectInstance>)> = Vec::new();
    for def in cfg.resolved_categories() {
        let (pattern, filter) = def.compile(&cfg.broker_name)?;
        info!(
            broker = %cfg.broker_name,
            category = %def.category,
            pattern = %pattern,
            filter = %filter,
            "Category configured"
        );
        categories.push((
            def.category,
            attribute_poll(Arc::clone(&connection), pattern, filter),
        ));
    }

    Monitor::new(cfg.monitor.clone(), categories)
}
