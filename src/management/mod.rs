//! Management interface polling.
//!
//! Resources here are managed objects exposed by a management server (for
//! example a message broker's consumers and producers), addressed by
//! [`ObjectName`]s of the form `domain:key=value,...`. A category is defined by
//! an [`ObjectNamePattern`] plus an [`AttributeFilter`]; every poll asks the
//! [`ManagementConnection`] which objects currently satisfy both.
//!
//! The connection itself (transport, credentials, reconnects) is supplied by
//! the caller. [`InMemoryManagementServer`] is an in-process implementation.

pub mod broker;
mod connection;
mod memory;
mod object_name;

pub use broker::{build_monitor, BrokerMonitorConfig, CategoryDefinition};
pub use connection::{attribute_poll, AttributeFilter, ManagementConnection, QueryError};
pub use memory::InMemoryManagementServer;
pub use object_name::{ObjectInstance, ObjectName, ObjectNamePattern};
