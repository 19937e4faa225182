//! # edgemon - Edge-triggered membership monitoring
//!
//! edgemon turns periodic snapshots into change notifications. A caller
//! supplies one poll function per category ("slow consumers", "blocked
//! producers", ...) returning the set of resources currently in it. Each
//! [`Monitor::check_updates`] call diffs those sets against the previous
//! snapshot and notifies listeners once per resource that entered or exited.
//!
//! ## Core Concepts
//!
//! - **Resource**: any [`ResourceIdentity`]; equality decides "same resource"
//! - **Category**: a named set of resources sharing a predicate
//! - **CategoryTracker**: last-known membership plus the diff algorithm
//! - **Dispatcher**: ordered, synchronous listener fan-out
//! - **Monitor**: polls every category and emits the transitions
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::HashSet;
//! use edgemon::{Category, Monitor, TransitionEvent};
//!
//! let mut monitor = Monitor::builder()
//!     .category(Category::SLOW_CONSUMER, || Ok(HashSet::from(["consumer-1"])))
//!     .build()?;
//!
//! monitor.dispatcher().add_fn(|event: &TransitionEvent<&'static str>| {
//!     println!("{} {} {}", event.category, event.direction, event.resource);
//!     Ok(())
//! });
//!
//! let summary = monitor.check_updates()?;
//! assert_eq!(summary.entered, 1);
//! # Ok::<(), edgemon::MonitorError>(())
//! ```
//!
//! The [`management`] module wires the same engine to a management server, with
//! ready-made slow-consumer and producer-blocked categories for a message broker.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core engine
pub mod category;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod identity;
pub mod tracker;

// Facade and drivers
pub mod config;
pub mod monitor;
pub mod poller;
pub mod stream;

// Management server integration
pub mod management;

// Re-export primary types at crate root for convenience
pub use category::{Category, Direction, TrackerState};
pub use config::{FailurePolicy, MonitorConfig};
pub use dispatcher::{DispatchError, Dispatcher, Listener, ListenerId};
pub use error::{ConfigError, ListenerError, MonitorError, MonitorResult, PollError, StreamError};
pub use event::TransitionEvent;
pub use identity::ResourceIdentity;
pub use monitor::{CheckSummary, Monitor, MonitorBuilder, PollFn, SharedMonitor};
pub use poller::{Poller, PollerConfig};
pub use stream::TransitionStream;
pub use tracker::{CategoryTracker, Reconciliation};
