//! Resource identity contract.
//!
//! The diff engine only ever compares resources. Two values must be equal if and
//! only if they denote the same monitored resource, and that equality must hold
//! across polls even when the transport handles behind a resource were rebuilt.
//! An unstable `Eq`/`Hash` shows up as spurious enter/exit pairs.

use std::fmt;
use std::hash::Hash;

/// Marker for types usable as a monitored resource identity.
///
/// Blanket-implemented for every `Clone + Eq + Hash + Debug + Send + Sync + 'static`
/// type, so plain strings, integers, and [`ObjectInstance`](crate::management::ObjectInstance)
/// all qualify.
///
/// # Examples
///
/// ```
/// use edgemon::ResourceIdentity;
///
/// fn assert_identity<R: ResourceIdentity>() {}
/// assert_identity::<String>();
/// assert_identity::<u64>();
/// ```
pub trait ResourceIdentity: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> ResourceIdentity for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}
