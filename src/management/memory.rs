//! In-memory management server.
//!
//! Thread-safe reference implementation of [`ManagementConnection`]. It is
//! intended for embedded usage, tests, and demos: register objects, flip their
//! attributes, and let a monitor poll it. Availability can be toggled to
//! exercise connection failures.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::connection::{AttributeFilter, ManagementConnection, QueryError};
use super::object_name::{ObjectInstance, ObjectName, ObjectNamePattern};

fn lock_err(context: &'static str) -> QueryError {
    QueryError::Backend(format!("poisoned lock: {context}"))
}

#[derive(Debug, Clone)]
struct RegisteredObject {
    class_name: String,
    attributes: Map<String, Value>,
}

/// Management server backed by a map of registered objects.
#[derive(Debug, Default)]
pub struct InMemoryManagementServer {
    objects: RwLock<HashMap<ObjectName, RegisteredObject>>,
    unavailable: AtomicBool,
    queries: AtomicU64,
}

impl InMemoryManagementServer {
    /// Creates an empty, available server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object. Pattern names and duplicate names are rejected.
    pub fn register(
        &self,
        name: ObjectName,
        class_name: impl Into<String>,
        attributes: Map<String, Value>,
    ) -> Result<ObjectInstance, QueryError> {
        if name.is_pattern() {
            return Err(QueryError::Rejected(format!("cannot register pattern name {name}")));
        }

        let class_name = class_name.into();
        let mut guard = self.objects.write().map_err(|_| lock_err("objects.write"))?;
        if guard.contains_key(&name) {
            return Err(QueryError::Rejected(format!("{name} is already registered")));
        }
        guard.insert(
            name.clone(),
            RegisteredObject {
                class_name: class_name.clone(),
                attributes,
            },
        );
        Ok(ObjectInstance::new(name, class_name))
    }

    /// Removes an object. Returns false if it was not registered.
    pub fn unregister(&self, name: &ObjectName) -> Result<bool, QueryError> {
        let mut guard = self.objects.write().map_err(|_| lock_err("objects.write"))?;
        Ok(guard.remove(name).is_some())
    }

    /// Sets one attribute on a registered object.
    pub fn set_attribute(
        &self,
        name: &ObjectName,
        attribute: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), QueryError> {
        let mut guard = self.objects.write().map_err(|_| lock_err("objects.write"))?;
        let object = guard
            .get_mut(name)
            .ok_or_else(|| QueryError::Rejected(format!("{name} is not registered")))?;
        object.attributes.insert(attribute.into(), value.into());
        Ok(())
    }

    /// Reads one attribute.
    pub fn attribute(&self, name: &ObjectName, attribute: &str) -> Result<Option<Value>, QueryError> {
        let guard = self.objects.read().map_err(|_| lock_err("objects.read"))?;
        Ok(guard
            .get(name)
            .and_then(|object| object.attributes.get(attribute).cloned()))
    }

    /// Number of registered objects.
    pub fn len(&self) -> Result<usize, QueryError> {
        let guard = self.objects.read().map_err(|_| lock_err("objects.read"))?;
        Ok(guard.len())
    }

    /// Returns true if no object is registered.
    pub fn is_empty(&self) -> Result<bool, QueryError> {
        self.len().map(|n| n == 0)
    }

    /// Makes subsequent queries fail with [`QueryError::Connection`] (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Returns true if queries are currently answered.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    /// Queries answered or refused so far.
    #[must_use]
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

impl ManagementConnection for InMemoryManagementServer {
    fn query(
        &self,
        pattern: &ObjectNamePattern,
        filter: &AttributeFilter,
    ) -> Result<HashSet<ObjectInstance>, QueryError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if !self.is_available() {
            return Err(QueryError::Connection("management server unavailable".to_string()));
        }

        let guard = self.objects.read().map_err(|_| lock_err("objects.read"))?;
        Ok(guard
            .iter()
            .filter(|(name, object)| pattern.matches(name) && filter.matches(&object.attributes))
            .map(|(name, object)| ObjectInstance::new(name.clone(), object.class_name.clone()))
            .collect())
    }
}
