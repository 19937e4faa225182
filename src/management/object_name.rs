//! Object names and object-name patterns.
//!
//! An object name has the form `domain:key=value,key=value`. Two names are
//! equal when their domains and key/value sets are equal, whatever order the
//! keys were written in. This is what keeps [`ObjectInstance`] a stable
//! resource identity across polls.
//!
//! Values (and the domain) may contain `*` and `?` wildcards, and a bare `*`
//! property turns the name into a property-list pattern that also matches
//! names with extra keys. Patterns are compiled into an [`ObjectNamePattern`]
//! before querying.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const FORBIDDEN_KEY_CHARS: &[char] = &[':', ',', '=', '*', '?', '"', '\n'];
const FORBIDDEN_VALUE_CHARS: &[char] = &[':', ',', '=', '"', '\n'];

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidObjectName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?'])
}

/// A parsed object name, compared by its canonical form.
///
/// # Examples
///
/// ```
/// use edgemon::management::ObjectName;
///
/// let a: ObjectName = "broker:type=Consumer,id=1".parse().unwrap();
/// let b: ObjectName = "broker:id=1,type=Consumer".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "broker:id=1,type=Consumer");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName {
    domain: String,
    properties: BTreeMap<String, String>,
    property_list_pattern: bool,
    canonical: String,
}

impl ObjectName {
    /// Parses `domain:key=value,...`.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let (domain, props) = name
            .split_once(':')
            .ok_or_else(|| invalid(name, "missing ':' between domain and key properties"))?;

        if domain.is_empty() {
            return Err(invalid(name, "domain cannot be empty"));
        }
        if domain.contains(['\n', '=', ',']) {
            return Err(invalid(name, "domain contains a reserved character"));
        }

        let mut properties = BTreeMap::new();
        let mut property_list_pattern = false;

        for part in props.split(',') {
            if part == "*" {
                if property_list_pattern {
                    return Err(invalid(name, "'*' may appear only once in the key properties"));
                }
                property_list_pattern = true;
                continue;
            }

            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| invalid(name, format!("key property '{part}' has no '='")))?;

            if key.is_empty() {
                return Err(invalid(name, "empty key"));
            }
            if key.contains(FORBIDDEN_KEY_CHARS) {
                return Err(invalid(name, format!("key '{key}' contains a reserved character")));
            }
            if value.is_empty() {
                return Err(invalid(name, format!("empty value for key '{key}'")));
            }
            if value.contains(FORBIDDEN_VALUE_CHARS) {
                return Err(invalid(
                    name,
                    format!("value for key '{key}' contains a reserved character (quoted values are not supported)"),
                ));
            }
            if properties.insert(key.to_string(), value.to_string()).is_some() {
                return Err(invalid(name, format!("duplicate key '{key}'")));
            }
        }

        if properties.is_empty() && !property_list_pattern {
            return Err(invalid(name, "no key properties"));
        }

        let canonical = canonicalize(domain, &properties, property_list_pattern);
        Ok(Self {
            domain: domain.to_string(),
            properties,
            property_list_pattern,
            canonical,
        })
    }

    /// The domain part.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Value of one key property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// All key properties, sorted by key.
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Returns true if the name contains wildcards or is a property-list pattern.
    #[must_use]
    pub fn is_pattern(&self) -> bool {
        self.property_list_pattern
            || has_wildcard(&self.domain)
            || self.properties.values().any(|v| has_wildcard(v))
    }

    /// Returns true if names with additional keys also match.
    #[must_use]
    pub const fn is_property_list_pattern(&self) -> bool {
        self.property_list_pattern
    }

    /// Canonical string form: keys sorted lexicographically.
    #[must_use]
    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }
}

fn canonicalize(domain: &str, properties: &BTreeMap<String, String>, property_list_pattern: bool) -> String {
    let mut out = String::with_capacity(domain.len() + 16 * properties.len());
    out.push_str(domain);
    out.push(':');
    let mut first = true;
    for (k, v) in properties {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(k);
        out.push('=');
        out.push_str(v);
    }
    if property_list_pattern {
        if !first {
            out.push(',');
        }
        out.push('*');
    }
    out
}

impl PartialEq for ObjectName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for ObjectName {}

impl Hash for ObjectName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for ObjectName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for ObjectName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ObjectName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectName> for String {
    fn from(name: ObjectName) -> Self {
        name.canonical
    }
}

/// A compiled object-name matcher.
#[derive(Debug, Clone)]
pub struct ObjectNamePattern {
    name: ObjectName,
    domain: Regex,
    values: BTreeMap<String, Regex>,
}

impl ObjectNamePattern {
    /// Compiles `name`. Non-pattern names compile to exact matchers.
    pub fn compile(name: ObjectName) -> Result<Self, ConfigError> {
        let domain = glob_regex(&name, &name.domain)?;
        let values = name
            .properties
            .iter()
            .map(|(k, v)| glob_regex(&name, v).map(|re| (k.clone(), re)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { name, domain, values })
    }

    /// Parses and compiles in one step.
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        Self::compile(ObjectName::parse(pattern)?)
    }

    /// The pattern as written (canonicalized).
    #[must_use]
    pub const fn object_name(&self) -> &ObjectName {
        &self.name
    }

    /// Returns true if `candidate` is selected by this pattern.
    ///
    /// Pattern names never match other patterns.
    #[must_use]
    pub fn matches(&self, candidate: &ObjectName) -> bool {
        if candidate.is_pattern() {
            return false;
        }
        if !self.domain.is_match(&candidate.domain) {
            return false;
        }
        if !self.name.property_list_pattern && candidate.properties.len() != self.values.len() {
            return false;
        }
        self.values.iter().all(|(key, re)| {
            candidate
                .property(key)
                .is_some_and(|value| re.is_match(value))
        })
    }
}

impl fmt::Display for ObjectNamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.name, f)
    }
}

fn glob_regex(name: &ObjectName, glob: &str) -> Result<Regex, ConfigError> {
    let mut expr = String::with_capacity(glob.len() + 8);
    expr.push('^');
    for c in glob.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|e| invalid(name.canonical_name(), format!("cannot compile pattern: {e}")))
}

/// A registered managed object: its name plus implementing class.
///
/// This is the resource identity for broker monitoring: equal name and class
/// means the same consumer or producer, even if the management connection was
/// re-established in between.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectInstance {
    pub name: ObjectName,
    pub class_name: String,
}

impl ObjectInstance {
    /// Creates an instance.
    #[must_use]
    pub fn new(name: ObjectName, class_name: impl Into<String>) -> Self {
        Self {
            name,
            class_name: class_name.into(),
        }
    }
}

impl fmt::Display for ObjectInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.class_name, self.name)
    }
}
