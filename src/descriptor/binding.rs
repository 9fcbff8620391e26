//! Raw and normalized binding records.
//!
//! Raw records are what registration ingestion hands over (deserialized from
//! the configuration file or built in code). Normalized bindings are the
//! immutable descriptors the matcher works with.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::descriptor::error::DescriptorError;

/// Identifier assigned by the registry, increasing in registration order.
pub type RegistrationId = u64;

/// Methods assumed for resource-type bindings that declare none.
pub const DEFAULT_METHODS: [&str; 2] = ["GET", "HEAD"];

/// Method entry that matches every request method.
pub const ANY_METHOD: &str = "*";

/// Request-processing phase during which a filter is eligible to run.
///
/// Serialized upper case; parsed case-insensitively from config and CLI alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterScope {
    /// Once per request entering from the outside.
    Request,
    /// Once per included component rendering.
    Component,
    /// Before the error handler is resolved.
    Error,
    /// On request dispatcher includes.
    Include,
    /// On request dispatcher forwards.
    Forward,
}

impl FilterScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterScope::Request => "REQUEST",
            FilterScope::Component => "COMPONENT",
            FilterScope::Error => "ERROR",
            FilterScope::Include => "INCLUDE",
            FilterScope::Forward => "FORWARD",
        }
    }
}

impl fmt::Display for FilterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterScope {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REQUEST" => Ok(FilterScope::Request),
            "COMPONENT" => Ok(FilterScope::Component),
            "ERROR" => Ok(FilterScope::Error),
            "INCLUDE" => Ok(FilterScope::Include),
            "FORWARD" => Ok(FilterScope::Forward),
            _ => Err(DescriptorError::UnknownScope(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for FilterScope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<FilterScope>().map_err(de::Error::custom)
    }
}

/// A compiled regular expression that must match its whole input.
///
/// Equality compares the source text, not the compiled automaton.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as it was declared.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_full_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

// --- Raw records ---

/// Servlet registration as declared, before it is split into bindings.
///
/// A servlet declaring both `paths` and `resource_types` is registered both ways.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawServlet {
    /// Explicit servlet name.
    pub name: Option<String>,
    /// Component identifier used when no name is given.
    pub component: Option<String>,
    pub paths: Vec<String>,
    pub resource_types: Vec<String>,
    /// Prefix specifier: empty, a search path index, or an absolute path.
    pub prefix: String,
    /// Strict path mode, `true` when unset.
    pub strict: Option<bool>,
    pub selectors: Vec<String>,
    pub extensions: Vec<String>,
    pub methods: Vec<String>,
    pub rank: i32,
}

impl RawServlet {
    /// Split the servlet into its path and resource-type bindings.
    ///
    /// A servlet with neither yields a single path binding without paths,
    /// which normalization rejects.
    pub fn into_bindings(self) -> Vec<RawBinding> {
        let mut bindings = Vec::with_capacity(2);
        let unbound = self.paths.is_empty() && self.resource_types.is_empty();

        if !self.paths.is_empty() || unbound {
            bindings.push(RawBinding::Path(RawPathBinding {
                name: self.name.clone(),
                component: self.component.clone(),
                paths: self.paths.clone(),
                prefix: self.prefix.clone(),
                strict: self.strict,
                selectors: self.selectors.clone(),
                extensions: self.extensions.clone(),
                methods: self.methods.clone(),
                rank: self.rank,
            }));
        }

        if !self.resource_types.is_empty() {
            bindings.push(RawBinding::ResourceType(RawResourceTypeBinding {
                name: self.name,
                component: self.component,
                resource_types: self.resource_types,
                prefix: self.prefix,
                selectors: self.selectors,
                extensions: self.extensions,
                methods: self.methods,
                rank: self.rank,
            }));
        }

        bindings
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawPathBinding {
    pub name: Option<String>,
    pub component: Option<String>,
    pub paths: Vec<String>,
    pub prefix: String,
    pub strict: Option<bool>,
    pub selectors: Vec<String>,
    pub extensions: Vec<String>,
    pub methods: Vec<String>,
    pub rank: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawResourceTypeBinding {
    pub name: Option<String>,
    pub component: Option<String>,
    pub resource_types: Vec<String>,
    pub prefix: String,
    pub selectors: Vec<String>,
    pub extensions: Vec<String>,
    pub methods: Vec<String>,
    pub rank: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawFilterBinding {
    pub name: Option<String>,
    pub component: Option<String>,
    /// Regex matched against the resource path (no selectors, extension or suffix).
    pub pattern: Option<String>,
    /// Regex matched against the request suffix.
    pub suffix_pattern: Option<String>,
    pub resource_types: Vec<String>,
    pub methods: Vec<String>,
    pub extensions: Vec<String>,
    pub selectors: Vec<String>,
    pub scope: Vec<FilterScope>,
    pub rank: i32,
}

/// A raw record of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBinding {
    Path(RawPathBinding),
    ResourceType(RawResourceTypeBinding),
    Filter(RawFilterBinding),
}

impl RawBinding {
    /// Best-effort label for reporting rejected records.
    pub fn label(&self) -> Option<&str> {
        let (name, component) = match self {
            RawBinding::Path(b) => (&b.name, &b.component),
            RawBinding::ResourceType(b) => (&b.name, &b.component),
            RawBinding::Filter(b) => (&b.name, &b.component),
        };
        name.as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(component.as_deref())
    }
}

// --- Normalized bindings ---

/// Servlet bound to exact resource paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBinding {
    pub name: String,
    /// Absolute paths, in declaration order.
    pub paths: Vec<String>,
    /// The resolved prefix that was applied to relative paths.
    pub prefix: String,
    /// Legacy bindings (`false`) match on the path alone.
    pub strict: bool,
    pub selectors: Vec<String>,
    pub extensions: BTreeSet<String>,
    /// Empty means every method.
    pub methods: BTreeSet<String>,
    pub rank: i32,
}

/// Servlet bound to one or more resource types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypeBinding {
    pub name: String,
    /// Absolute resource types, in declaration order.
    pub resource_types: Vec<String>,
    pub prefix: String,
    /// Declared in URL order.
    pub selectors: Vec<String>,
    /// Empty means unrestricted.
    pub extensions: BTreeSet<String>,
    /// Never empty after normalization.
    pub methods: BTreeSet<String>,
    pub rank: i32,
}

/// Filter selection criteria. Every empty predicate is satisfied by any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBinding {
    pub name: String,
    pub pattern: Option<Pattern>,
    pub suffix_pattern: Option<Pattern>,
    pub resource_types: BTreeSet<String>,
    pub methods: BTreeSet<String>,
    pub extensions: BTreeSet<String>,
    /// At least one must be present in the request.
    pub selectors: BTreeSet<String>,
    /// Never empty after normalization.
    pub scope: BTreeSet<FilterScope>,
    /// Higher runs first.
    pub rank: i32,
}

/// A normalized binding of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Path(PathBinding),
    ResourceType(ResourceTypeBinding),
    Filter(FilterBinding),
}

impl Binding {
    pub fn name(&self) -> &str {
        match self {
            Binding::Path(b) => &b.name,
            Binding::ResourceType(b) => &b.name,
            Binding::Filter(b) => &b.name,
        }
    }

    pub fn rank(&self) -> i32 {
        match self {
            Binding::Path(b) => b.rank,
            Binding::ResourceType(b) => b.rank,
            Binding::Filter(b) => b.rank,
        }
    }
}

impl From<&Binding> for RawBinding {
    fn from(binding: &Binding) -> Self {
        match binding {
            Binding::Path(b) => RawBinding::Path(RawPathBinding {
                name: Some(b.name.clone()),
                component: None,
                paths: b.paths.clone(),
                prefix: b.prefix.clone(),
                strict: Some(b.strict),
                selectors: b.selectors.clone(),
                extensions: b.extensions.iter().cloned().collect(),
                methods: b.methods.iter().cloned().collect(),
                rank: b.rank,
            }),
            Binding::ResourceType(b) => RawBinding::ResourceType(RawResourceTypeBinding {
                name: Some(b.name.clone()),
                component: None,
                resource_types: b.resource_types.clone(),
                prefix: b.prefix.clone(),
                selectors: b.selectors.clone(),
                extensions: b.extensions.iter().cloned().collect(),
                methods: b.methods.iter().cloned().collect(),
                rank: b.rank,
            }),
            Binding::Filter(b) => RawBinding::Filter(RawFilterBinding {
                name: Some(b.name.clone()),
                component: None,
                pattern: b.pattern.as_ref().map(|p| p.as_str().to_string()),
                suffix_pattern: b.suffix_pattern.as_ref().map(|p| p.as_str().to_string()),
                resource_types: b.resource_types.iter().cloned().collect(),
                methods: b.methods.iter().cloned().collect(),
                extensions: b.extensions.iter().cloned().collect(),
                selectors: b.selectors.iter().cloned().collect(),
                scope: b.scope.iter().copied().collect(),
                rank: b.rank,
            }),
        }
    }
}
