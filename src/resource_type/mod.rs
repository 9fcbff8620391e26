//! Resource-type inheritance.
//!
//! # Responsibilities
//! - Look up the declared super type of a resource type
//! - Walk the super-type chain from the most to the least specific type
//! - Locate relative resource types under the search paths
//!
//! # Design Decisions
//! - Types are referenced by string key; the graph holds no pointers
//! - Cycles truncate the walk at the repeated type instead of failing
//! - The walk is also capped at `MAX_ANCESTOR_DEPTH` for lookups backed by unbounded content

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::descriptor::prefix::{apply_prefix, ROOT_PREFIX};

/// Upper bound on the number of types a single walk yields.
pub const MAX_ANCESTOR_DEPTH: usize = 64;

/// Source of super-type declarations.
pub trait SuperTypeLookup {
    /// The declared parent of `resource_type`, if any.
    fn super_type_of(&self, resource_type: &str) -> Option<&str>;
}

/// Map-backed super-type lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTypeGraph {
    parents: HashMap<String, String>,
}

impl ResourceTypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(child, parent)` pairs. Blank entries are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut graph = Self::new();
        for (child, parent) in pairs {
            graph.insert(child, parent);
        }
        graph
    }

    /// Declare `parent` as the super type of `child`, replacing any previous one.
    pub fn insert(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        let child = child.into().trim().to_string();
        let parent = parent.into().trim().to_string();
        if child.is_empty() || parent.is_empty() {
            tracing::debug!(%child, %parent, "Skipping blank super type declaration");
            return;
        }
        self.parents.insert(child, parent);
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Walk the super-type chain of `resource_type`, starting with itself.
    pub fn ancestors_of<'a>(&'a self, resource_type: &'a str) -> Ancestors<'a, Self> {
        ancestors_of(self, resource_type)
    }
}

impl SuperTypeLookup for ResourceTypeGraph {
    fn super_type_of(&self, resource_type: &str) -> Option<&str> {
        self.parents.get(resource_type).map(String::as_str)
    }
}

/// Walk the super-type chain of `resource_type` through `lookup`.
///
/// Each call returns a fresh iterator, so the walk can be restarted at will.
pub fn ancestors_of<'a, L: SuperTypeLookup + ?Sized>(
    lookup: &'a L,
    resource_type: &'a str,
) -> Ancestors<'a, L> {
    Ancestors {
        lookup,
        next: Some(resource_type).filter(|rt| !rt.is_empty()),
        seen: HashSet::new(),
    }
}

/// Lazy iterator over a resource type and its ancestors.
pub struct Ancestors<'a, L: ?Sized> {
    lookup: &'a L,
    next: Option<&'a str>,
    seen: HashSet<&'a str>,
}

impl<'a, L: ?Sized> Clone for Ancestors<'a, L> {
    fn clone(&self) -> Self {
        Self {
            lookup: self.lookup,
            next: self.next,
            seen: self.seen.clone(),
        }
    }
}

impl<'a, L: SuperTypeLookup + ?Sized> Iterator for Ancestors<'a, L> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let current = self.next.take()?;

        if !self.seen.insert(current) {
            tracing::debug!(resource_type = current, "Super type cycle detected, truncating walk");
            return None;
        }
        if self.seen.len() > MAX_ANCESTOR_DEPTH {
            tracing::debug!(resource_type = current, "Super type chain too deep, truncating walk");
            return None;
        }

        let lookup = self.lookup;
        self.next = lookup
            .super_type_of(current)
            .filter(|parent| !parent.is_empty());
        Some(current)
    }
}

/// A request's resource type hierarchy, expanded against the search paths.
///
/// Level 0 is the type itself. Each level holds the type as declared and, for
/// relative types, its location under every search path in priority order
/// followed by its location under `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHierarchy {
    levels: Vec<Vec<String>>,
}

impl TypeHierarchy {
    pub fn resolve<L: SuperTypeLookup + ?Sized>(
        lookup: &L,
        resource_type: &str,
        search_paths: &[String],
    ) -> Self {
        let levels = ancestors_of(lookup, resource_type)
            .map(|rt| {
                let mut forms = vec![rt.to_string()];
                if !rt.starts_with('/') {
                    forms.extend(search_paths.iter().map(|sp| apply_prefix(sp, rt)));
                    // Where bindings land under the root default prefix
                    forms.push(apply_prefix(ROOT_PREFIX, rt));
                }
                forms
            })
            .collect();
        Self { levels }
    }

    /// Number of levels, including the type itself.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// The most specific level at which one of `declared` applies.
    ///
    /// Returns the depth and the declared entry that matched.
    pub fn first_match<'d>(&self, declared: &'d [String]) -> Option<(usize, &'d str)> {
        self.levels.iter().enumerate().find_map(|(depth, forms)| {
            declared
                .iter()
                .find(|rt| forms.contains(*rt))
                .map(|rt| (depth, rt.as_str()))
        })
    }

    /// True when any level is a member of `declared`.
    pub fn is_any_of(&self, declared: &BTreeSet<String>) -> bool {
        self.levels
            .iter()
            .flatten()
            .any(|form| declared.contains(form))
    }
}
