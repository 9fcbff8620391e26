//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the resolver.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::{NormalizeContext, RawBinding, RawFilterBinding, RawServlet};
use crate::resource_type::ResourceTypeGraph;
use crate::routing::{RankingPolicy, SelectorAnchor};

/// Root configuration for the servlet resolver.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Search paths, prefixes and execution paths.
    pub resolver: SearchConfig,

    /// Matcher options.
    pub matching: MatchingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Super-type declarations, `child = "parent"`.
    pub resource_types: BTreeMap<String, String>,

    /// Servlet registrations.
    pub servlets: Vec<RawServlet>,

    /// Filter registrations.
    pub filters: Vec<RawFilterBinding>,
}

impl ResolverConfig {
    /// All declared servlets and filters as raw binding records, in file order.
    pub fn raw_bindings(&self) -> Vec<RawBinding> {
        let servlets = self
            .servlets
            .iter()
            .cloned()
            .flat_map(RawServlet::into_bindings);
        let filters = self.filters.iter().cloned().map(RawBinding::Filter);
        servlets.chain(filters).collect()
    }

    pub fn type_graph(&self) -> ResourceTypeGraph {
        ResourceTypeGraph::from_pairs(self.resource_types.clone())
    }
}

/// Resource lookup locations.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Ordered search paths, highest priority first.
    pub search_paths: Vec<String>,

    /// Prefix for bindings that declare none. Empty means `/`.
    pub default_prefix: String,

    /// Locations path bindings may be registered at. Empty allows all.
    pub execution_paths: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_paths: vec!["/apps/".to_string(), "/libs/".to_string()],
            default_prefix: String::new(),
            execution_paths: Vec::new(),
        }
    }
}

impl SearchConfig {
    pub fn normalize_context(&self) -> NormalizeContext<'_> {
        NormalizeContext {
            search_paths: &self.search_paths,
            default_prefix: &self.default_prefix,
            execution_paths: &self.execution_paths,
        }
    }
}

/// Matcher options.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MatchingConfig {
    /// End of the request selectors that declared selectors anchor to.
    pub selector_anchor: SelectorAnchor,

    /// Order of ancestor depth and selector count when ranking.
    pub ranking: RankingPolicy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
