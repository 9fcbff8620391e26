//! Immutable registry state.

use std::sync::Arc;

use crate::config::schema::{MatchingConfig, ResolverConfig, SearchConfig};
use crate::observability::metrics;
use crate::request::RequestDescriptor;
use crate::resource_type::ResourceTypeGraph;
use crate::routing::{build_chain, resolve, FilterRoute, MatchResult, ServletRoute};

/// Settings that bindings are normalized and matched under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySettings {
    pub search: SearchConfig,
    pub matching: MatchingConfig,
}

impl From<&ResolverConfig> for RegistrySettings {
    fn from(config: &ResolverConfig) -> Self {
        Self {
            search: config.resolver.clone(),
            matching: config.matching,
        }
    }
}

/// A published, immutable view of every registration.
///
/// Readers keep the `Arc<Snapshot>` they loaded for as long as they need it;
/// later registrations publish a new snapshot and never touch this one.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub(crate) revision: u64,
    pub(crate) settings: Arc<RegistrySettings>,
    pub(crate) types: Arc<ResourceTypeGraph>,
    pub(crate) servlets: Vec<Arc<ServletRoute>>,
    pub(crate) filters: Vec<Arc<FilterRoute>>,
}

impl Snapshot {
    /// Monotonic publication counter, 0 for the initial empty snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn resource_types(&self) -> &ResourceTypeGraph {
        &self.types
    }

    /// Servlet routes in registration order.
    pub fn servlets(&self) -> impl Iterator<Item = &ServletRoute> + '_ {
        self.servlets.iter().map(Arc::as_ref)
    }

    /// Filter routes in registration order.
    pub fn filters(&self) -> impl Iterator<Item = &FilterRoute> + '_ {
        self.filters.iter().map(Arc::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.servlets.is_empty() && self.filters.is_empty()
    }

    /// Select the servlet for `request`.
    pub fn resolve(&self, request: &RequestDescriptor) -> MatchResult<'_> {
        let result = resolve(
            request,
            self.servlets(),
            self.types.as_ref(),
            &self.settings.search.search_paths,
            &self.settings.matching,
        );
        metrics::record_resolution(result.is_match());
        result
    }

    /// Ordered filters for `request`.
    pub fn filter_chain(&self, request: &RequestDescriptor) -> Vec<&FilterRoute> {
        let chain = build_chain(
            request,
            self.filters(),
            self.types.as_ref(),
            &self.settings.search.search_paths,
        );
        metrics::record_filter_chain(chain.len());
        chain
    }

    /// Derive the next revision sharing everything not replaced.
    pub(crate) fn successor(&self) -> Self {
        Self {
            revision: self.revision + 1,
            settings: Arc::clone(&self.settings),
            types: Arc::clone(&self.types),
            servlets: self.servlets.clone(),
            filters: self.filters.clone(),
        }
    }
}
