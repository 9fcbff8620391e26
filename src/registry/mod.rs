//! Binding registry with atomic snapshot publication.
//!
//! # Responsibilities
//! - Normalize raw records and assign registration ids
//! - Compile bindings into servlet and filter routes
//! - Publish immutable snapshots that resolution runs against
//!
//! # Data Flow
//! ```text
//! RawBinding
//!     → normalize (under current settings)
//!     → compile route (ServletRoute / FilterRoute)
//!     → successor snapshot
//!     → ArcSwap::store (readers pick it up on their next load)
//! ```
//!
//! # Design Decisions
//! - Readers never lock: `snapshot()` is a single `ArcSwap` load
//! - Writers are serialized by a mutex so ids stay in registration order
//! - Rejected records are logged and reported, never published
//! - Ids are never reused, also across reloads

mod snapshot;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;

pub use snapshot::{RegistrySettings, Snapshot};

use crate::config::schema::ResolverConfig;
use crate::descriptor::{normalize, Binding, DescriptorError, RawBinding, RegistrationId};
use crate::observability::metrics;
use crate::resource_type::ResourceTypeGraph;
use crate::routing::{FilterRoute, ServletBinding, ServletRoute};

/// A record that failed normalization.
#[derive(Debug, Clone)]
pub struct RejectedBinding {
    /// Name or component of the record, when it had one.
    pub label: Option<String>,
    pub error: DescriptorError,
}

/// Outcome of a batch registration.
#[derive(Debug, Clone, Default)]
pub struct RegistrationReport {
    /// Assigned ids, in input order.
    pub accepted: Vec<RegistrationId>,
    pub rejected: Vec<RejectedBinding>,
}

impl RegistrationReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Concurrent registry of servlet and filter bindings.
#[derive(Debug)]
pub struct BindingRegistry {
    current: ArcSwap<Snapshot>,
    next_id: AtomicU64,
    write_lock: Mutex<()>,
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new(RegistrySettings::default())
    }
}

impl BindingRegistry {
    /// An empty registry.
    pub fn new(settings: RegistrySettings) -> Self {
        let initial = Snapshot {
            settings: Arc::new(settings),
            ..Snapshot::default()
        };
        Self {
            current: ArcSwap::from_pointee(initial),
            next_id: AtomicU64::new(1),
            write_lock: Mutex::new(()),
        }
    }

    /// A registry populated from a loaded configuration.
    pub fn from_config(config: &ResolverConfig) -> (Self, RegistrationReport) {
        let registry = Self::new(RegistrySettings::from(config));
        let report = registry.apply_config(config);
        (registry, report)
    }

    /// The current snapshot. Never blocks.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Normalize and publish a single record.
    pub fn register(&self, raw: RawBinding) -> Result<RegistrationId, DescriptorError> {
        let _guard = self.lock();
        let mut next = self.current.load().successor();
        let id = self.insert(&mut next, &raw)?;
        self.publish(next);
        Ok(id)
    }

    /// Normalize every record and publish the accepted ones in one swap.
    pub fn register_all<I>(&self, raws: I) -> RegistrationReport
    where
        I: IntoIterator<Item = RawBinding>,
    {
        let _guard = self.lock();
        let mut next = self.current.load().successor();
        let report = self.insert_all(&mut next, raws);
        self.publish(next);
        report
    }

    /// Remove the binding with `id`. Returns whether it existed.
    pub fn unregister(&self, id: RegistrationId) -> bool {
        self.remove_where(|route_id, _| route_id == id) > 0
    }

    /// Remove every binding registered under `name`. Returns how many were removed.
    pub fn unregister_named(&self, name: &str) -> usize {
        self.remove_where(|_, route_name| route_name == name)
    }

    /// Replace the super-type declarations.
    pub fn set_resource_types(&self, types: ResourceTypeGraph) {
        let _guard = self.lock();
        let mut next = self.current.load().successor();
        next.types = Arc::new(types);
        self.publish(next);
    }

    /// Replace settings, type graph and every binding in one swap.
    pub fn reload<I>(
        &self,
        settings: RegistrySettings,
        types: ResourceTypeGraph,
        raws: I,
    ) -> RegistrationReport
    where
        I: IntoIterator<Item = RawBinding>,
    {
        let _guard = self.lock();
        let mut next = self.current.load().successor();
        next.settings = Arc::new(settings);
        next.types = Arc::new(types);
        next.servlets.clear();
        next.filters.clear();
        let report = self.insert_all(&mut next, raws);
        self.publish(next);
        report
    }

    /// Reload from a configuration file's contents.
    pub fn apply_config(&self, config: &ResolverConfig) -> RegistrationReport {
        self.reload(
            RegistrySettings::from(config),
            config.type_graph(),
            config.raw_bindings(),
        )
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded state lives in the snapshot, a panicked writer leaves nothing half-built
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert_all<I>(&self, next: &mut Snapshot, raws: I) -> RegistrationReport
    where
        I: IntoIterator<Item = RawBinding>,
    {
        let mut report = RegistrationReport::default();
        for raw in raws {
            match self.insert(next, &raw) {
                Ok(id) => report.accepted.push(id),
                Err(error) => report.rejected.push(RejectedBinding {
                    label: raw.label().map(str::to_string),
                    error,
                }),
            }
        }
        report
    }

    fn insert(&self, next: &mut Snapshot, raw: &RawBinding) -> Result<RegistrationId, DescriptorError> {
        let binding = match normalize(raw, &next.settings.search.normalize_context()) {
            Ok(binding) => binding,
            Err(error) => {
                tracing::warn!(binding = raw.label().unwrap_or("<unnamed>"), error = %error, "Rejected binding");
                metrics::record_registration(false);
                return Err(error);
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = binding.name().to_string();
        let anchor = next.settings.matching.selector_anchor;
        let kind = match binding {
            Binding::Path(b) => {
                next.servlets
                    .push(Arc::new(ServletRoute::compile(id, ServletBinding::Path(b), anchor)));
                "path"
            }
            Binding::ResourceType(b) => {
                next.servlets.push(Arc::new(ServletRoute::compile(
                    id,
                    ServletBinding::ResourceType(b),
                    anchor,
                )));
                "resource_type"
            }
            Binding::Filter(b) => {
                next.filters.push(Arc::new(FilterRoute::compile(id, b)));
                "filter"
            }
        };

        tracing::info!(id, name = %name, kind, "Registered binding");
        metrics::record_registration(true);
        Ok(id)
    }

    fn remove_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(RegistrationId, &str) -> bool,
    {
        let _guard = self.lock();
        let current = self.current.load_full();
        let mut next = current.successor();
        next.servlets.retain(|route| !predicate(route.id, route.name()));
        next.filters.retain(|route| !predicate(route.id, route.name()));

        let removed = current.servlets.len() + current.filters.len()
            - next.servlets.len()
            - next.filters.len();
        if removed > 0 {
            tracing::info!(removed, "Unregistered bindings");
            self.publish(next);
        }
        removed
    }

    fn publish(&self, next: Snapshot) {
        tracing::info!(
            revision = next.revision,
            servlets = next.servlets.len(),
            filters = next.filters.len(),
            "Publishing registry snapshot"
        );
        metrics::record_snapshot(next.revision, next.servlets.len(), next.filters.len());
        self.current.store(Arc::new(next));
    }
}
