//! Metrics collection.
//!
//! # Responsibilities
//! - Define resolver metrics (resolutions, filter chains, registrations)
//! - Record through the `metrics` facade; the binary decides on an exporter
//!
//! # Metrics
//! - `resolver_resolutions_total` (counter): resolutions by outcome (`matched`, `no_match`)
//! - `resolver_filter_chain_length` (histogram): filters per built chain
//! - `resolver_registrations_total` (counter): registrations by result (`accepted`, `rejected`)
//! - `resolver_snapshot_revision` (gauge): revision of the published snapshot
//! - `resolver_bindings` (gauge): registered bindings by kind
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - Labels stay low-cardinality; handler names are never labels

use metrics::{counter, gauge, histogram};

pub fn record_resolution(matched: bool) {
    let outcome = if matched { "matched" } else { "no_match" };
    counter!("resolver_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_filter_chain(length: usize) {
    histogram!("resolver_filter_chain_length").record(length as f64);
}

pub fn record_registration(accepted: bool) {
    let result = if accepted { "accepted" } else { "rejected" };
    counter!("resolver_registrations_total", "result" => result).increment(1);
}

pub fn record_snapshot(revision: u64, servlets: usize, filters: usize) {
    gauge!("resolver_snapshot_revision").set(revision as f64);
    gauge!("resolver_bindings", "kind" => "servlet").set(servlets as f64);
    gauge!("resolver_bindings", "kind" => "filter").set(filters as f64);
}
