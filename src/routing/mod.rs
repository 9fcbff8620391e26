//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming RequestDescriptor (path, type, selectors, extension, method, scope)
//!     → router.rs (collect path and resource-type candidates, rank them)
//!     → matcher.rs (evaluate predicates)
//!     → Return: ServletMatch or NoMatch
//!
//!     → filter_chain.rs (every filter whose predicates hold)
//!     → Return: filters ordered by rank, then registration
//!
//! Route Compilation (on registration):
//!     normalized Binding
//!     → Compile predicates (exact paths, sets, anchored selectors, regexes)
//!     → Freeze into the registry snapshot
//! ```
//!
//! # Design Decisions
//! - Routes compiled once per snapshot, immutable at runtime
//! - Regexes only for filter patterns, compiled at registration
//! - Deterministic: same snapshot and request always yield the same result

pub mod filter_chain;
pub mod matcher;
pub mod router;

pub use filter_chain::{build_chain, FilterRoute};
pub use matcher::{Matcher, SelectorAnchor};
pub use router::{resolve, MatchResult, RankingPolicy, ServletBinding, ServletMatch, ServletRoute};
