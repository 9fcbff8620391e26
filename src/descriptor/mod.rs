//! Descriptor model subsystem.
//!
//! # Data Flow
//! ```text
//! Raw binding records (config file or code)
//!     → prefix.rs (resolve prefix specifier against search paths)
//!     → normalize.rs (apply prefix, fill defaults, resolve name)
//!     → binding.rs (immutable PathBinding / ResourceTypeBinding / FilterBinding)
//!     → handed to the registry
//! ```
//!
//! # Design Decisions
//! - Descriptors are plain data, validated once at ingestion
//! - Invalid records fail with `DescriptorError` and never reach the matcher
//! - Normalized bindings can be turned back into raw records (idempotent round trip)

pub mod binding;
pub mod error;
pub mod normalize;
pub mod prefix;

pub use binding::{
    Binding, FilterBinding, FilterScope, PathBinding, Pattern, RawBinding, RawFilterBinding,
    RawPathBinding, RawResourceTypeBinding, RawServlet, RegistrationId, ResourceTypeBinding,
};
pub use error::{DescriptorError, DescriptorResult};
pub use normalize::{normalize, NormalizeContext};
pub use prefix::{apply_prefix, resolve_prefix};
