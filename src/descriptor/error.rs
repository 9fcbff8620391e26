//! Descriptor error definitions.

use thiserror::Error;

/// Reasons a raw binding is rejected as an invalid descriptor.
///
/// Raised at ingestion only; rejected records never reach the matcher.
#[derive(Debug, Clone, Error)]
pub enum DescriptorError {
    /// Neither paths nor resource types remain after normalization.
    #[error("binding '{name}' declares no paths or resource types")]
    Unbound { name: String },

    /// No name and no component identifier to fall back on.
    #[error("binding has neither a name nor a component identifier")]
    MissingName,

    /// A filter regex failed to compile.
    #[error("binding '{name}' has an invalid {field}: {source}")]
    InvalidPattern {
        name: String,
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    /// Every declared path lies outside the configured execution paths.
    #[error("path binding '{name}' has no path inside the execution paths: {paths:?}")]
    OutsideExecutionPaths { name: String, paths: Vec<String> },

    /// The resolved prefix is not absolute, so entries could not be made absolute.
    #[error("binding '{name}' resolves to relative prefix '{prefix}'")]
    RelativePrefix { name: String, prefix: String },

    /// Unknown filter scope name.
    #[error("unknown filter scope: {0}")]
    UnknownScope(String),
}

/// Result type for descriptor operations.
pub type DescriptorResult<T> = Result<T, DescriptorError>;
