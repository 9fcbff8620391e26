//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that search, prefix and execution paths are absolute
//! - Check log level and super-type declarations
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ResolverConfig → Result<(), Vec<ValidationError>>
//! - Binding records are not checked here; the registry rejects them individually

use thiserror::Error;

use crate::config::schema::ResolverConfig;

/// Log levels accepted by `observability.log_level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("search path '{0}' must be absolute")]
    RelativeSearchPath(String),

    #[error("default prefix '{0}' must be empty or absolute")]
    RelativeDefaultPrefix(String),

    #[error("execution path '{0}' must be absolute")]
    RelativeExecutionPath(String),

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),

    #[error("resource type declarations need a non-empty type and super type (got '{child}' = '{parent}')")]
    BlankResourceType { child: String, parent: String },
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &ResolverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for path in &config.resolver.search_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativeSearchPath(path.clone()));
        }
    }

    let prefix = config.resolver.default_prefix.trim();
    if !prefix.is_empty() && !prefix.starts_with('/') {
        errors.push(ValidationError::RelativeDefaultPrefix(prefix.to_string()));
    }

    for path in &config.resolver.execution_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativeExecutionPath(path.clone()));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    for (child, parent) in &config.resource_types {
        if child.trim().is_empty() || parent.trim().is_empty() {
            errors.push(ValidationError::BlankResourceType {
                child: child.clone(),
                parent: parent.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ResolverConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ResolverConfig::default();
        config.resolver.search_paths = vec!["apps/".into(), "/libs/".into()];
        config.resolver.default_prefix = "libs".into();
        config.resolver.execution_paths = vec!["bin/".into()];
        config.observability.log_level = "loud".into();
        config.resource_types.insert("app/page".into(), " ".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[0], ValidationError::RelativeSearchPath("apps/".into()));
        assert!(matches!(errors[3], ValidationError::UnknownLogLevel(_)));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = ResolverConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
