//! Normalization of raw binding records.
//!
//! # Responsibilities
//! - Apply the resolved prefix to relative paths and resource types
//! - Fill defaults (strict mode, resource-type methods, filter scope)
//! - Resolve the handler name, falling back to the component identifier
//! - Reject structurally invalid records
//!
//! # Design Decisions
//! - Normalization is idempotent: feeding a normalized binding back in yields it unchanged
//! - List entries are trimmed and blank entries dropped before any check
//! - Methods are upper-cased; extensions and selectors stay case-sensitive

use std::collections::BTreeSet;

use crate::descriptor::binding::{
    Binding, FilterBinding, FilterScope, PathBinding, Pattern, RawBinding, RawFilterBinding,
    RawPathBinding, RawResourceTypeBinding, ResourceTypeBinding, DEFAULT_METHODS,
};
use crate::descriptor::error::{DescriptorError, DescriptorResult};
use crate::descriptor::prefix::{apply_prefix, resolve_prefix};

/// Environment that normalization resolves against.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeContext<'a> {
    /// Ordered search paths, highest priority first.
    pub search_paths: &'a [String],
    /// Configured default prefix; empty means `/`.
    pub default_prefix: &'a str,
    /// Allowed locations for path bindings; empty allows every path.
    pub execution_paths: &'a [String],
}

/// Normalize a raw record into an immutable binding.
pub fn normalize(raw: &RawBinding, ctx: &NormalizeContext<'_>) -> DescriptorResult<Binding> {
    match raw {
        RawBinding::Path(b) => normalize_path(b, ctx).map(Binding::Path),
        RawBinding::ResourceType(b) => normalize_resource_type(b, ctx).map(Binding::ResourceType),
        RawBinding::Filter(b) => normalize_filter(b).map(Binding::Filter),
    }
}

fn normalize_path(raw: &RawPathBinding, ctx: &NormalizeContext<'_>) -> DescriptorResult<PathBinding> {
    let name = resolve_name(&raw.name, &raw.component)?;
    let prefix = absolute_prefix(&name, &raw.prefix, ctx)?;

    let declared: Vec<String> = clean_list(&raw.paths)
        .into_iter()
        .map(|path| apply_prefix(&prefix, &path))
        .collect();
    if declared.is_empty() {
        return Err(DescriptorError::Unbound { name });
    }

    let paths = if ctx.execution_paths.is_empty() {
        declared
    } else {
        let (allowed, excluded): (Vec<String>, Vec<String>) = declared
            .into_iter()
            .partition(|path| is_executable(path, ctx.execution_paths));
        if allowed.is_empty() {
            return Err(DescriptorError::OutsideExecutionPaths {
                name,
                paths: excluded,
            });
        }
        if !excluded.is_empty() {
            tracing::warn!(servlet = %name, ?excluded, "Ignoring paths outside the execution paths");
        }
        allowed
    };

    let strict = raw.strict.unwrap_or(true);
    // Legacy mode only looks at the path
    let (selectors, extensions, methods) = if strict {
        (
            clean_list(&raw.selectors),
            clean_set(&raw.extensions),
            clean_methods(&raw.methods),
        )
    } else {
        (Vec::new(), BTreeSet::new(), BTreeSet::new())
    };

    Ok(PathBinding {
        name,
        paths,
        prefix,
        strict,
        selectors,
        extensions,
        methods,
        rank: raw.rank,
    })
}

fn normalize_resource_type(
    raw: &RawResourceTypeBinding,
    ctx: &NormalizeContext<'_>,
) -> DescriptorResult<ResourceTypeBinding> {
    let name = resolve_name(&raw.name, &raw.component)?;
    let prefix = absolute_prefix(&name, &raw.prefix, ctx)?;

    let resource_types: Vec<String> = clean_list(&raw.resource_types)
        .into_iter()
        .map(|rt| apply_prefix(&prefix, &rt))
        .collect();
    if resource_types.is_empty() {
        return Err(DescriptorError::Unbound { name });
    }

    let mut methods = clean_methods(&raw.methods);
    if methods.is_empty() {
        methods = DEFAULT_METHODS.iter().map(|m| m.to_string()).collect();
    }

    Ok(ResourceTypeBinding {
        name,
        resource_types,
        prefix,
        selectors: clean_list(&raw.selectors),
        extensions: clean_set(&raw.extensions),
        methods,
        rank: raw.rank,
    })
}

fn normalize_filter(raw: &RawFilterBinding) -> DescriptorResult<FilterBinding> {
    let name = resolve_name(&raw.name, &raw.component)?;
    let pattern = compile_pattern(&name, "pattern", raw.pattern.as_deref())?;
    let suffix_pattern = compile_pattern(&name, "suffix pattern", raw.suffix_pattern.as_deref())?;

    let mut scope: BTreeSet<FilterScope> = raw.scope.iter().copied().collect();
    if scope.is_empty() {
        scope.insert(FilterScope::Request);
    }

    Ok(FilterBinding {
        name,
        pattern,
        suffix_pattern,
        resource_types: clean_set(&raw.resource_types),
        methods: clean_methods(&raw.methods),
        extensions: clean_set(&raw.extensions),
        selectors: clean_set(&raw.selectors),
        scope,
        rank: raw.rank,
    })
}

fn resolve_name(name: &Option<String>, component: &Option<String>) -> DescriptorResult<String> {
    [name, component]
        .into_iter()
        .flatten()
        .map(|candidate| candidate.trim())
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .ok_or(DescriptorError::MissingName)
}

/// Resolve the prefix specifier, rejecting contexts that yield a relative prefix.
fn absolute_prefix(name: &str, spec: &str, ctx: &NormalizeContext<'_>) -> DescriptorResult<String> {
    let prefix = resolve_prefix(spec.trim(), ctx.search_paths, ctx.default_prefix);
    if !prefix.starts_with('/') {
        return Err(DescriptorError::RelativePrefix {
            name: name.to_string(),
            prefix,
        });
    }
    Ok(prefix)
}

fn compile_pattern(
    name: &str,
    field: &'static str,
    source: Option<&str>,
) -> DescriptorResult<Option<Pattern>> {
    // An empty pattern does not restrict the filter
    let Some(source) = source.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    Pattern::new(source)
        .map(Some)
        .map_err(|source| DescriptorError::InvalidPattern {
            name: name.to_string(),
            field,
            source,
        })
}

/// True when `path` is covered by an execution path entry.
///
/// Entries ending in `/` cover everything below them, others only themselves.
fn is_executable(path: &str, execution_paths: &[String]) -> bool {
    execution_paths.iter().any(|allowed| {
        if allowed.ends_with('/') {
            path.starts_with(allowed.as_str())
        } else {
            path == allowed
        }
    })
}

fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_set(values: &[String]) -> BTreeSet<String> {
    clean_list(values).into_iter().collect()
}

fn clean_methods(values: &[String]) -> BTreeSet<String> {
    clean_list(values)
        .into_iter()
        .map(|m| m.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::binding::RawServlet;

    fn search_paths() -> Vec<String> {
        vec!["/apps/".to_string(), "/libs/".to_string()]
    }

    fn normalize_with(raw: &RawBinding, search_paths: &[String]) -> DescriptorResult<Binding> {
        let ctx = NormalizeContext {
            search_paths,
            ..Default::default()
        };
        normalize(raw, &ctx)
    }

    fn path_record(paths: &[&str]) -> RawPathBinding {
        RawPathBinding {
            name: Some("servlet".into()),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resource_type_defaults_and_prefix() {
        let raw = RawBinding::ResourceType(RawResourceTypeBinding {
            component: Some("com.example.TypeServlet".into()),
            resource_types: vec!["my/type".into(), "/abs/type".into()],
            prefix: "1".into(),
            ..Default::default()
        });
        let Binding::ResourceType(b) = normalize_with(&raw, &search_paths()).unwrap() else {
            panic!("expected resource type binding");
        };
        assert_eq!(b.name, "com.example.TypeServlet");
        assert_eq!(b.prefix, "/libs/");
        assert_eq!(b.resource_types, vec!["/libs/my/type", "/abs/type"]);
        assert_eq!(
            b.methods.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["GET", "HEAD"]
        );
    }

    #[test]
    fn test_path_defaults_to_strict_root_prefix() {
        let raw = RawBinding::Path(RawPathBinding {
            methods: vec!["post".into()],
            ..path_record(&["bin/servlet"])
        });
        let Binding::Path(b) = normalize_with(&raw, &[]).unwrap() else {
            panic!("expected path binding");
        };
        assert!(b.strict);
        assert_eq!(b.paths, vec!["/bin/servlet"]);
        assert!(b.methods.contains("POST"));
    }

    #[test]
    fn test_legacy_path_ignores_predicates() {
        let raw = RawBinding::Path(RawPathBinding {
            strict: Some(false),
            selectors: vec!["a".into()],
            extensions: vec!["json".into()],
            methods: vec!["GET".into()],
            ..path_record(&["/bin/legacy"])
        });
        let Binding::Path(b) = normalize_with(&raw, &[]).unwrap() else {
            panic!("expected path binding");
        };
        assert!(!b.strict);
        assert!(b.selectors.is_empty());
        assert!(b.extensions.is_empty());
        assert!(b.methods.is_empty());
    }

    #[test]
    fn test_filter_scope_default_and_empty_pattern() {
        let raw = RawBinding::Filter(RawFilterBinding {
            name: Some("filter".into()),
            pattern: Some(String::new()),
            ..Default::default()
        });
        let Binding::Filter(f) = normalize_with(&raw, &[]).unwrap() else {
            panic!("expected filter binding");
        };
        assert!(f.pattern.is_none());
        assert_eq!(f.scope.iter().copied().collect::<Vec<_>>(), vec![FilterScope::Request]);
    }

    #[test]
    fn test_rejects_unbound_and_nameless() {
        let unbound = RawBinding::Path(path_record(&["  ", ""]));
        assert!(matches!(
            normalize_with(&unbound, &[]),
            Err(DescriptorError::Unbound { name }) if name == "servlet"
        ));

        let nameless = RawBinding::ResourceType(RawResourceTypeBinding {
            name: Some(" ".into()),
            resource_types: vec!["my/type".into()],
            ..Default::default()
        });
        assert!(matches!(normalize_with(&nameless, &[]), Err(DescriptorError::MissingName)));

        let servlet = RawServlet {
            name: Some("empty".into()),
            ..Default::default()
        };
        for raw in servlet.into_bindings() {
            assert!(normalize_with(&raw, &[]).is_err());
        }
    }

    #[test]
    fn test_rejects_invalid_pattern() {
        let raw = RawBinding::Filter(RawFilterBinding {
            name: Some("broken".into()),
            suffix_pattern: Some("(unclosed".into()),
            ..Default::default()
        });
        assert!(matches!(
            normalize_with(&raw, &[]),
            Err(DescriptorError::InvalidPattern { field: "suffix pattern", .. })
        ));
    }

    #[test]
    fn test_execution_paths() {
        let execution_paths = vec!["/bin/".to_string(), "/system/console".to_string()];
        let ctx = NormalizeContext {
            execution_paths: &execution_paths,
            ..Default::default()
        };

        let raw = RawBinding::Path(path_record(&["/bin/a", "/content/b", "/system/console"]));
        let Binding::Path(b) = normalize(&raw, &ctx).unwrap() else {
            panic!("expected path binding");
        };
        assert_eq!(b.paths, vec!["/bin/a", "/system/console"]);

        let outside = RawBinding::Path(path_record(&["/system/console/sub"]));
        assert!(matches!(
            normalize(&outside, &ctx),
            Err(DescriptorError::OutsideExecutionPaths { .. })
        ));
    }

    #[test]
    fn test_rejects_relative_prefix_from_context() {
        let relative_paths = vec!["apps/".to_string()];
        let ctx = NormalizeContext {
            search_paths: &relative_paths,
            default_prefix: "libs",
            ..Default::default()
        };

        let by_index = RawBinding::ResourceType(RawResourceTypeBinding {
            name: Some("typed".into()),
            resource_types: vec!["my/type".into()],
            prefix: "0".into(),
            ..Default::default()
        });
        assert!(matches!(
            normalize(&by_index, &ctx),
            Err(DescriptorError::RelativePrefix { prefix, .. }) if prefix == "apps/"
        ));

        let by_default = RawBinding::Path(path_record(&["bin/servlet"]));
        assert!(matches!(
            normalize(&by_default, &ctx),
            Err(DescriptorError::RelativePrefix { prefix, .. }) if prefix == "libs"
        ));

        // Absolute entries never use the prefix, but the context is still rejected
        let absolute = RawBinding::Path(path_record(&["/bin/servlet"]));
        assert!(normalize(&absolute, &ctx).is_err());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let search_paths = search_paths();
        let records = vec![
            RawBinding::Path(RawPathBinding {
                prefix: "0".into(),
                selectors: vec!["b".into(), "a".into()],
                methods: vec!["get".into(), " put ".into()],
                ..path_record(&["servlet", "/bin/other"])
            }),
            RawBinding::ResourceType(RawResourceTypeBinding {
                component: Some("component".into()),
                resource_types: vec!["my/type".into()],
                prefix: "-1".into(),
                selectors: vec!["print".into(), "a4".into()],
                extensions: vec!["html".into(), "html".into()],
                ..Default::default()
            }),
            RawBinding::Filter(RawFilterBinding {
                name: Some("filter".into()),
                pattern: Some("/content/.*".into()),
                scope: vec![FilterScope::Include, FilterScope::Forward],
                methods: vec!["post".into()],
                rank: -3,
                ..Default::default()
            }),
        ];

        for raw in records {
            let once = normalize_with(&raw, &search_paths).unwrap();
            let twice = normalize_with(&RawBinding::from(&once), &search_paths).unwrap();
            assert_eq!(once, twice);
        }
    }
}
