//! Search-path prefix resolution.
//!
//! # Responsibilities
//! - Turn a prefix specifier (index, absolute path or unset) into a concrete prefix
//! - Join relative registration entries onto that prefix
//!
//! # Design Decisions
//! - Pure functions, no access to global state
//! - Malformed specifiers fall back to the default prefix instead of failing
//! - Index `-1` and out-of-range indexes select the last search path

/// Prefix used when neither the binding nor the configuration supplies one.
pub const ROOT_PREFIX: &str = "/";

/// Resolve a prefix specifier against the ordered search paths.
///
/// `default_prefix` is the externally configured default; when it is empty
/// [`ROOT_PREFIX`] is used instead.
pub fn resolve_prefix(spec: &str, search_paths: &[String], default_prefix: &str) -> String {
    let fallback = || {
        if default_prefix.is_empty() {
            ROOT_PREFIX.to_string()
        } else {
            default_prefix.to_string()
        }
    };

    if spec.is_empty() {
        return fallback();
    }

    if let Ok(index) = spec.parse::<i64>() {
        let Some(last) = search_paths.last() else {
            tracing::debug!(spec, "Numeric prefix without search paths, using default prefix");
            return fallback();
        };
        if index == -1 || index >= search_paths.len() as i64 {
            return last.clone();
        }
        // Remaining negative values clamp to the first entry
        let index = index.max(0) as usize;
        return search_paths[index].clone();
    }

    if spec.starts_with('/') {
        return spec.to_string();
    }

    tracing::debug!(spec, "Ignoring prefix that is neither numeric nor absolute");
    fallback()
}

/// Make `entry` absolute by prepending `prefix`.
///
/// Entries that already start with `/` are returned unchanged. Exactly one
/// `/` separates prefix and entry.
pub fn apply_prefix(prefix: &str, entry: &str) -> String {
    if entry.starts_with('/') {
        return entry.to_string();
    }
    match (prefix.ends_with('/'), prefix.is_empty()) {
        (true, _) => format!("{}{}", prefix, entry),
        (false, true) => format!("/{}", entry),
        (false, false) => format!("{}/{}", prefix, entry),
    }
}
