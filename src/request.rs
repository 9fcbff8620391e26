//! Request descriptors.
//!
//! # Responsibilities
//! - Carry the addressing attributes the matcher needs (path, type, selectors, ...)
//! - Decompose a URL path into resource path, selectors, extension and suffix
//!
//! # Design Decisions
//! - Methods are upper-cased on construction
//! - Without a content tree, the first `.` in the path ends the resource path

use serde::{Deserialize, Serialize};

use crate::descriptor::FilterScope;

/// Parsed addressing attributes of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Resource path, without selectors, extension or suffix.
    pub resource_path: String,
    pub resource_type: String,
    pub extension: Option<String>,
    /// Selectors in URL order.
    pub selectors: Vec<String>,
    pub suffix: Option<String>,
    pub method: String,
    pub dispatch_scope: FilterScope,
}

impl RequestDescriptor {
    /// A `GET` request in `REQUEST` scope without selectors, extension or suffix.
    pub fn new(resource_path: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            resource_type: resource_type.into(),
            extension: None,
            selectors: Vec::new(),
            suffix: None,
            method: "GET".to_string(),
            dispatch_scope: FilterScope::Request,
        }
    }

    /// Decompose `url_path` such as `/content/page.print.a4.html/suffix`.
    ///
    /// Everything before the first `.` is the resource path. The part up to the
    /// next `/` holds the dot-separated selectors and the extension, the rest
    /// is the suffix.
    pub fn parse(url_path: &str, resource_type: impl Into<String>) -> Self {
        let Some(dot) = url_path.find('.') else {
            return Self::new(url_path, resource_type);
        };

        let resource_path = &url_path[..dot];
        let rest = &url_path[dot + 1..];
        let (info, suffix) = match rest.find('/') {
            Some(slash) => (&rest[..slash], Some(rest[slash..].to_string())),
            None => (rest, None),
        };

        let mut parts: Vec<String> = info
            .split('.')
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        let extension = parts.pop();

        Self {
            extension,
            selectors: parts,
            suffix,
            ..Self::new(resource_path, resource_type)
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into().trim().to_ascii_uppercase();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_scope(mut self, scope: FilterScope) -> Self {
        self.dispatch_scope = scope;
        self
    }
}
