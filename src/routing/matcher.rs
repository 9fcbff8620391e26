//! Request predicates.
//!
//! # Responsibilities
//! - Match method, extension, selectors, path and suffix of a request
//! - Combine predicates with AND semantics
//!
//! # Design Decisions
//! - An empty declared set always matches (no restriction)
//! - Methods compare exactly (both sides are upper-cased upstream); `*` matches all
//! - Extensions and selectors are case-sensitive
//! - Regex predicates must match the whole input

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::descriptor::binding::{Pattern, ANY_METHOD};
use crate::descriptor::FilterScope;
use crate::request::RequestDescriptor;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &RequestDescriptor) -> bool;
}

/// Which end of the request selectors a declared selector sequence anchors to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorAnchor {
    /// Declared selectors are the last ones of the request; unregistered
    /// selectors may precede them.
    #[default]
    Trailing,
    /// Declared selectors are the first ones of the request; unregistered
    /// selectors may follow them.
    Leading,
}

/// Request method membership.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: BTreeSet<String>,
}

impl MethodMatcher {
    /// An empty set accepts every method.
    pub fn new(methods: &BTreeSet<String>) -> Self {
        Self {
            methods: methods.clone(),
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        self.methods.is_empty()
            || self.methods.contains(ANY_METHOD)
            || self.methods.contains(&req.method)
    }
}

/// Request extension membership.
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    extensions: BTreeSet<String>,
}

impl ExtensionMatcher {
    pub fn new(extensions: &BTreeSet<String>) -> Self {
        Self {
            extensions: extensions.clone(),
        }
    }
}

impl Matcher for ExtensionMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        // A request without extension only passes unrestricted bindings
        req.extension
            .as_ref()
            .map(|ext| self.extensions.contains(ext))
            .unwrap_or(false)
    }
}

/// Declared selectors as a contiguous run at one end of the request selectors.
#[derive(Debug, Clone)]
pub struct AnchoredSelectorMatcher {
    selectors: Vec<String>,
    anchor: SelectorAnchor,
}

impl AnchoredSelectorMatcher {
    pub fn new(selectors: &[String], anchor: SelectorAnchor) -> Self {
        Self {
            selectors: selectors.to_vec(),
            anchor,
        }
    }
}

impl Matcher for AnchoredSelectorMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        let declared = self.selectors.len();
        if declared == 0 {
            return true;
        }
        let requested = &req.selectors;
        if requested.len() < declared {
            return false;
        }
        match self.anchor {
            SelectorAnchor::Trailing => requested[requested.len() - declared..] == self.selectors[..],
            SelectorAnchor::Leading => requested[..declared] == self.selectors[..],
        }
    }
}

/// Declared selectors appear in the request in the same relative order.
///
/// Used by strict path bindings: the request selectors are an exact or
/// ordered superset of the declared ones.
#[derive(Debug, Clone)]
pub struct OrderedSelectorMatcher {
    selectors: Vec<String>,
}

impl OrderedSelectorMatcher {
    pub fn new(selectors: &[String]) -> Self {
        Self {
            selectors: selectors.to_vec(),
        }
    }
}

impl Matcher for OrderedSelectorMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        let mut requested = req.selectors.iter();
        self.selectors
            .iter()
            .all(|wanted| requested.any(|sel| sel == wanted))
    }
}

/// At least one declared selector is present in the request.
#[derive(Debug, Clone)]
pub struct AnySelectorMatcher {
    selectors: BTreeSet<String>,
}

impl AnySelectorMatcher {
    pub fn new(selectors: &BTreeSet<String>) -> Self {
        Self {
            selectors: selectors.clone(),
        }
    }
}

impl Matcher for AnySelectorMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        self.selectors.is_empty() || req.selectors.iter().any(|sel| self.selectors.contains(sel))
    }
}

/// Exact resource path equality against any declared path.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    paths: Vec<String>,
}

impl ExactPathMatcher {
    pub fn new(paths: &[String]) -> Self {
        Self {
            paths: paths.to_vec(),
        }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        self.paths.iter().any(|path| *path == req.resource_path)
    }
}

/// Regex over the resource path.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher {
    pattern: Pattern,
}

impl PathPatternMatcher {
    pub fn new(pattern: Pattern) -> Self {
        Self { pattern }
    }
}

impl Matcher for PathPatternMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        self.pattern.is_full_match(&req.resource_path)
    }
}

/// Regex over the request suffix. Requests without suffix never match.
#[derive(Debug, Clone)]
pub struct SuffixPatternMatcher {
    pattern: Pattern,
}

impl SuffixPatternMatcher {
    pub fn new(pattern: Pattern) -> Self {
        Self { pattern }
    }
}

impl Matcher for SuffixPatternMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        req.suffix
            .as_deref()
            .map(|suffix| self.pattern.is_full_match(suffix))
            .unwrap_or(false)
    }
}

/// Dispatch scope membership.
#[derive(Debug, Clone)]
pub struct ScopeMatcher {
    scopes: BTreeSet<FilterScope>,
}

impl ScopeMatcher {
    pub fn new(scopes: &BTreeSet<FilterScope>) -> Self {
        Self {
            scopes: scopes.clone(),
        }
    }
}

impl Matcher for ScopeMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        self.scopes.contains(&req.dispatch_scope)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Append a condition.
    pub fn push(&mut self, matcher: impl Matcher + 'static) {
        self.matchers.push(Box::new(matcher));
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &RequestDescriptor) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn list(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn with_selectors(selectors: &[&str]) -> RequestDescriptor {
        RequestDescriptor::new("/content/page", "app/page").with_selectors(selectors.iter().copied())
    }

    #[test]
    fn test_method_matcher() {
        let get_head = MethodMatcher::new(&set(&["GET", "HEAD"]));
        let req = RequestDescriptor::new("/a", "t");
        assert!(get_head.matches(&req));
        assert!(!get_head.matches(&req.clone().with_method("PUT")));

        let any = MethodMatcher::new(&set(&["*"]));
        assert!(any.matches(&req.clone().with_method("DELETE")));

        let unrestricted = MethodMatcher::new(&BTreeSet::new());
        assert!(unrestricted.matches(&req.with_method("PATCH")));
    }

    #[test]
    fn test_extension_matcher() {
        let html = ExtensionMatcher::new(&set(&["html"]));
        let req = RequestDescriptor::new("/a", "t");
        // No extension on the request
        assert!(!html.matches(&req));
        assert!(html.matches(&req.clone().with_extension("html")));
        assert!(!html.matches(&req.clone().with_extension("HTML")));
        assert!(ExtensionMatcher::new(&BTreeSet::new()).matches(&req));
    }

    #[test]
    fn test_trailing_selectors() {
        let matcher = AnchoredSelectorMatcher::new(&list(&["a", "b"]), SelectorAnchor::Trailing);
        assert!(matcher.matches(&with_selectors(&["a", "b"])));
        assert!(matcher.matches(&with_selectors(&["x", "a", "b"])));
        assert!(matcher.matches(&with_selectors(&["x", "y", "a", "b"])));
        assert!(!matcher.matches(&with_selectors(&["a", "b", "x"])));
        assert!(!matcher.matches(&with_selectors(&["a"])));
        assert!(!matcher.matches(&with_selectors(&[])));
    }

    #[test]
    fn test_leading_selectors() {
        let matcher = AnchoredSelectorMatcher::new(&list(&["a", "b"]), SelectorAnchor::Leading);
        assert!(matcher.matches(&with_selectors(&["a", "b"])));
        assert!(matcher.matches(&with_selectors(&["a", "b", "x"])));
        assert!(!matcher.matches(&with_selectors(&["x", "a", "b"])));
    }

    #[test]
    fn test_empty_declared_selectors_match_anything() {
        let matcher = AnchoredSelectorMatcher::new(&[], SelectorAnchor::Trailing);
        assert!(matcher.matches(&with_selectors(&[])));
        assert!(matcher.matches(&with_selectors(&["x"])));
    }

    #[test]
    fn test_ordered_selectors() {
        let matcher = OrderedSelectorMatcher::new(&list(&["a", "b"]));
        assert!(matcher.matches(&with_selectors(&["a", "b"])));
        assert!(matcher.matches(&with_selectors(&["a", "x", "b"])));
        assert!(!matcher.matches(&with_selectors(&["b", "a"])));
        assert!(!matcher.matches(&with_selectors(&["a"])));
    }

    #[test]
    fn test_any_selector() {
        let matcher = AnySelectorMatcher::new(&set(&["print", "mobile"]));
        assert!(matcher.matches(&with_selectors(&["x", "mobile"])));
        assert!(!matcher.matches(&with_selectors(&["x"])));
        assert!(!matcher.matches(&with_selectors(&[])));
    }

    #[test]
    fn test_exact_path() {
        let matcher = ExactPathMatcher::new(&list(&["/bin/servlet"]));
        assert!(matcher.matches(&RequestDescriptor::new("/bin/servlet", "")));
        assert!(!matcher.matches(&RequestDescriptor::new("/bin/servlet/", "")));
        assert!(!matcher.matches(&RequestDescriptor::new("/bin/servlet/child", "")));
        assert!(!matcher.matches(&RequestDescriptor::new("/bin", "")));
    }

    #[test]
    fn test_suffix_pattern() {
        let matcher = SuffixPatternMatcher::new(Pattern::new("/simplefilter").unwrap());
        let req = RequestDescriptor::new("/bin/servlet", "");
        assert!(!matcher.matches(&req));
        assert!(matcher.matches(&req.clone().with_suffix("/simplefilter")));
        assert!(!matcher.matches(&req.with_suffix("/simplefilter/more")));
    }

    #[test]
    fn test_and_matcher() {
        let mut matcher = AndMatcher::default();
        assert!(matcher.matches(&RequestDescriptor::new("/a", "t")));

        matcher.push(ExactPathMatcher::new(&list(&["/a"])));
        matcher.push(ScopeMatcher::new(&[FilterScope::Include].into_iter().collect()));
        assert_eq!(matcher.len(), 2);

        let req = RequestDescriptor::new("/a", "t");
        assert!(!matcher.matches(&req));
        assert!(matcher.matches(&req.with_scope(FilterScope::Include)));
    }
}
