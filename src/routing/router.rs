//! Servlet resolution.
//!
//! # Responsibilities
//! - Compile normalized servlet bindings into routes
//! - Collect path and resource-type candidates for a request
//! - Pick the single best candidate or report an explicit no-match
//!
//! # Design Decisions
//! - Routes are immutable once compiled; resolution is a pure function
//! - Path-bound candidates always beat resource-type candidates
//! - Ordering is a total comparator ending in the registration id, so equal
//!   ranks resolve the same way on every call

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::schema::MatchingConfig;
use crate::descriptor::{PathBinding, RegistrationId, ResourceTypeBinding};
use crate::request::RequestDescriptor;
use crate::resource_type::{SuperTypeLookup, TypeHierarchy};
use crate::routing::matcher::{
    AnchoredSelectorMatcher, AndMatcher, ExactPathMatcher, ExtensionMatcher, Matcher,
    MethodMatcher, OrderedSelectorMatcher, SelectorAnchor,
};

/// How resource-type candidates are ordered after the path/type split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Shallower ancestor depth first, then longer selector sequence.
    #[default]
    TypeDepthFirst,
    /// Longer selector sequence first, then shallower ancestor depth.
    SelectorsFirst,
}

/// The binding a servlet route was compiled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServletBinding {
    Path(PathBinding),
    ResourceType(ResourceTypeBinding),
}

impl ServletBinding {
    pub fn name(&self) -> &str {
        match self {
            ServletBinding::Path(b) => &b.name,
            ServletBinding::ResourceType(b) => &b.name,
        }
    }

    pub fn rank(&self) -> i32 {
        match self {
            ServletBinding::Path(b) => b.rank,
            ServletBinding::ResourceType(b) => b.rank,
        }
    }

    pub fn selectors(&self) -> &[String] {
        match self {
            ServletBinding::Path(b) => &b.selectors,
            ServletBinding::ResourceType(b) => &b.selectors,
        }
    }
}

/// A registered servlet binding with its compiled predicates.
#[derive(Debug)]
pub struct ServletRoute {
    pub id: RegistrationId,
    pub binding: ServletBinding,
    predicates: AndMatcher,
}

impl ServletRoute {
    pub fn compile(id: RegistrationId, binding: ServletBinding, anchor: SelectorAnchor) -> Self {
        let mut predicates = AndMatcher::default();
        match &binding {
            ServletBinding::Path(b) => {
                predicates.push(ExactPathMatcher::new(&b.paths));
                if b.strict {
                    predicates.push(MethodMatcher::new(&b.methods));
                    predicates.push(ExtensionMatcher::new(&b.extensions));
                    predicates.push(OrderedSelectorMatcher::new(&b.selectors));
                }
            }
            ServletBinding::ResourceType(b) => {
                predicates.push(MethodMatcher::new(&b.methods));
                predicates.push(ExtensionMatcher::new(&b.extensions));
                predicates.push(AnchoredSelectorMatcher::new(&b.selectors, anchor));
            }
        }

        Self {
            id,
            binding,
            predicates,
        }
    }

    pub fn name(&self) -> &str {
        self.binding.name()
    }

    pub fn is_path_bound(&self) -> bool {
        matches!(self.binding, ServletBinding::Path(_))
    }
}

/// The winning route and why it won.
#[derive(Debug, Clone, Copy)]
pub struct ServletMatch<'a> {
    pub route: &'a ServletRoute,
    /// Declared resource type that matched; `None` for path routes.
    pub matched_resource_type: Option<&'a str>,
    pub matched_selectors: &'a [String],
    /// Ancestor distance of the matched type, 0 for the request's own type.
    pub depth: usize,
}

/// Result of route lookup.
#[derive(Debug, Clone, Copy)]
pub enum MatchResult<'a> {
    Matched(ServletMatch<'a>),
    NoMatch,
}

impl<'a> MatchResult<'a> {
    pub fn matched(&self) -> Option<&ServletMatch<'a>> {
        match self {
            MatchResult::Matched(m) => Some(m),
            MatchResult::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }

    /// Name of the selected servlet.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            MatchResult::Matched(m) => Some(m.route.name()),
            MatchResult::NoMatch => None,
        }
    }
}

/// Find the best servlet route for `request`.
pub fn resolve<'a, L>(
    request: &RequestDescriptor,
    routes: impl IntoIterator<Item = &'a ServletRoute>,
    lookup: &L,
    search_paths: &[String],
    options: &MatchingConfig,
) -> MatchResult<'a>
where
    L: SuperTypeLookup + ?Sized,
{
    let hierarchy = TypeHierarchy::resolve(lookup, &request.resource_type, search_paths);

    let best = routes
        .into_iter()
        .filter(|route| route.predicates.matches(request))
        .filter_map(|route| candidate(route, &hierarchy))
        .max_by(|a, b| compare(a, b, options.ranking));

    match best {
        Some(winner) => {
            tracing::debug!(
                resource_path = %request.resource_path,
                resource_type = %request.resource_type,
                servlet = winner.route.name(),
                id = winner.route.id,
                depth = winner.depth,
                "Resolved servlet"
            );
            MatchResult::Matched(ServletMatch {
                route: winner.route,
                matched_resource_type: winner.resource_type,
                matched_selectors: winner.route.binding.selectors(),
                depth: winner.depth,
            })
        }
        None => {
            tracing::debug!(
                resource_path = %request.resource_path,
                resource_type = %request.resource_type,
                "No servlet matched"
            );
            MatchResult::NoMatch
        }
    }
}

struct Candidate<'a> {
    route: &'a ServletRoute,
    resource_type: Option<&'a str>,
    depth: usize,
    selector_count: usize,
}

fn candidate<'a>(route: &'a ServletRoute, hierarchy: &TypeHierarchy) -> Option<Candidate<'a>> {
    match &route.binding {
        // Path candidates carry no depth or selector weight
        ServletBinding::Path(_) => Some(Candidate {
            route,
            resource_type: None,
            depth: 0,
            selector_count: 0,
        }),
        ServletBinding::ResourceType(b) => {
            let (depth, matched) = hierarchy.first_match(&b.resource_types)?;
            tracing::trace!(servlet = %b.name, resource_type = matched, depth, "Resource type candidate");
            Some(Candidate {
                route,
                resource_type: Some(matched),
                depth,
                selector_count: b.selectors.len(),
            })
        }
    }
}

/// `Greater` means `a` is the better candidate.
fn compare(a: &Candidate<'_>, b: &Candidate<'_>, ranking: RankingPolicy) -> Ordering {
    let by_depth = b.depth.cmp(&a.depth);
    let by_selectors = a.selector_count.cmp(&b.selector_count);
    let specificity = match ranking {
        RankingPolicy::TypeDepthFirst => by_depth.then(by_selectors),
        RankingPolicy::SelectorsFirst => by_selectors.then(by_depth),
    };

    a.route
        .is_path_bound()
        .cmp(&b.route.is_path_bound())
        .then(specificity)
        .then(a.route.binding.rank().cmp(&b.route.binding.rank()))
        .then(b.route.id.cmp(&a.route.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::resource_type::ResourceTypeGraph;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn list(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn type_route(id: u64, name: &str, types: &[&str], selectors: &[&str], rank: i32) -> ServletRoute {
        let binding = ResourceTypeBinding {
            name: name.to_string(),
            resource_types: list(types),
            prefix: "/".to_string(),
            selectors: list(selectors),
            extensions: BTreeSet::new(),
            methods: set(&["GET", "HEAD"]),
            rank,
        };
        ServletRoute::compile(id, ServletBinding::ResourceType(binding), SelectorAnchor::Trailing)
    }

    fn path_route(id: u64, name: &str, paths: &[&str]) -> ServletRoute {
        let binding = PathBinding {
            name: name.to_string(),
            paths: list(paths),
            prefix: "/".to_string(),
            strict: true,
            selectors: Vec::new(),
            extensions: BTreeSet::new(),
            methods: BTreeSet::new(),
            rank: 0,
        };
        ServletRoute::compile(id, ServletBinding::Path(binding), SelectorAnchor::Trailing)
    }

    fn graph() -> ResourceTypeGraph {
        ResourceTypeGraph::from_pairs([("app/derived", "app/base")])
    }

    fn run<'a>(routes: &'a [ServletRoute], req: &RequestDescriptor) -> MatchResult<'a> {
        resolve(req, routes, &graph(), &[], &MatchingConfig::default())
    }

    #[test]
    fn test_derived_beats_base() {
        let routes = vec![
            type_route(1, "base", &["app/base"], &[], 100),
            type_route(2, "derived", &["app/derived"], &[], 0),
        ];
        let req = RequestDescriptor::new("/content/x", "app/derived");
        let result = run(&routes, &req);
        assert_eq!(result.name(), Some("derived"));
        assert_eq!(result.matched().unwrap().depth, 0);

        let base_only = &routes[..1];
        let result = run(base_only, &req);
        assert_eq!(result.name(), Some("base"));
        assert_eq!(result.matched().unwrap().matched_resource_type, Some("app/base"));
        assert_eq!(result.matched().unwrap().depth, 1);
    }

    #[test]
    fn test_longer_selectors_win_at_same_depth() {
        let routes = vec![
            type_route(1, "plain", &["app/base"], &[], 0),
            type_route(2, "print", &["app/base"], &["print"], 0),
            type_route(3, "print-a4", &["app/base"], &["print", "a4"], 0),
        ];
        let req = RequestDescriptor::new("/content/x", "app/base").with_selectors(["print", "a4"]);
        assert_eq!(run(&routes, &req).name(), Some("print-a4"));

        let req = RequestDescriptor::new("/content/x", "app/base").with_selectors(["a4"]);
        assert_eq!(run(&routes, &req).name(), Some("plain"));
    }

    #[test]
    fn test_ranking_policy() {
        let routes = vec![
            type_route(1, "derived", &["app/derived"], &[], 0),
            type_route(2, "base-print", &["app/base"], &["print"], 0),
        ];
        let req = RequestDescriptor::new("/content/x", "app/derived").with_selectors(["print"]);
        assert_eq!(run(&routes, &req).name(), Some("derived"));

        let options = MatchingConfig {
            ranking: RankingPolicy::SelectorsFirst,
            ..Default::default()
        };
        let result = resolve(&req, &routes, &graph(), &[], &options);
        assert_eq!(result.name(), Some("base-print"));
    }

    #[test]
    fn test_rank_then_registration_order() {
        let routes = vec![
            type_route(1, "first", &["app/base"], &[], 0),
            type_route(2, "second", &["app/base"], &[], 0),
            type_route(3, "low", &["app/base"], &[], -1),
        ];
        let req = RequestDescriptor::new("/content/x", "app/base");
        assert_eq!(run(&routes, &req).name(), Some("first"));

        let routes = vec![
            type_route(1, "first", &["app/base"], &[], 0),
            type_route(2, "ranked", &["app/base"], &[], 5),
        ];
        assert_eq!(run(&routes, &req).name(), Some("ranked"));
    }

    #[test]
    fn test_path_beats_resource_type() {
        let routes = vec![
            type_route(1, "typed", &["app/base"], &["print"], 1000),
            path_route(2, "path", &["/content/x"]),
        ];
        let req = RequestDescriptor::new("/content/x", "app/base").with_selectors(["print"]);
        let result = run(&routes, &req);
        assert_eq!(result.name(), Some("path"));
        assert_eq!(result.matched().unwrap().matched_resource_type, None);
    }

    #[test]
    fn test_exact_path_only() {
        let routes = vec![path_route(1, "servlet", &["/bin/servlet"])];
        for path in ["/bin/servlet/", "/bin/servlet/child", "/bin"] {
            let req = RequestDescriptor::new(path, "");
            assert!(!run(&routes, &req).is_match(), "{} should not match", path);
        }
        assert!(run(&routes, &RequestDescriptor::new("/bin/servlet", "")).is_match());
    }

    #[test]
    fn test_default_methods() {
        let routes = vec![type_route(1, "typed", &["app/base"], &[], 0)];
        let head = RequestDescriptor::new("/content/x", "app/base").with_method("HEAD");
        assert!(run(&routes, &head).is_match());
        let post = RequestDescriptor::new("/content/x", "app/base").with_method("POST");
        assert!(!run(&routes, &post).is_match());
    }

    #[test]
    fn test_search_path_expansion() {
        let routes = vec![type_route(1, "libs", &["/libs/app/base"], &[], 0)];
        let search_paths = list(&["/apps/", "/libs/"]);
        let req = RequestDescriptor::new("/content/x", "app/derived");
        let result = resolve(&req, &routes, &graph(), &search_paths, &MatchingConfig::default());
        assert_eq!(result.name(), Some("libs"));
        assert_eq!(result.matched().unwrap().depth, 1);
    }

    #[test]
    fn test_strict_path_predicates() {
        let binding = PathBinding {
            name: "strict".to_string(),
            paths: list(&["/bin/s"]),
            prefix: "/".to_string(),
            strict: true,
            selectors: list(&["a", "b"]),
            extensions: set(&["json"]),
            methods: set(&["POST"]),
            rank: 0,
        };
        let routes = vec![ServletRoute::compile(1, ServletBinding::Path(binding), SelectorAnchor::Trailing)];
        let post = |url: &str| RequestDescriptor::parse(url, "").with_method("POST");

        assert_eq!(run(&routes, &post("/bin/s.a.b.json")).name(), Some("strict"));
        assert_eq!(run(&routes, &post("/bin/s.a.x.b.json")).name(), Some("strict"));

        assert!(!run(&routes, &post("/bin/s.a.b.html")).is_match());
        assert!(!run(&routes, &post("/bin/s.b.a.json")).is_match());
        assert!(!run(&routes, &post("/bin/s.json")).is_match());
        assert!(!run(&routes, &RequestDescriptor::parse("/bin/s.a.b.json", "")).is_match());
    }

    #[test]
    fn test_cyclic_super_types_terminate() {
        let routes = vec![
            type_route(1, "loop-b", &["loop/b"], &[], 0),
            type_route(2, "base", &["app/base"], &[], 0),
        ];
        let graph = ResourceTypeGraph::from_pairs([("loop/a", "loop/b"), ("loop/b", "loop/a")]);
        let options = MatchingConfig::default();

        let req = RequestDescriptor::new("/content/x", "loop/a");
        let result = resolve(&req, &routes, &graph, &[], &options);
        assert_eq!(result.name(), Some("loop-b"));
        assert_eq!(result.matched().unwrap().depth, 1);

        // Nothing bound anywhere in the cycle
        let graph = ResourceTypeGraph::from_pairs([("loop/a", "loop/c"), ("loop/c", "loop/a")]);
        assert!(!resolve(&req, &routes, &graph, &[], &options).is_match());
    }

    #[test]
    fn test_no_match() {
        let routes: Vec<ServletRoute> = Vec::new();
        assert!(!run(&routes, &RequestDescriptor::new("/x", "app/base")).is_match());
    }
}
