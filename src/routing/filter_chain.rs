//! Filter chain construction.
//!
//! Every filter whose predicates all hold for the request joins the chain.
//! The chain runs by rank descending, ties in registration order.

use std::cell::OnceCell;

use crate::descriptor::{FilterBinding, RegistrationId};
use crate::request::RequestDescriptor;
use crate::resource_type::{SuperTypeLookup, TypeHierarchy};
use crate::routing::matcher::{
    AndMatcher, AnySelectorMatcher, ExtensionMatcher, Matcher, MethodMatcher, PathPatternMatcher,
    ScopeMatcher, SuffixPatternMatcher,
};

/// A registered filter with its compiled predicates.
#[derive(Debug)]
pub struct FilterRoute {
    pub id: RegistrationId,
    pub binding: FilterBinding,
    predicates: AndMatcher,
}

impl FilterRoute {
    pub fn compile(id: RegistrationId, binding: FilterBinding) -> Self {
        let mut predicates = AndMatcher::default();
        predicates.push(ScopeMatcher::new(&binding.scope));
        if let Some(pattern) = &binding.pattern {
            predicates.push(PathPatternMatcher::new(pattern.clone()));
        }
        if let Some(pattern) = &binding.suffix_pattern {
            predicates.push(SuffixPatternMatcher::new(pattern.clone()));
        }
        predicates.push(MethodMatcher::new(&binding.methods));
        predicates.push(ExtensionMatcher::new(&binding.extensions));
        predicates.push(AnySelectorMatcher::new(&binding.selectors));

        Self {
            id,
            binding,
            predicates,
        }
    }

    pub fn name(&self) -> &str {
        &self.binding.name
    }

    pub fn rank(&self) -> i32 {
        self.binding.rank
    }
}

/// Ordered list of filters applicable to `request`. An empty chain is valid.
pub fn build_chain<'a, L>(
    request: &RequestDescriptor,
    filters: impl IntoIterator<Item = &'a FilterRoute>,
    lookup: &L,
    search_paths: &[String],
) -> Vec<&'a FilterRoute>
where
    L: SuperTypeLookup + ?Sized,
{
    // Only walked when some filter restricts resource types
    let hierarchy = OnceCell::new();

    let mut chain: Vec<&FilterRoute> = filters
        .into_iter()
        .filter(|filter| filter.predicates.matches(request))
        .filter(|filter| {
            let declared = &filter.binding.resource_types;
            declared.is_empty()
                || hierarchy
                    .get_or_init(|| {
                        TypeHierarchy::resolve(lookup, &request.resource_type, search_paths)
                    })
                    .is_any_of(declared)
        })
        .collect();

    chain.sort_by(|a, b| b.rank().cmp(&a.rank()).then(a.id.cmp(&b.id)));

    tracing::debug!(
        resource_path = %request.resource_path,
        scope = %request.dispatch_scope,
        filters = chain.len(),
        "Built filter chain"
    );
    chain
}
