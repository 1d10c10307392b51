//! Include/exclude job filtering.

use std::sync::Arc;

use crate::matcher::{has_tokens, CompiledPattern, WildcardMatcher};
use crate::types::DEFAULT_INCLUDE_FILTER;

/// Outcome of evaluating a job name against a [`FilterPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Accepted,
    /// Matched the exclude filter. Exclusion is checked first.
    Excluded,
    /// Did not match the include filter.
    NotIncluded,
}

impl FilterDecision {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for FilterDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Excluded => f.write_str("excluded by exclude filter"),
            Self::NotIncluded => f.write_str("not included by include filter"),
        }
    }
}

/// An include filter plus an optional exclude filter.
///
/// An exclude filter without tokens is treated as absent. An include filter
/// with no tokens matches nothing, so a policy built from `("", "")` rejects
/// every job. That is a configuration mistake, not an error.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    include: Arc<CompiledPattern>,
    exclude: Option<Arc<CompiledPattern>>,
}

impl FilterPolicy {
    /// Compile both filters without caching.
    pub fn new(include: &str, exclude: &str) -> Self {
        Self {
            include: Arc::new(CompiledPattern::compile(include)),
            exclude: has_tokens(exclude).then(|| Arc::new(CompiledPattern::compile(exclude))),
        }
    }

    /// Compile both filters through a shared, memoizing matcher.
    pub fn with_matcher(matcher: &WildcardMatcher, include: &str, exclude: &str) -> Self {
        Self {
            include: matcher.compile(include),
            exclude: has_tokens(exclude).then(|| matcher.compile(exclude)),
        }
    }

    /// Legacy single-filter policy.
    pub fn single(filter: &str) -> Self {
        Self::new(filter, "")
    }

    /// Decide on `candidate`, checking the exclude filter first.
    pub fn evaluate(&self, candidate: &str) -> FilterDecision {
        if self
            .exclude
            .as_ref()
            .is_some_and(|exclude| exclude.matches(candidate))
        {
            FilterDecision::Excluded
        } else if self.include.matches(candidate) {
            FilterDecision::Accepted
        } else {
            FilterDecision::NotIncluded
        }
    }

    /// Shorthand for `evaluate(candidate).is_accepted()`.
    pub fn accepts(&self, candidate: &str) -> bool {
        self.evaluate(candidate).is_accepted()
    }

    /// The include filter string.
    pub fn include_source(&self) -> &str {
        self.include.source()
    }

    /// The exclude filter string, when one with tokens is configured.
    pub fn exclude_source(&self) -> Option<&str> {
        self.exclude.as_deref().map(CompiledPattern::source)
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::single(DEFAULT_INCLUDE_FILTER)
    }
}
