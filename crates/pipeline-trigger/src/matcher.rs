//! Wildcard filter compilation.
//!
//! A filter string is a space-separated list of tokens. Inside a token `*`
//! matches any run of characters and everything else is literal. Tokens are
//! OR-ed together and a candidate must match a token in full:
//!
//! ```text
//! "main release-*"  =>  ^(?:main|release\-.*)$
//! ```
//!
//! Compilation never fails. Characters other than `*` are always escaped,
//! so the worst a filter can do is match too much or nothing at all.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;

/// Build the alternation for a filter string, without anchors.
///
/// Empty tokens (from leading, trailing, or repeated spaces) are dropped.
/// Returns `None` when no token remains.
pub fn to_regex_pattern(pattern_list: &str) -> Option<String> {
    let fragments: Vec<String> = pattern_list
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*")
        })
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join("|"))
    }
}

/// Whether a filter string has at least one token. Only `' '` separates
/// tokens, so a tab or other whitespace is a literal token.
pub fn has_tokens(pattern_list: &str) -> bool {
    pattern_list.split(' ').any(|token| !token.is_empty())
}

/// A compiled filter string. Purely a function of its source.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Option<Regex>,
}

impl CompiledPattern {
    /// Compile a filter string. Never fails; see the module docs.
    pub fn compile(pattern_list: &str) -> Self {
        let regex = to_regex_pattern(pattern_list).and_then(|alternation| {
            match Regex::new(&format!("^(?:{alternation})$")) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    // Only reachable through the regex size limit.
                    tracing::warn!(
                        pattern_list = %pattern_list,
                        error = %e,
                        "filter could not be compiled; it will match nothing"
                    );
                    None
                }
            }
        });

        Self {
            source: pattern_list.to_string(),
            regex,
        }
    }

    /// Full-string match against any token.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex
            .as_ref()
            .is_some_and(|regex| regex.is_match(candidate))
    }

    /// The filter string this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// `false` when the filter had no tokens and can never match.
    pub fn has_patterns(&self) -> bool {
        self.regex.is_some()
    }
}

/// Compiles filter strings, memoizing the result per string.
///
/// The cache is shared by all callers. Two threads racing to compile the
/// same string both compile it and the first insert wins; the results are
/// interchangeable. When full, the cache is cleared rather than evicted
/// entry by entry.
pub struct WildcardMatcher {
    cache: RwLock<HashMap<String, Arc<CompiledPattern>>>,
    capacity: usize,
}

impl WildcardMatcher {
    /// A matcher caching at most `capacity` filter strings. `0` disables
    /// caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Compile `pattern_list`, or return the cached compilation.
    pub fn compile(&self, pattern_list: &str) -> Arc<CompiledPattern> {
        if self.capacity == 0 {
            return Arc::new(CompiledPattern::compile(pattern_list));
        }

        if let Some(hit) = self.cache.read().get(pattern_list) {
            return Arc::clone(hit);
        }

        let compiled = Arc::new(CompiledPattern::compile(pattern_list));
        let mut cache = self.cache.write();
        if cache.len() >= self.capacity && !cache.contains_key(pattern_list) {
            tracing::debug!(capacity = self.capacity, "pattern cache full, clearing");
            cache.clear();
        }
        Arc::clone(cache.entry(pattern_list.to_string()).or_insert(compiled))
    }

    /// Number of cached filter strings.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }
}

impl Default for WildcardMatcher {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for WildcardMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WildcardMatcher")
            .field("cached", &self.cached())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Compile without memoization.
pub fn compile(pattern_list: &str) -> CompiledPattern {
    CompiledPattern::compile(pattern_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_everything() {
        let pattern = compile("*");
        for name in ["", "main", "feature/with spaces", "PR-12"] {
            assert!(pattern.matches(name), "{name:?} should match");
        }
    }

    #[test]
    fn empty_list_matches_nothing() {
        for list in ["", " ", "   "] {
            let pattern = compile(list);
            assert!(!pattern.has_patterns());
            assert!(!pattern.matches(""));
            assert!(!pattern.matches("main"));
        }
    }

    #[test]
    fn tokens_are_alternatives_with_full_match() {
        let pattern = compile("foo bar");
        assert!(pattern.matches("foo"));
        assert!(pattern.matches("bar"));
        assert!(!pattern.matches("foobar"));
        assert!(!pattern.matches("baz"));
        assert!(!pattern.matches("xfoo"));
    }

    #[test]
    fn repeated_spaces_do_not_add_an_empty_alternative() {
        let pattern = compile("foo  bar ");
        assert!(pattern.matches("foo"));
        assert!(pattern.matches("bar"));
        assert!(!pattern.matches(""));
    }

    #[test]
    fn trailing_star() {
        let pattern = compile("release-*");
        assert!(pattern.matches("release-1.0"));
        assert!(pattern.matches("release-"));
        assert!(!pattern.matches("release"));
        assert!(!pattern.matches("relea"));
        assert!(!pattern.matches("pre-release-1.0"));
    }

    #[test]
    fn inner_and_leading_stars() {
        let pattern = compile("*-hotfix feature/*/ui");
        assert!(pattern.matches("1.2-hotfix"));
        assert!(pattern.matches("feature/login/ui"));
        assert!(pattern.matches("feature//ui"));
        assert!(!pattern.matches("feature/login/api"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let pattern = compile("v1.0 a+b (x)");
        assert!(pattern.matches("v1.0"));
        assert!(!pattern.matches("v1x0"));
        assert!(pattern.matches("a+b"));
        assert!(!pattern.matches("aab"));
        assert!(pattern.matches("(x)"));
    }

    #[test]
    fn only_spaces_separate_tokens() {
        assert!(!has_tokens(""));
        assert!(!has_tokens("   "));
        assert!(has_tokens("\t"));
        assert!(has_tokens(" a "));
        assert!(compile("\t").matches("\t"));
    }

    #[test]
    fn regex_pattern_shape() {
        assert_eq!(to_regex_pattern("*").as_deref(), Some(".*"));
        assert_eq!(to_regex_pattern("a b*").as_deref(), Some("a|b.*"));
        assert_eq!(to_regex_pattern(""), None);
    }

    #[test]
    fn matching_is_deterministic() {
        let pattern = compile("dev-* main");
        for _ in 0..3 {
            assert!(pattern.matches("dev-1"));
            assert!(!pattern.matches("prod"));
        }
        let again = compile("dev-* main");
        assert_eq!(again.matches("dev-1"), pattern.matches("dev-1"));
    }

    #[test]
    fn cache_returns_shared_instance() {
        let matcher = WildcardMatcher::new(8);
        let a = matcher.compile("main");
        let b = matcher.compile("main");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(matcher.cached(), 1);
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let matcher = WildcardMatcher::new(0);
        let a = matcher.compile("main");
        let b = matcher.compile("main");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(matcher.cached(), 0);
    }

    #[test]
    fn full_cache_is_cleared() {
        let matcher = WildcardMatcher::new(2);
        matcher.compile("a");
        matcher.compile("b");
        assert_eq!(matcher.cached(), 2);
        matcher.compile("c");
        assert_eq!(matcher.cached(), 1);
        assert!(matcher.compile("c").matches("c"));
    }

    #[test]
    fn concurrent_compiles_agree() {
        let matcher = WildcardMatcher::new(16);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let pattern = matcher.compile("build-* main");
                    assert!(pattern.matches("build-42"));
                    assert!(!pattern.matches("other"));
                });
            }
        });
        assert_eq!(matcher.cached(), 1);
    }
}
