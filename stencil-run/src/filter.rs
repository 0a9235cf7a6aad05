//! Exclusion rules for directory scans.
//!
//! Rules are globs in gitignore style: a leading `!` negates. A file is
//! skipped when at least one positive rule matches it and no negated rule
//! does, so negations always win regardless of their position in the list.
//!
//! A rule without `/` is matched against the file name and against every
//! directory component of the relative path; a rule with `/` is matched
//! against the whole relative path, with `*` not crossing separators.

use glob::{MatchOptions, Pattern};

use crate::error::RunError;

const PATH_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct Rule {
    pattern: Pattern,
    anchored: bool,
}

impl Rule {
    fn matches(&self, rel_path: &str) -> bool {
        if self.anchored {
            return self
                .pattern
                .matches_with(rel_path.trim_start_matches('/'), PATH_MATCH);
        }
        rel_path
            .split('/')
            .any(|segment| self.pattern.matches_with(segment, PATH_MATCH))
    }
}

/// Compiled exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    excludes: Vec<Rule>,
    negations: Vec<Rule>,
}

impl ExcludeMatcher {
    /// Compile rule strings; blank rules and `#` comments are ignored.
    pub fn new<S: AsRef<str>>(rules: &[S]) -> Result<Self, RunError> {
        let mut matcher = ExcludeMatcher::default();
        for raw in rules {
            let raw = raw.as_ref().trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }
            let (negated, glob) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            let glob = glob.trim_end_matches('/');
            let pattern = Pattern::new(glob).map_err(|source| RunError::Glob {
                pattern: raw.to_string(),
                source,
            })?;
            let rule = Rule {
                pattern,
                anchored: glob.contains('/'),
            };
            if negated {
                matcher.negations.push(rule);
            } else {
                matcher.excludes.push(rule);
            }
        }
        Ok(matcher)
    }

    /// Whether the file at `rel_path` (relative to the scanned directory,
    /// `/`-separated) is skipped.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.excludes.iter().any(|r| r.matches(rel_path))
            && !self.negations.iter().any(|r| r.matches(rel_path))
    }
}
