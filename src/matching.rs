//! Artifact name matching.

use regex::Regex;

use crate::{error::Result, workflow::artifact::Artifact};

/// Governs whether an artifact name must equal or match a requested name.
///
/// Pattern matching uses search semantics: the pattern may hit anywhere in
/// the name unless explicitly anchored.
#[derive(Debug, Clone)]
pub enum MatchPolicy {
    /// No name was requested; every artifact matches.
    All,
    /// The name must compare equal.
    Exact(String),
    /// The name must contain a match of the pattern.
    Pattern(Regex),
}

impl MatchPolicy {
    /// Builds a policy from the `name` and `name_is_regexp` inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is requested as a pattern but is not a
    /// valid regular expression.
    pub fn new(name: Option<&str>, name_is_regexp: bool) -> Result<Self> {
        match name {
            None => Ok(Self::All),
            Some(name) if name_is_regexp => Ok(Self::Pattern(Regex::new(name)?)),
            Some(name) => Ok(Self::Exact(name.to_owned())),
        }
    }

    /// Whether every artifact matches, i.e. no name was requested.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether a single artifact name satisfies the policy.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(expected) => name == expected,
            Self::Pattern(pattern) => pattern.is_match(name),
        }
    }

    /// Filters artifacts down to the matching subsequence, preserving the
    /// platform's relative order. An empty result is not an error.
    pub fn filter(&self, artifacts: Vec<Artifact>) -> Vec<Artifact> {
        artifacts
            .into_iter()
            .filter(|artifact| self.matches(&artifact.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifacts(names: &[&str]) -> Vec<Artifact> {
        names
            .iter()
            .enumerate()
            .map(|(id, name)| Artifact {
                id: id as u64,
                name: (*name).to_owned(),
                size_in_bytes: 0,
                expired: false,
            })
            .collect()
    }

    fn names(artifacts: &[Artifact]) -> Vec<&str> {
        artifacts.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn pattern_search_preserves_order() {
        let policy = MatchPolicy::new(Some("build-.*"), true).unwrap();
        let filtered = policy.filter(artifacts(&["build-linux", "build-macos", "build-windows"]));
        assert_eq!(
            names(&filtered),
            ["build-linux", "build-macos", "build-windows"]
        );
    }

    #[test]
    fn anchored_pattern_can_match_nothing() {
        let policy = MatchPolicy::new(Some("^linux$"), true).unwrap();
        let filtered = policy.filter(artifacts(&["build-linux", "build-macos", "build-windows"]));
        assert!(filtered.is_empty());
    }

    #[test]
    fn unanchored_pattern_searches_anywhere() {
        let policy = MatchPolicy::new(Some("linux"), true).unwrap();
        assert!(policy.matches("build-linux"));
    }

    #[test]
    fn exact_match_is_not_a_search() {
        let policy = MatchPolicy::new(Some("build"), false).unwrap();
        assert!(!policy.matches("build-linux"));
        assert!(policy.matches("build"));
    }

    #[test]
    fn absent_name_matches_everything() {
        let policy = MatchPolicy::new(None, false).unwrap();
        assert!(policy.is_all());
        assert!(policy.matches("anything"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(MatchPolicy::new(Some("["), true).is_err());
    }
}
