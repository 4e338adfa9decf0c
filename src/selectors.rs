//! Run selectors and their mutual-exclusion rule.

use crate::error::{Error, Result};

/// The mutually exclusive ways of pinning a target run.
///
/// At most one field may be populated; the selectors express incompatible
/// ways of pinning a run, and silently preferring one would hide user error.
#[derive(Debug, Clone, Default)]
pub struct SelectorSet {
    /// A pull request number whose head commit identifies the run.
    pub pull_request: Option<u64>,
    /// A head commit SHA.
    pub commit_sha: Option<String>,
    /// A branch name (already normalized, without `refs/heads/`).
    pub branch: Option<String>,
    /// An explicit run identifier, skipping discovery entirely.
    pub run_id: Option<u64>,
}

impl SelectorSet {
    /// Checks the mutual-exclusion rule. Runs before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingSelectors`] if more than one selector is
    /// populated.
    pub fn validate(&self) -> Result<()> {
        let populated = usize::from(self.pull_request.is_some())
            + usize::from(self.commit_sha.is_some())
            + usize::from(self.branch.is_some())
            + usize::from(self.run_id.is_some());

        if populated > 1 {
            Err(Error::ConflictingSelectors)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(
        pull_request: Option<u64>,
        commit_sha: Option<&str>,
        branch: Option<&str>,
        run_id: Option<u64>,
    ) -> SelectorSet {
        SelectorSet {
            pull_request,
            commit_sha: commit_sha.map(String::from),
            branch: branch.map(String::from),
            run_id,
        }
    }

    #[test]
    fn empty_and_single_selectors_pass() {
        assert!(set(None, None, None, None).validate().is_ok());
        assert!(set(Some(7), None, None, None).validate().is_ok());
        assert!(set(None, Some("abc123"), None, None).validate().is_ok());
        assert!(set(None, None, Some("main"), None).validate().is_ok());
        assert!(set(None, None, None, Some(42)).validate().is_ok());
    }

    #[test]
    fn every_pair_conflicts() {
        let pairs = [
            set(Some(7), Some("abc123"), None, None),
            set(Some(7), None, Some("main"), None),
            set(Some(7), None, None, Some(42)),
            set(None, Some("abc123"), Some("main"), None),
            set(None, Some("abc123"), None, Some(42)),
            set(None, None, Some("main"), Some(42)),
        ];
        for selectors in pairs {
            assert!(matches!(
                selectors.validate(),
                Err(Error::ConflictingSelectors)
            ));
        }
    }

    #[test]
    fn all_populated_conflicts() {
        let selectors = set(Some(7), Some("abc123"), Some("main"), Some(42));
        assert!(matches!(
            selectors.validate(),
            Err(Error::ConflictingSelectors)
        ));
    }
}
