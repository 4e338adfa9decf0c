//! The error taxonomy of one invocation, plus the configurable no-match policy.

use thiserror::Error;
use tracing::{info, warn};

/// A shorthand for results carrying [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end an invocation, or a part of it, unsuccessfully.
///
/// Per-entry traversal rejections are deliberately absent: they are skips,
/// logged by the extractor, never error values.
#[derive(Debug, Error)]
pub enum Error {
    /// More than one run selector was provided.
    #[error("the following inputs cannot be used together: pr, commit, branch, run_id")]
    ConflictingSelectors,

    /// Run discovery exhausted every page without a surviving run.
    #[error("no matching workflow run found with any artifacts")]
    NoMatchingRun,

    /// A run was resolved (or fallen back to) but yielded no usable artifact.
    #[error("no artifacts found")]
    NoMatchingArtifact,

    /// An invocation input was missing or unparsable.
    #[error("invalid input {key}: {message}")]
    Input {
        /// The input name as configured, e.g. `run_number`.
        key: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The GitHub REST API answered with a non-success status.
    #[error("GitHub API request failed with status {status}: {url}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// The HTTP transport failed before a response could be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The downloaded archive could not be read.
    #[error("archive error: {0}")]
    Archive(#[from] async_zip::error::ZipError),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact name pattern was not a valid regular expression.
    #[error("invalid name pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A step output could not be serialized.
    #[error("output serialization error: {0}")]
    Output(#[from] serde_json::Error),
}

/// What to do when no run or no artifact matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoMatchPolicy {
    /// Fail the invocation.
    Fail,
    /// Log a warning and exit successfully.
    Warn,
    /// Log and exit successfully.
    #[default]
    Ignore,
}

impl NoMatchPolicy {
    /// Parses the `if_no_artifact_found` input. Unknown values fall back to
    /// [`NoMatchPolicy::Ignore`].
    pub fn parse(value: &str) -> Self {
        match value {
            "fail" => Self::Fail,
            "warn" => Self::Warn,
            _ => Self::Ignore,
        }
    }

    /// Routes a no-match error through the policy: fatal under
    /// [`NoMatchPolicy::Fail`], tolerated (and logged) otherwise.
    ///
    /// # Errors
    ///
    /// Returns `err` unchanged under [`NoMatchPolicy::Fail`].
    pub fn apply(self, err: Error) -> Result<()> {
        match self {
            Self::Fail => Err(err),
            Self::Warn => {
                warn!("{err}");
                Ok(())
            }
            Self::Ignore => {
                info!("{err}");
                Ok(())
            }
        }
    }
}
