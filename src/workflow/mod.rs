//! Data models of GitHub Actions workflows.

use chrono::{DateTime, Utc};
use serde::Deserialize;

pub mod artifact;

/// Represents a GitHub Actions workflow run from GitHub REST API.
///
/// Read-only snapshot; never mutated locally.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowRun {
    /// The run identifier, unique per repository host.
    pub id: u64,
    /// The ordinal of this run within its workflow.
    pub run_number: u64,
    /// The identifier of the workflow this run belongs to.
    pub workflow_id: u64,
    /// `queued`, `in_progress` or `completed`, when known.
    pub status: Option<String>,
    /// The conclusion, absent while the run is still going.
    pub conclusion: Option<String>,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
    /// Where the head commit lives; absent when the fork was deleted.
    pub head_repository: Option<HeadRepository>,
}

/// The repository a run's head commit lives in. Differs from the target
/// repository when the run was triggered from a fork.
#[derive(Debug, Deserialize, Clone)]
pub struct HeadRepository {
    /// The `owner/name` form of the repository.
    pub full_name: String,
}

/// One page of the run listing.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowRuns {
    /// The number of runs across all pages.
    pub total_count: u64,
    /// The runs of this page, in platform order.
    pub workflow_runs: Vec<WorkflowRun>,
}

/// The slice of a pull request needed to resolve it to its head commit.
#[derive(Debug, Deserialize, Clone)]
pub struct PullRequest {
    /// The head reference of the pull request.
    pub head: PullRequestHead,
}

/// The head reference of a pull request.
#[derive(Debug, Deserialize, Clone)]
pub struct PullRequestHead {
    /// The head commit SHA.
    pub sha: String,
}
