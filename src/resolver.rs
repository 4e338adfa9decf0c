//! The run-resolution algorithm.
//!
//! Produces at most one run identifier from the selectors and filters. The
//! platform lists runs roughly most-recent-first, but that ordering is not
//! guaranteed; `ensure_latest` exists to scan every page and fold the
//! survivors down to the most recent one.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    error::Result,
    github::{GitHubClient, PER_PAGE},
    matching::MatchPolicy,
    selectors::SelectorSet,
    workflow::WorkflowRun,
};

/// The derived filter passed to the paginated run listing.
#[derive(Debug, Clone)]
pub struct RunQuery {
    /// The target repository owner.
    pub owner: String,
    /// The target repository name.
    pub repo: String,
    /// Workflow file name or numeric workflow identifier.
    pub workflow: String,
    /// Restricts the listing to runs of this branch.
    pub branch: Option<String>,
    /// Restricts the listing to runs of this trigger event.
    pub event: Option<String>,
    /// Restricts the listing to runs of this head commit.
    pub commit: Option<String>,
}

impl RunQuery {
    /// The `owner/name` form of the target repository.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// The per-run filters applied during discovery, in order.
#[derive(Debug, Clone, Default)]
pub struct RunFilters {
    /// Exact run number, if required.
    pub run_number: Option<u64>,
    /// Required conclusion; compared against the run's status as well, since
    /// a run in progress has no conclusion yet.
    pub conclusion: Option<String>,
    /// Whether runs whose head repository is a fork may survive.
    pub allow_forks: bool,
    /// Whether a surviving run must have at least one artifact.
    pub check_artifacts: bool,
    /// Whether a surviving run must have an artifact satisfying the match
    /// policy. Implies the presence requirement.
    pub search_artifacts: bool,
    /// Whether to scan all pages and keep the most recent survivor instead
    /// of stopping at the first one.
    pub ensure_latest: bool,
}

/// Resolves the selectors to at most one run identifier.
///
/// A pull-request selector is first resolved to its head commit; an explicit
/// run identifier skips discovery entirely. Discovery walks the paginated
/// run listing in arrival order, applying [`RunFilters`] per run. API errors
/// propagate unmodified; nothing here retries.
///
/// # Errors
///
/// Returns an error if any platform request fails. `Ok(None)` means the
/// listing was exhausted without a surviving run.
pub async fn resolve_run(
    client: &GitHubClient,
    selectors: &SelectorSet,
    mut query: RunQuery,
    filters: &RunFilters,
    policy: &MatchPolicy,
) -> Result<Option<u64>> {
    if let Some(run_id) = selectors.run_id {
        debug!("using explicit run id {run_id}, skipping discovery");
        return Ok(Some(run_id));
    }

    if let Some(number) = selectors.pull_request {
        let pull = client.pull_request(&query.owner, &query.repo, number).await?;
        info!("resolved pull request #{number} to commit {}", pull.head.sha);
        query.commit = Some(pull.head.sha);
    }

    let target_repo = query.full_name();
    // Best-so-far survivor under ensure_latest, as a fold over the pages.
    let mut best: Option<(u64, DateTime<Utc>)> = None;
    let mut page = 1u32;

    loop {
        let runs = client.workflow_runs_page(&query, page).await?;
        let last_page = runs.len() < PER_PAGE;

        for run in runs {
            if !survives(&run, filters, &target_repo) {
                continue;
            }
            if filters.check_artifacts || filters.search_artifacts {
                let artifacts = client
                    .run_artifacts(&query.owner, &query.repo, run.id)
                    .await?;
                if artifacts.is_empty() {
                    debug!("skipping run {}: no artifacts", run.id);
                    continue;
                }
                if filters.search_artifacts
                    && !artifacts.iter().any(|artifact| policy.matches(&artifact.name))
                {
                    debug!("skipping run {}: no artifact matches the requested name", run.id);
                    continue;
                }
            }

            if !filters.ensure_latest {
                info!("found run {} created at {}", run.id, run.created_at);
                return Ok(Some(run.id));
            }

            best = match best {
                Some((_, created_at)) if created_at >= run.created_at => best,
                _ => Some((run.id, run.created_at)),
            };
        }

        if last_page {
            break;
        }
        page += 1;
    }

    if let Some((run_id, created_at)) = &best {
        info!("found run {run_id} created at {created_at}");
    }
    Ok(best.map(|(run_id, _)| run_id))
}

/// The synchronous per-run filters: run number, conclusion-or-status, fork.
/// Short-circuits on the first failure.
fn survives(run: &WorkflowRun, filters: &RunFilters, target_repo: &str) -> bool {
    if let Some(number) = filters.run_number {
        if run.run_number != number {
            return false;
        }
    }

    if let Some(conclusion) = &filters.conclusion {
        let matches_conclusion = run.conclusion.as_deref() == Some(conclusion.as_str());
        let matches_status = run.status.as_deref() == Some(conclusion.as_str());
        if !matches_conclusion && !matches_status {
            return false;
        }
    }

    if !filters.allow_forks {
        match &run.head_repository {
            Some(head) if head.full_name == target_repo => {}
            Some(head) => {
                info!("skipping run from fork: {}", head.full_name);
                return false;
            }
            None => {
                info!("skipping run {}: unknown head repository", run.id);
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::HeadRepository;

    fn run(number: u64, status: &str, conclusion: Option<&str>, head: &str) -> WorkflowRun {
        WorkflowRun {
            id: number,
            run_number: number,
            workflow_id: 1,
            status: Some(status.to_owned()),
            conclusion: conclusion.map(String::from),
            created_at: Utc::now(),
            head_repository: Some(HeadRepository {
                full_name: head.to_owned(),
            }),
        }
    }

    fn filters() -> RunFilters {
        RunFilters::default()
    }

    #[test]
    fn run_number_must_match_exactly() {
        let filters = RunFilters {
            run_number: Some(5),
            ..filters()
        };
        assert!(survives(
            &run(5, "completed", Some("success"), "o/r"),
            &filters,
            "o/r"
        ));
        assert!(!survives(
            &run(6, "completed", Some("success"), "o/r"),
            &filters,
            "o/r"
        ));
    }

    #[test]
    fn conclusion_filter_also_accepts_status() {
        let filters = RunFilters {
            conclusion: Some(String::from("in_progress")),
            ..filters()
        };
        // A run in progress has no conclusion yet; its status must count.
        assert!(survives(&run(1, "in_progress", None, "o/r"), &filters, "o/r"));
        assert!(!survives(
            &run(1, "completed", Some("failure"), "o/r"),
            &filters,
            "o/r"
        ));

        let filters = RunFilters {
            conclusion: Some(String::from("success")),
            ..RunFilters::default()
        };
        assert!(survives(
            &run(1, "completed", Some("success"), "o/r"),
            &filters,
            "o/r"
        ));
        assert!(!survives(&run(1, "in_progress", None, "o/r"), &filters, "o/r"));
    }

    #[test]
    fn forks_are_excluded_unless_allowed() {
        assert!(!survives(
            &run(1, "completed", Some("success"), "someone/else"),
            &filters(),
            "o/r"
        ));

        let allowing = RunFilters {
            allow_forks: true,
            ..filters()
        };
        assert!(survives(
            &run(1, "completed", Some("success"), "someone/else"),
            &allowing,
            "o/r"
        ));
    }

    #[test]
    fn unknown_head_repository_counts_as_fork() {
        let mut orphan = run(1, "completed", Some("success"), "o/r");
        orphan.head_repository = None;
        assert!(!survives(&orphan, &filters(), "o/r"));
    }

    #[test]
    fn unfiltered_run_survives() {
        assert!(survives(
            &run(1, "completed", Some("success"), "o/r"),
            &filters(),
            "o/r"
        ));
    }
}
