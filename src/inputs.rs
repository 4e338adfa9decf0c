//! Invocation inputs, read from `INPUT_*` environment variables the way the
//! invoking workflow provides them. Empty values count as absent.

use std::{env, path::PathBuf};

use crate::{
    error::{Error, NoMatchPolicy, Result},
    selectors::SelectorSet,
};

/// The workflow run this invocation itself executes in.
///
/// Read from the `GITHUB_RUN_ID` and `GITHUB_REPOSITORY` variables the
/// platform sets on every runner; absent outside of one. The repository may
/// differ from the target repository of the invocation.
#[derive(Debug, Clone)]
pub struct AmbientRun {
    /// The owner of the invoking repository.
    pub owner: String,
    /// The name of the invoking repository.
    pub repo: String,
    /// The identifier of the invoking run.
    pub run_id: u64,
}

impl AmbientRun {
    fn from_env() -> Option<Self> {
        let run_id = (*crate::env::GITHUB_RUN_ID)?;
        let (owner, repo) = parse_repo((*crate::env::GITHUB_REPOSITORY).as_deref()?)?;
        Some(Self {
            owner,
            repo,
            run_id,
        })
    }
}

/// Everything one invocation is configured with.
#[derive(Debug, Clone)]
pub struct Inputs {
    /// The API token used for every request.
    pub token: String,
    /// The target repository owner.
    pub owner: String,
    /// The target repository name.
    pub repo: String,
    /// The destination directory for downloads and extraction.
    pub path: PathBuf,
    /// Requested artifact name; absent means all artifacts.
    pub name: Option<String>,
    /// Whether `name` is a pattern rather than an exact name.
    pub name_is_regexp: bool,
    /// Whether downloaded archives stay zipped on disk.
    pub skip_unpack: bool,
    /// What to do when no run or no artifact matches.
    pub if_no_artifact_found: NoMatchPolicy,
    /// Workflow file name or id; derived from the invoking run when absent.
    pub workflow: Option<String>,
    /// Required conclusion (or status) of the target run.
    pub workflow_conclusion: Option<String>,
    /// Pull request selector.
    pub pr: Option<u64>,
    /// Commit selector.
    pub commit: Option<String>,
    /// Branch selector, already normalized.
    pub branch: Option<String>,
    /// Restricts discovery to runs of this trigger event.
    pub event: Option<String>,
    /// Explicit run selector, skipping discovery.
    pub run_id: Option<u64>,
    /// Exact run number filter.
    pub run_number: Option<u64>,
    /// Whether a surviving run must have at least one artifact.
    pub check_artifacts: bool,
    /// Whether a surviving run must have an artifact matching the name.
    pub search_artifacts: bool,
    /// Whether runs triggered from forks may survive.
    pub allow_forks: bool,
    /// Whether to scan every page and keep the most recent surviving run.
    pub ensure_latest: bool,
    /// Whether to only report what would be fetched.
    pub dry_run: bool,
    /// The run this invocation executes in, when on a runner. Used to derive
    /// the workflow and as the fallback download source.
    pub ambient_run: Option<AmbientRun>,
}

impl Inputs {
    /// Reads and validates the inputs of the current invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if a required input is missing or a numeric input
    /// does not parse.
    pub fn from_env() -> Result<Self> {
        let token = required("github_token")?;
        let repo_ref = required("repo")?;
        let (owner, repo) = parse_repo(&repo_ref).ok_or(Error::Input {
            key: "repo",
            message: String::from("expected the owner/name form"),
        })?;
        let path = PathBuf::from(required("path")?);

        Ok(Self {
            token,
            owner,
            repo,
            path,
            name: input("name"),
            name_is_regexp: flag("name_is_regexp"),
            skip_unpack: flag("skip_unpack"),
            if_no_artifact_found: NoMatchPolicy::parse(
                input("if_no_artifact_found").as_deref().unwrap_or_default(),
            ),
            workflow: input("workflow"),
            workflow_conclusion: input("workflow_conclusion"),
            pr: number("pr")?,
            commit: input("commit"),
            branch: input("branch").map(normalize_branch),
            event: input("event"),
            run_id: number("run_id")?,
            run_number: number("run_number")?,
            check_artifacts: flag("check_artifacts"),
            search_artifacts: flag("search_artifacts"),
            allow_forks: flag("allow_forks"),
            ensure_latest: flag("ensure_latest"),
            dry_run: flag("dry_run"),
            ambient_run: AmbientRun::from_env(),
        })
    }

    /// The run selectors of this invocation, ready for validation.
    pub fn selectors(&self) -> SelectorSet {
        SelectorSet {
            pull_request: self.pr,
            commit_sha: self.commit.clone(),
            branch: self.branch.clone(),
            run_id: self.run_id,
        }
    }
}

/// Splits an `owner/name` repository reference; both halves must be
/// non-empty.
pub fn parse_repo(repo_ref: &str) -> Option<(String, String)> {
    let (owner, repo) = repo_ref.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        None
    } else {
        Some((owner.to_owned(), repo.to_owned()))
    }
}

fn normalize_branch(branch: String) -> String {
    branch
        .strip_prefix("refs/heads/")
        .map_or(branch.clone(), ToOwned::to_owned)
}

fn input(key: &str) -> Option<String> {
    env::var(format!("INPUT_{}", key.to_uppercase()))
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn flag(key: &str) -> bool {
    input(key).is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

fn number(key: &'static str) -> Result<Option<u64>> {
    input(key)
        .map(|value| {
            value.parse().map_err(|err| Error::Input {
                key,
                message: format!("{err}"),
            })
        })
        .transpose()
}

fn required(key: &'static str) -> Result<String> {
    input(key).ok_or(Error::Input {
        key,
        message: String::from("required input is missing"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_reference_must_be_owner_slash_name() {
        assert_eq!(
            parse_repo("octo/widgets"),
            Some((String::from("octo"), String::from("widgets")))
        );
        assert_eq!(parse_repo("octo"), None);
        assert_eq!(parse_repo("/widgets"), None);
        assert_eq!(parse_repo("octo/"), None);
        assert_eq!(parse_repo("octo/widgets/extra"), None);
    }

    #[test]
    fn branch_refs_are_normalized() {
        assert_eq!(normalize_branch(String::from("refs/heads/main")), "main");
        assert_eq!(normalize_branch(String::from("main")), "main");
        assert_eq!(
            normalize_branch(String::from("feature/refs/heads")),
            "feature/refs/heads"
        );
    }
}
