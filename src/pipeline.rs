//! One invocation, end to end: validate, resolve, list, match, retrieve,
//! extract.

use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    github::GitHubClient,
    inputs::Inputs,
    matching::MatchPolicy,
    resolver::{self, RunFilters, RunQuery},
    selectors::SelectorSet,
    transactions,
    workflow::artifact::{Artifact, format_size},
};

/// The observable result of one successful (or tolerated) invocation.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Whether at least one artifact was matched (and, outside dry run,
    /// retrieved).
    pub found_artifact: bool,
    /// The matched artifacts, in platform order.
    pub artifacts: Vec<Artifact>,
    /// Whether a requested dry run actually had something to report.
    pub dry_run: bool,
}

impl Outcome {
    fn no_match() -> Self {
        Self::default()
    }
}

/// Runs one invocation against the given client.
///
/// Artifacts are processed strictly in the order the platform returned
/// them; there is no concurrency across artifacts or archive entries.
///
/// # Errors
///
/// Returns an error on conflicting selectors, on platform or filesystem
/// failures, and on no-match when the policy is `fail`.
pub async fn execute(client: &GitHubClient, inputs: &Inputs) -> Result<Outcome> {
    info!("repository: {}/{}", inputs.owner, inputs.repo);
    if let Some(name) = &inputs.name {
        info!("artifact name: {name}");
    }
    info!("local path: {}", inputs.path.display());

    let selectors = inputs.selectors();
    selectors.validate()?;

    let workflow = match &inputs.workflow {
        Some(workflow) => workflow.clone(),
        None => derive_workflow(client, inputs, &selectors).await?,
    };
    info!("workflow: {workflow}");
    if let Some(conclusion) = &inputs.workflow_conclusion {
        info!("workflow conclusion: {conclusion}");
    }

    let policy = MatchPolicy::new(inputs.name.as_deref(), inputs.name_is_regexp)?;
    let query = RunQuery {
        owner: inputs.owner.clone(),
        repo: inputs.repo.clone(),
        workflow,
        branch: selectors.branch.clone(),
        event: inputs.event.clone(),
        commit: selectors.commit_sha.clone(),
    };
    let filters = RunFilters {
        run_number: inputs.run_number,
        conclusion: inputs.workflow_conclusion.clone(),
        allow_forks: inputs.allow_forks,
        check_artifacts: inputs.check_artifacts,
        search_artifacts: inputs.search_artifacts,
        ensure_latest: inputs.ensure_latest,
    };

    let Some(run_id) = resolver::resolve_run(client, &selectors, query, &filters, &policy).await?
    else {
        return unresolved(client, inputs).await;
    };

    let artifacts = client
        .run_artifacts(&inputs.owner, &inputs.repo, run_id)
        .await?;

    // One artifact if a name was given, one or more if it is a pattern, all
    // otherwise.
    let matched = if policy.is_all() {
        artifacts
    } else {
        let matched = policy.filter(artifacts.clone());
        if matched.is_empty() {
            if let Some(name) = &inputs.name {
                info!("artifact {name} not found");
            }
            info!("found the following artifacts instead:");
            for artifact in &artifacts {
                info!("    {artifact}");
            }
        }
        matched
    };

    if inputs.dry_run {
        return Ok(dry_run_report(matched));
    }

    if matched.is_empty() {
        inputs.if_no_artifact_found.apply(Error::NoMatchingArtifact)?;
        return Ok(Outcome::no_match());
    }

    for artifact in &matched {
        info!("artifact: {artifact}");
        let archive = transactions::download_artifact(
            client,
            &inputs.owner,
            &inputs.repo,
            artifact,
            &inputs.path,
        )
        .await?;

        if inputs.skip_unpack {
            continue;
        }

        // A named request extracts straight into the destination; otherwise
        // every artifact gets its own subdirectory.
        let destination = if policy.is_all() {
            inputs.path.join(&artifact.name)
        } else {
            inputs.path.clone()
        };
        info!("extracting {}.zip…", artifact.name);
        transactions::extract_archive(&archive, &destination).await?;
    }

    Ok(Outcome {
        found_artifact: true,
        artifacts: matched,
        dry_run: false,
    })
}

/// When no workflow was named, take it from the run this invocation executes
/// in (or the explicitly selected run).
async fn derive_workflow(
    client: &GitHubClient,
    inputs: &Inputs,
    selectors: &SelectorSet,
) -> Result<String> {
    let run_id = selectors
        .run_id
        .or(inputs.ambient_run.as_ref().map(|ambient| ambient.run_id))
        .ok_or(Error::Input {
            key: "workflow",
            message: String::from("not provided and no ambient run to derive it from"),
        })?;
    let run = client
        .workflow_run(&inputs.owner, &inputs.repo, run_id)
        .await?;
    Ok(run.workflow_id.to_string())
}

/// No run survived discovery. A conclusion filter other than `in_progress`
/// means the run genuinely is not there; otherwise the run may simply not
/// have finished yet, so a direct download from the ambient run is attempted
/// before giving up. The two failure kinds stay distinct.
async fn unresolved(client: &GitHubClient, inputs: &Inputs) -> Result<Outcome> {
    if let Some(conclusion) = &inputs.workflow_conclusion {
        if conclusion != "in_progress" {
            inputs.if_no_artifact_found.apply(Error::NoMatchingRun)?;
            return Ok(Outcome::no_match());
        }
    }

    match fallback_download(client, inputs).await {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            debug!("fallback download failed: {err}");
            inputs.if_no_artifact_found.apply(Error::NoMatchingArtifact)?;
            Ok(Outcome::no_match())
        }
    }
}

/// The fallback: fetch the artifact by exact name from the run this
/// invocation itself executes in. The lookup targets the invoking
/// repository, which may differ from the target repository of the
/// invocation; the run id does not exist anywhere else.
async fn fallback_download(client: &GitHubClient, inputs: &Inputs) -> Result<Outcome> {
    let ambient = inputs
        .ambient_run
        .as_ref()
        .ok_or(Error::NoMatchingArtifact)?;
    let name = inputs.name.as_deref().ok_or(Error::NoMatchingArtifact)?;
    info!(
        "no run resolved, trying artifact {name} from the invoking run {} in {}/{}…",
        ambient.run_id, ambient.owner, ambient.repo
    );

    let artifacts = client
        .run_artifacts(&ambient.owner, &ambient.repo, ambient.run_id)
        .await?;
    let artifact = artifacts
        .into_iter()
        .find(|artifact| artifact.name == name)
        .ok_or(Error::NoMatchingArtifact)?;

    let archive = transactions::download_artifact(
        client,
        &ambient.owner,
        &ambient.repo,
        &artifact,
        &inputs.path,
    )
    .await?;
    if !inputs.skip_unpack {
        transactions::extract_archive(&archive, &inputs.path).await?;
    }

    Ok(Outcome {
        found_artifact: true,
        artifacts: vec![artifact],
        dry_run: false,
    })
}

/// Reports what a real invocation would have fetched, without touching the
/// filesystem.
fn dry_run_report(matched: Vec<Artifact>) -> Outcome {
    if matched.is_empty() {
        return Outcome::no_match();
    }

    info!("would fetch {} artifact(s):", matched.len());
    for artifact in &matched {
        info!("    id: {}", artifact.id);
        info!("    name: {}", artifact.name);
        info!("    size: {}", format_size(artifact.size_in_bytes));
    }

    Outcome {
        found_artifact: true,
        artifacts: matched,
        dry_run: true,
    }
}
