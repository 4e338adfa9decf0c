//! The GitHub REST API capability.
//!
//! Constructed once at process start and passed into the resolver and the
//! transactions; nothing in the crate reaches for a global client handle.

use futures::Stream;
use reqwest::{RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use tokio_util::bytes::Bytes;
use tracing::{debug, error};

use crate::{
    error::{Error, Result},
    resolver::RunQuery,
    workflow::{
        PullRequest, WorkflowRun, WorkflowRuns,
        artifact::{Artifact, Artifacts},
    },
};

/// The page size used for every paginated listing.
pub const PER_PAGE: usize = 100;

/// An authenticated GitHub REST API client bound to one base URL.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Creates a client for the given token and API base URL
    /// (`https://api.github.com` outside of tests and GHES).
    pub fn new<T, U>(token: T, base_url: U) -> Self
    where
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Builds a request for GitHub REST API.
    fn request_builder(&self, url: &str) -> RequestBuilder {
        self.http
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "download-artifact/0.2")
    }

    async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.request_builder(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            error!("request to {url} failed: {status}");
            return Err(Error::Api {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response.json().await?)
    }

    /// Fetches a single workflow run by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or answers with a non-success
    /// status.
    pub async fn workflow_run(&self, owner: &str, repo: &str, run_id: u64) -> Result<WorkflowRun> {
        let url = format!(
            "{}/repos/{owner}/{repo}/actions/runs/{run_id}",
            self.base_url
        );
        debug!("fetching workflow run from {url}…");
        self.get_json(&url, &[]).await
    }

    /// Fetches a pull request, to resolve it to its head commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or answers with a non-success
    /// status.
    pub async fn pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}", self.base_url);
        debug!("fetching pull request from {url}…");
        self.get_json(&url, &[]).await
    }

    /// Fetches one page of the run listing for a workflow, filtered by the
    /// optional parts of the query. Platform order is preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or answers with a non-success
    /// status.
    pub async fn workflow_runs_page(&self, query: &RunQuery, page: u32) -> Result<Vec<WorkflowRun>> {
        let url = format!(
            "{}/repos/{}/{}/actions/workflows/{}/runs",
            self.base_url, query.owner, query.repo, query.workflow
        );

        let mut params = vec![
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(branch) = &query.branch {
            params.push(("branch", branch.clone()));
        }
        if let Some(event) = &query.event {
            params.push(("event", event.clone()));
        }
        if let Some(commit) = &query.commit {
            params.push(("head_sha", commit.clone()));
        }

        debug!("fetching workflow runs page {page} from {url}…");
        let runs: WorkflowRuns = self.get_json(&url, &params).await?;
        Ok(runs.workflow_runs)
    }

    /// Fetches every artifact of a run, walking all pages. Platform order is
    /// preserved; the result is not re-sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or answers with a
    /// non-success status.
    pub async fn run_artifacts(&self, owner: &str, repo: &str, run_id: u64) -> Result<Vec<Artifact>> {
        let url = format!(
            "{}/repos/{owner}/{repo}/actions/runs/{run_id}/artifacts",
            self.base_url
        );

        let mut all = Vec::new();
        let mut page = 1u32;
        loop {
            debug!("fetching artifacts page {page} from {url}…");
            let params = [
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let body: Artifacts = self.get_json(&url, &params).await?;
            let fetched = body.artifacts.len();
            all.extend(body.artifacts);

            if fetched < PER_PAGE || all.len() as u64 >= body.total_count {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    /// Requests the zip download of an artifact, following the platform's
    /// redirect to the signed archive URL, and returns the body as a byte
    /// stream. Memory use is bounded to one buffer window regardless of
    /// artifact size.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or answers with a non-success
    /// status, notably `410 Gone` for expired artifacts.
    pub async fn download_artifact(
        &self,
        owner: &str,
        repo: &str,
        artifact_id: u64,
    ) -> Result<impl Stream<Item = reqwest::Result<Bytes>> + use<>> {
        let url = format!(
            "{}/repos/{owner}/{repo}/actions/artifacts/{artifact_id}/zip",
            self.base_url
        );
        debug!("requesting download from {url}…");

        let response = self.request_builder(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::GONE {
                error!("failed to request download: artifact expired or removed");
            } else {
                error!("failed to request download from {url}: {status}");
            }
            return Err(Error::Api {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.bytes_stream())
    }
}
