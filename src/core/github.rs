//! Branch source backed by the GitHub REST API, using blocking requests.

use crate::core::source::{BranchRecord, BranchSource};
use crate::utils::error::{Result, SweepError};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Method, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
const BRANCHES_PER_PAGE: u32 = 100;
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<Signature>,
    author: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

pub struct GithubSource {
    client: Client,
    base_url: Url,
    owner: String,
    repo: String,
    token: Option<String>,
}

impl GithubSource {
    /// `repository` is `owner/name`; `token` is sent as a bearer token when present.
    pub fn new(api_url: &str, repository: &str, token: Option<String>) -> Result<Self> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| {
                SweepError::config_error(format!(
                    "repository '{}' must have the form owner/name",
                    repository
                ))
            })?;

        let base_url = Url::parse(api_url).map_err(|e| {
            SweepError::config_error(format!("Invalid API URL '{}': {}", api_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SweepError::config_error(format!(
                "Invalid API URL '{}'",
                api_url
            )));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("branch-sweep/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SweepError::api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            owner: owner.to_string(),
            repo: repo.to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Builds `{base}/repos/{owner}/{repo}/{segments...}` with each segment
    /// percent-encoded, so branch names containing `/` map to nested segments.
    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str()])
                .extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        match self.token {
            Some(ref token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder, context: &str) -> Result<Response> {
        let response = builder
            .send()
            .map_err(|e| SweepError::api(format!("{}: {}", context, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorResponse>()
            .map(|body| body.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());

        Err(SweepError::api_status(
            status.as_u16(),
            format!("{}: {}", context, detail),
        ))
    }

    fn first_branches_page(&self) -> Url {
        let mut url = self.endpoint(["branches"]);
        url.query_pairs_mut()
            .append_pair("per_page", &BRANCHES_PER_PAGE.to_string())
            .append_pair("page", "1");
        url
    }
}

impl BranchSource for GithubSource {
    fn default_branch_name(&self) -> Result<String> {
        let url = self.endpoint(std::iter::empty());
        let response = self.send(
            self.request(Method::GET, url),
            "Failed to fetch repository",
        )?;
        let repository: RepositoryResponse = response.json()?;
        Ok(repository.default_branch)
    }

    fn list_all_branches(&self) -> Result<Vec<BranchRecord>> {
        let mut branches = Vec::new();
        let mut next = Some(self.first_branches_page());
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let response = self.send(self.request(Method::GET, url), "Failed to list branches")?;
            let next_link = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page_url);

            let page: Vec<BranchResponse> = response.json()?;
            pages += 1;
            let page_was_empty = page.is_empty();
            branches.extend(page.into_iter().map(|branch| BranchRecord::new(branch.name)));

            if !page_was_empty {
                next = next_link;
            }
        }

        debug!(count = branches.len(), pages, "listed remote branches");
        Ok(branches)
    }

    fn last_commit_timestamp(&self, branch: &str) -> Result<DateTime<Utc>> {
        let url = self.endpoint(std::iter::once("commits").chain(branch.split('/')));
        let response = self.send(
            self.request(Method::GET, url),
            &format!("Failed to fetch last commit of {}", branch),
        )?;
        let commit: CommitResponse = response.json()?;

        let detail = commit.commit;
        detail
            .committer
            .and_then(|signature| signature.date)
            .or_else(|| detail.author.and_then(|signature| signature.date))
            .ok_or_else(|| SweepError::api(format!("Commit of {} has no date", branch)))
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        let url = self.endpoint(["git", "refs", "heads"].into_iter().chain(branch.split('/')));
        self.send(
            self.request(Method::DELETE, url),
            &format!("Failed to delete {}", branch),
        )?;
        Ok(())
    }
}

/// Extracts the `rel="next"` target from an RFC 8288 `Link` header.
fn next_page_url(header: &str) -> Option<Url> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}
