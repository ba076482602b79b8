//! GitHub REST client.

use crate::config::GithubClientConfig;
use crate::error::{GithubError, GithubResult};
use crate::http::{HttpBackend, ReqwestBackend};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use url::Url;

/// Production client type.
pub type DefaultGithubClient = GithubClient<ReqwestBackend>;

/// Sort order for repository search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoSort {
    #[default]
    Stars,
    Forks,
    Updated,
}

impl RepoSort {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stars => "stars",
            Self::Forks => "forks",
            Self::Updated => "updated",
        }
    }
}

impl fmt::Display for RepoSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub owner: String,
    pub repo: String,
    pub title: String,
    pub body: String,
    pub labels: Option<Vec<String>>,
}

/// Thin client over the three endpoints the tools need.
///
/// Responses are returned as raw JSON; callers decide how to present them.
pub struct GithubClient<B: HttpBackend> {
    backend: B,
    base_url: Url,
}

impl GithubClient<ReqwestBackend> {
    /// Create a production client from configuration.
    pub fn from_config(config: &GithubClientConfig) -> GithubResult<Self> {
        let backend = ReqwestBackend::new(config)?;
        Self::with_backend(backend, &config.base_url)
    }
}

impl<B: HttpBackend> GithubClient<B> {
    /// Create a client with a specific backend.
    pub fn with_backend(backend: B, base_url: &str) -> GithubResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GithubError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { backend, base_url })
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> GithubResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GithubError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `POST /repos/{owner}/{repo}/issues`
    pub async fn create_issue(&self, issue: &NewIssue) -> GithubResult<Value> {
        let url = self.endpoint(["repos", issue.owner.as_str(), issue.repo.as_str(), "issues"])?;

        let mut body = json!({ "title": issue.title, "body": issue.body });
        if let Some(labels) = &issue.labels {
            body["labels"] = json!(labels);
        }
        self.backend.post_json(&url, &body).await
    }

    /// `GET /search/repositories`
    pub async fn search_repos(&self, query: &str, sort: RepoSort, per_page: u8) -> GithubResult<Value> {
        let mut url = self.endpoint(["search", "repositories"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("sort", sort.as_str())
            .append_pair("per_page", &per_page.to_string());
        self.backend.get_json(&url).await
    }

    /// `GET /repos/{owner}/{repo}/contents/{path}`. An empty path lists the root.
    pub async fn list_repo_contents(&self, owner: &str, repo: &str, path: &str) -> GithubResult<Value> {
        let segments = ["repos", owner, repo, "contents"]
            .into_iter()
            .chain(path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(segments)?;
        self.backend.get_json(&url).await
    }
}
