//! Tool wrappers around [`GithubClient`].

use crate::client::{GithubClient, NewIssue, RepoSort};
use crate::http::HttpBackend;
use async_trait::async_trait;
use multimcp_core::ToolDescriptor;
use multimcp_protocol::{Tool, ToolError, ToolTable, parse_arguments};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

const DEFAULT_PER_PAGE: u8 = 10;
const MAX_PER_PAGE: u8 = 100;

/// The github-server tool table.
pub fn github_tools<B: HttpBackend + 'static>(client: Arc<GithubClient<B>>) -> ToolTable {
    ToolTable::new()
        .with_tool(CreateIssue {
            client: client.clone(),
        })
        .with_tool(SearchRepos {
            client: client.clone(),
        })
        .with_tool(ListRepoContents { client })
}

fn pretty(value: &Value) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::Failed(e.to_string()))
}

#[derive(Deserialize)]
struct CreateIssueArgs {
    owner: String,
    repo: String,
    title: String,
    body: String,
    #[serde(default)]
    labels: Option<Vec<String>>,
}

struct CreateIssue<B: HttpBackend> {
    client: Arc<GithubClient<B>>,
}

#[async_trait]
impl<B: HttpBackend + 'static> Tool for CreateIssue<B> {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "create_issue",
            "Create a new issue in a GitHub repository",
            json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "Repository owner" },
                    "repo": { "type": "string", "description": "Repository name" },
                    "title": { "type": "string", "description": "Issue title" },
                    "body": { "type": "string", "description": "Issue body" },
                    "labels": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Issue labels"
                    }
                },
                "required": ["owner", "repo", "title", "body"]
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let args: CreateIssueArgs = parse_arguments(arguments)?;
        let issue = NewIssue {
            owner: args.owner,
            repo: args.repo,
            title: args.title,
            body: args.body,
            labels: args.labels,
        };
        pretty(&self.client.create_issue(&issue).await?)
    }
}

#[derive(Deserialize)]
struct SearchReposArgs {
    query: String,
    #[serde(default)]
    sort: RepoSort,
    #[serde(default)]
    per_page: Option<u64>,
}

struct SearchRepos<B: HttpBackend> {
    client: Arc<GithubClient<B>>,
}

#[async_trait]
impl<B: HttpBackend + 'static> Tool for SearchRepos<B> {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "search_repos",
            "Search for GitHub repositories",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query" },
                    "sort": {
                        "type": "string",
                        "enum": ["stars", "forks", "updated"],
                        "description": "Sort criteria"
                    },
                    "per_page": {
                        "type": "number",
                        "minimum": 1,
                        "maximum": MAX_PER_PAGE,
                        "description": "Results per page"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let args: SearchReposArgs = parse_arguments(arguments)?;
        let per_page = match args.per_page {
            None => DEFAULT_PER_PAGE,
            Some(n) => u8::try_from(n)
                .ok()
                .filter(|n| (1..=MAX_PER_PAGE).contains(n))
                .ok_or_else(|| {
                    ToolError::InvalidArguments(format!(
                        "per_page must be between 1 and {MAX_PER_PAGE}, got {n}"
                    ))
                })?,
        };
        pretty(&self.client.search_repos(&args.query, args.sort, per_page).await?)
    }
}

#[derive(Deserialize)]
struct ListRepoContentsArgs {
    owner: String,
    repo: String,
    #[serde(default)]
    path: String,
}

struct ListRepoContents<B: HttpBackend> {
    client: Arc<GithubClient<B>>,
}

#[async_trait]
impl<B: HttpBackend + 'static> Tool for ListRepoContents<B> {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "list_repo_contents",
            "List contents of a GitHub repository",
            json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "Repository owner" },
                    "repo": { "type": "string", "description": "Repository name" },
                    "path": { "type": "string", "description": "Path within repository (optional)" }
                },
                "required": ["owner", "repo"]
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let args: ListRepoContentsArgs = parse_arguments(arguments)?;
        pretty(
            &self
                .client
                .list_repo_contents(&args.owner, &args.repo, &args.path)
                .await?,
        )
    }
}
