#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod tools;

pub use client::{DefaultGithubClient, GithubClient, NewIssue, RepoSort};
pub use config::GithubClientConfig;
pub use error::{GithubError, GithubResult};
pub use http::{HttpBackend, ReqwestBackend};
pub use tools::github_tools;

/// Prefix of every failed tool result text.
pub const ERROR_PREFIX: &str = "GitHub API error";
