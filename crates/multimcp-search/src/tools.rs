//! Tool wrappers around [`crate::search`].

use crate::SearchError;
use crate::search;
use async_trait::async_trait;
use multimcp_core::ToolDescriptor;
use multimcp_protocol::{Tool, ToolError, ToolTable, parse_arguments};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolves the `directory` argument of every tool.
#[derive(Debug, Clone)]
pub struct SearchContext {
    root: PathBuf,
}

impl SearchContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute directories are used as-is; relative ones are joined to the root.
    pub fn resolve(&self, directory: &str) -> PathBuf {
        let path = Path::new(directory);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// The search-server tool table.
pub fn search_tools(root: impl Into<PathBuf>) -> ToolTable {
    let ctx = Arc::new(SearchContext::new(root));
    ToolTable::new()
        .with_tool(SearchInFiles { ctx: ctx.clone() })
        .with_tool(FindFiles { ctx: ctx.clone() })
        .with_tool(FindCodeDefinitions { ctx })
}

async fn run_blocking<F>(work: F) -> Result<String, ToolError>
where
    F: FnOnce() -> Result<String, SearchError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SearchError::Task(e.to_string()))?
        .map_err(ToolError::from)
}

fn directory_property() -> Value {
    json!({ "type": "string", "description": "Directory to search in" })
}

fn file_types_property() -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "description": "File extensions to search in (e.g., [\"ts\", \"js\"])"
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// search_in_files
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchInFilesArgs {
    directory: String,
    pattern: String,
    #[serde(default)]
    file_types: Option<Vec<String>>,
}

struct SearchInFiles {
    ctx: Arc<SearchContext>,
}

#[async_trait]
impl Tool for SearchInFiles {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "search_in_files",
            "Search for a pattern in files within a directory",
            json!({
                "type": "object",
                "properties": {
                    "directory": directory_property(),
                    "pattern": { "type": "string", "description": "Pattern to search for" },
                    "fileTypes": file_types_property()
                },
                "required": ["directory", "pattern"]
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let args: SearchInFilesArgs = parse_arguments(arguments)?;
        let dir = self.ctx.resolve(&args.directory);
        run_blocking(move || {
            search::search_in_files(&dir, &args.pattern, args.file_types.as_deref())
        })
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// find_files
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FindFilesArgs {
    directory: String,
    pattern: String,
}

struct FindFiles {
    ctx: Arc<SearchContext>,
}

#[async_trait]
impl Tool for FindFiles {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "find_files",
            "Find files matching a glob pattern",
            json!({
                "type": "object",
                "properties": {
                    "directory": directory_property(),
                    "pattern": { "type": "string", "description": "Glob pattern (e.g., \"**/*.ts\")" }
                },
                "required": ["directory", "pattern"]
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let args: FindFilesArgs = parse_arguments(arguments)?;
        let dir = self.ctx.resolve(&args.directory);
        run_blocking(move || Ok(search::find_files(&dir, &args.pattern)?.join("\n"))).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// find_code_definitions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindCodeDefinitionsArgs {
    directory: String,
    file_types: Vec<String>,
}

struct FindCodeDefinitions {
    ctx: Arc<SearchContext>,
}

#[async_trait]
impl Tool for FindCodeDefinitions {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            "find_code_definitions",
            "Find code definitions (classes, functions, etc.)",
            json!({
                "type": "object",
                "properties": {
                    "directory": directory_property(),
                    "fileTypes": file_types_property()
                },
                "required": ["directory", "fileTypes"]
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let args: FindCodeDefinitionsArgs = parse_arguments(arguments)?;
        let dir = self.ctx.resolve(&args.directory);
        run_blocking(move || search::find_code_definitions(&dir, &args.file_types)).await
    }
}
