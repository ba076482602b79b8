//! Handlers for the two request kinds.

use crate::envelope::ToolResult;
use crate::error::ProtocolError;
use crate::router::RequestHandler;
use crate::tool::ToolTable;
use crate::wire::{RequestMessage, ResponseBody, ToolList};
use async_trait::async_trait;
use futures_util::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Answers enumerate-tools with every descriptor in the table.
pub struct EnumerateToolsHandler {
    tools: Arc<ToolTable>,
}

impl EnumerateToolsHandler {
    pub const fn new(tools: Arc<ToolTable>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl RequestHandler for EnumerateToolsHandler {
    async fn handle(&self, _request: RequestMessage) -> Result<ResponseBody, ProtocolError> {
        Ok(ResponseBody::Tools(ToolList {
            tools: self.tools.descriptors(),
        }))
    }
}

/// Looks up and runs one tool.
///
/// Tool failures become an `isError` envelope whose text starts with the
/// server's error prefix, e.g. `Search error: ...`. A panicking tool is
/// reported the same way.
pub struct InvokeToolHandler {
    tools: Arc<ToolTable>,
    error_prefix: String,
}

impl InvokeToolHandler {
    pub fn new(tools: Arc<ToolTable>, error_prefix: impl Into<String>) -> Self {
        Self {
            tools,
            error_prefix: error_prefix.into(),
        }
    }
}

#[async_trait]
impl RequestHandler for InvokeToolHandler {
    async fn handle(&self, mut request: RequestMessage) -> Result<ResponseBody, ProtocolError> {
        let name = match request.params.remove("tool") {
            Some(Value::String(name)) => name,
            _ => {
                return Err(ProtocolError::InvalidRequest(
                    "invoke-tool requires a string \"tool\" field".to_string(),
                ));
            }
        };
        let arguments = request.params.remove("arguments").unwrap_or(Value::Null);

        let tool = self
            .tools
            .get(&name)
            .ok_or_else(|| ProtocolError::MethodNotFound(format!("Unknown tool: {name}")))?;

        debug!(tool = %name, "Invoking tool");
        let result = match AssertUnwindSafe(tool.call(arguments)).catch_unwind().await {
            Ok(Ok(text)) => ToolResult::text(text),
            Ok(Err(e)) => {
                warn!(tool = %name, error = %e, "Tool failed");
                ToolResult::error(format!("{}: {e}", self.error_prefix))
            }
            Err(_) => {
                error!(tool = %name, "Tool panicked");
                ToolResult::error(format!("{}: tool panicked", self.error_prefix))
            }
        };
        Ok(ResponseBody::Result(result))
    }
}
