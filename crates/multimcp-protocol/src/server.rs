//! Tool server run loop.

use crate::error::{ProtocolError, TransportError};
use crate::handlers::{EnumerateToolsHandler, InvokeToolHandler};
use crate::router::Router;
use crate::tool::ToolTable;
use crate::transport::{LineReader, LineWriter};
use crate::wire::{RequestKind, RequestMessage, Response, ResponseBody};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// A tool server: a fixed tool table behind the line protocol.
///
/// # Example
///
/// ```ignore
/// let tools = ToolTable::new().with_tool(FindFiles::new(root));
/// ToolServer::new("search-server", "0.1.0", tools, "Search error")
///     .run_stdio()
///     .await?;
/// ```
pub struct ToolServer {
    name: String,
    version: String,
    router: Arc<Router>,
}

impl ToolServer {
    /// Build a server with both request kinds routed to `tools`.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        tools: ToolTable,
        error_prefix: impl Into<String>,
    ) -> Self {
        let tools = Arc::new(tools);
        let mut router = Router::new();
        router.register(
            RequestKind::EnumerateTools,
            Arc::new(EnumerateToolsHandler::new(tools.clone())),
        );
        router.register(
            RequestKind::InvokeTool,
            Arc::new(InvokeToolHandler::new(tools, error_prefix)),
        );

        Self {
            name: name.into(),
            version: version.into(),
            router: Arc::new(router),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Answer one decoded request value.
    pub async fn respond(&self, value: Value) -> Response {
        respond(&self.router, value).await
    }

    /// Serve on stdin/stdout until end of input or Ctrl-C.
    pub async fn run_stdio(&self) -> Result<(), TransportError> {
        info!(server = %self.name, version = %self.version, "Tool server ready on stdio");

        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        let shutdown = async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, shutting down");
            } else {
                std::future::pending::<()>().await;
            }
        };

        self.serve_until(stdin, stdout, shutdown).await?;
        info!(server = %self.name, "Tool server stopped");
        Ok(())
    }

    /// Serve until end of input.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        self.serve_until(reader, writer, std::future::pending()).await
    }

    /// Serve until end of input or until `shutdown` completes.
    ///
    /// Each request runs in its own task, so responses are written in
    /// completion order. On shutdown, reading stops, in-flight requests are
    /// awaited, and the writer is flushed and closed.
    pub async fn serve_until<R, W, S>(
        &self,
        reader: R,
        writer: W,
        shutdown: S,
    ) -> Result<(), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
        S: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Response>();

        let writer_task = tokio::spawn(async move {
            let mut writer = LineWriter::new(writer);
            while let Some(response) = rx.recv().await {
                writer.send(&response).await?;
            }
            writer.close().await
        });

        let mut reader = LineReader::new(reader);
        let mut in_flight = JoinSet::new();
        tokio::pin!(shutdown);

        let read_result = loop {
            let value = tokio::select! {
                received = reader.recv() => match received {
                    Ok(Some(value)) => value,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                },
                () = &mut shutdown => break Ok(()),
            };

            let router = self.router.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                let response = respond(&router, value).await;
                // The writer only goes away after a write failure, which is reported below
                let _ = tx.send(response);
            });

            while let Some(joined) = in_flight.try_join_next() {
                log_join(joined);
            }
        };

        reader.close();
        debug!(pending = in_flight.len(), "Input finished, draining requests");
        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }
        drop(tx);

        let write_result = writer_task
            .await
            .map_err(|e| TransportError::Io(std::io::Error::other(e)))?;

        read_result?;
        write_result
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Request task failed");
    }
}

async fn respond(router: &Router, value: Value) -> Response {
    let id = value.as_object().and_then(|obj| obj.get("id")).cloned();

    let body = match RequestMessage::from_value(value) {
        Ok(request) => match request.request_kind() {
            Ok(kind) => router.dispatch(kind, request).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    let body = body.unwrap_or_else(|e: ProtocolError| {
        debug!(code = e.code(), error = %e, "Request rejected");
        ResponseBody::from(e)
    });

    Response { id, body }
}
