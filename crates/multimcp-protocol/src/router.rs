//! Request routing.

use crate::error::ProtocolError;
use crate::wire::{RequestKind, RequestMessage, ResponseBody};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Handles one kind of request.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: RequestMessage) -> Result<ResponseBody, ProtocolError>;
}

/// Table from request kind to handler. Filled once at startup.
#[derive(Default, Clone)]
pub struct Router {
    handlers: HashMap<RequestKind, Arc<dyn RequestHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`, replacing and returning any prior handler.
    pub fn register(
        &mut self,
        kind: RequestKind,
        handler: Arc<dyn RequestHandler>,
    ) -> Option<Arc<dyn RequestHandler>> {
        self.handlers.insert(kind, handler)
    }

    pub fn has_handler(&self, kind: RequestKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Run the handler registered for `kind` and return its result unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MethodNotFound` when nothing is registered for `kind`.
    pub async fn dispatch(
        &self,
        kind: RequestKind,
        request: RequestMessage,
    ) -> Result<ResponseBody, ProtocolError> {
        let handler = self
            .handlers
            .get(&kind)
            .ok_or_else(|| ProtocolError::MethodNotFound(format!("No handler for {kind}")))?;
        handler.handle(request).await
    }
}
