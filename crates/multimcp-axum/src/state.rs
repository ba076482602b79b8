//! Application state for the Axum server.

use std::sync::Arc;

use crate::bootstrap::AxumContext;

/// Shared handler state.
pub type AppState = Arc<AxumContext>;
