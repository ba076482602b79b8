//! Request and response bodies for the `/api` routes.

use multimcp_core::domain::{ServerConfig, ServerConfigPatch};
use serde::{Deserialize, Serialize};

/// Envelope wrapping every `/api` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success with no payload.
    pub const fn done() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

/// Body of `POST /api/servers`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddServerRequest {
    pub name: String,
    pub config: ServerConfig,
}

/// Body of `PUT /api/servers/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateServerRequest {
    pub config: ServerConfigPatch,
}

/// Result of a restore.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub name: String,
    pub restored: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_omits_absent_fields() {
        let ok = serde_json::to_value(ApiResponse::ok(vec!["a"])).unwrap();
        assert_eq!(ok, json!({"success": true, "data": ["a"]}));

        let failed = serde_json::to_value(ApiResponse::<()>::failure("nope")).unwrap();
        assert_eq!(failed, json!({"success": false, "error": "nope"}));

        let done = serde_json::to_value(ApiResponse::done()).unwrap();
        assert_eq!(done, json!({"success": true}));
    }

    #[test]
    fn test_update_request_accepts_partial_config() {
        let req: UpdateServerRequest =
            serde_json::from_value(json!({"config": {"disabled": true}})).unwrap();
        assert_eq!(req.config.disabled, Some(true));
        assert!(req.config.command.is_none());
    }
}
