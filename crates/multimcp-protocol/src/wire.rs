//! Wire message types.
//!
//! Requests are decoded in two steps: the transport yields a JSON value, then
//! [`RequestMessage::from_value`] checks the shape and [`RequestKind`] names
//! the handler. Keeping the kind as a string until dispatch lets an unknown
//! kind be answered with `METHOD_NOT_FOUND` instead of being dropped.

use crate::envelope::ToolResult;
use crate::error::ProtocolError;
use multimcp_core::ToolDescriptor;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The closed set of request kinds a tool server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    EnumerateTools,
    InvokeTool,
}

impl RequestKind {
    pub const ALL: [Self; 2] = [Self::EnumerateTools, Self::InvokeTool];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnumerateTools => "enumerate-tools",
            Self::InvokeTool => "invoke-tool",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProtocolError::MethodNotFound(format!("Unknown request kind: {s}")))
    }
}

/// A decoded request line.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestMessage {
    pub id: Option<Value>,
    pub kind: String,
    /// Remaining fields of the request object.
    pub params: Map<String, Value>,
}

impl RequestMessage {
    /// Check that `value` is an object with a string `kind`.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let Value::Object(mut params) = value else {
            return Err(ProtocolError::InvalidRequest(
                "request must be a JSON object".to_string(),
            ));
        };

        let id = params.remove("id");
        let kind = match params.remove("kind") {
            Some(Value::String(kind)) => kind,
            Some(_) => {
                return Err(ProtocolError::InvalidRequest(
                    "\"kind\" must be a string".to_string(),
                ));
            }
            None => {
                return Err(ProtocolError::InvalidRequest(
                    "missing \"kind\" field".to_string(),
                ));
            }
        };

        Ok(Self { id, kind, params })
    }

    pub fn request_kind(&self) -> Result<RequestKind, ProtocolError> {
        self.kind.parse()
    }
}

/// Answer to enumerate-tools.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolList {
    pub tools: Vec<ToolDescriptor>,
}

/// Protocol-level error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    pub code: &'static str,
    pub message: String,
}

impl From<&ProtocolError> for ErrorObject {
    fn from(err: &ProtocolError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Response payload, without the correlation id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Tools(ToolList),
    Result(ToolResult),
    Error { error: ErrorObject },
}

impl From<ProtocolError> for ResponseBody {
    fn from(err: ProtocolError) -> Self {
        Self::Error {
            error: ErrorObject::from(&err),
        }
    }
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_kind_names() {
        assert_eq!(
            "enumerate-tools".parse::<RequestKind>(),
            Ok(RequestKind::EnumerateTools)
        );
        assert_eq!(
            "invoke-tool".parse::<RequestKind>(),
            Ok(RequestKind::InvokeTool)
        );
        let err = "tools/list".parse::<RequestKind>().unwrap_err();
        assert_eq!(err.code(), "METHOD_NOT_FOUND");
    }

    #[test]
    fn test_from_value_splits_fields() {
        let message = RequestMessage::from_value(json!({
            "id": 7,
            "kind": "invoke-tool",
            "tool": "find_files",
            "arguments": {}
        }))
        .unwrap();

        assert_eq!(message.id, Some(json!(7)));
        assert_eq!(message.kind, "invoke-tool");
        assert_eq!(message.params["tool"], json!("find_files"));
        assert!(!message.params.contains_key("kind"));
    }

    #[test]
    fn test_from_value_rejects_bad_shapes() {
        for value in [json!([1, 2]), json!({ "id": 1 }), json!({ "kind": 3 })] {
            let err = RequestMessage::from_value(value).unwrap_err();
            assert_eq!(err.code(), "INVALID_REQUEST");
        }
    }

    #[test]
    fn test_response_serialization() {
        let ok = Response {
            id: Some(json!("a")),
            body: ResponseBody::Result(ToolResult::text("hi")),
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "id": "a", "content": [{ "type": "text", "text": "hi" }] })
        );

        let err = Response {
            id: None,
            body: ProtocolError::MethodNotFound("Unknown tool: x".to_string()).into(),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "error": { "code": "METHOD_NOT_FOUND", "message": "Unknown tool: x" } })
        );
    }
}
