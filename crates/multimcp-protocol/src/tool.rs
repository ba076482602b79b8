//! Tool trait and per-server tool table.

use crate::error::ToolError;
use async_trait::async_trait;
use multimcp_core::ToolDescriptor;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// One callable tool.
///
/// Implementations decode the arguments they need with [`parse_arguments`]
/// and return the text placed in the result envelope.
#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    async fn call(&self, arguments: Value) -> Result<String, ToolError>;
}

/// Decode tool arguments. A missing (`null`) argument object reads as `{}`.
pub fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Fixed set of tools served by one tool server, in registration order.
#[derive(Default, Clone)]
pub struct ToolTable {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A tool with the same name replaces the earlier one in place.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        let tool: Arc<dyn Tool> = Arc::new(tool);
        let name = tool.descriptor().name;
        match self.tools.iter().position(|t| t.descriptor().name == name) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|tool| tool.descriptor().name == name)
            .cloned()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|tool| tool.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("echo", self.0, json!({ "type": "object" }))
        }

        async fn call(&self, arguments: Value) -> Result<String, ToolError> {
            Ok(arguments.to_string())
        }
    }

    #[derive(Debug, Deserialize)]
    struct Args {
        #[serde(default)]
        name: Option<String>,
    }

    #[test]
    fn test_same_name_replaces() {
        let table = ToolTable::new().with_tool(Echo("one")).with_tool(Echo("two"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.descriptors()[0].description, "two");
        assert!(table.get("missing").is_none());
    }

    #[test]
    fn test_parse_arguments() {
        let args: Args = parse_arguments(Value::Null).unwrap();
        assert!(args.name.is_none());

        let err = parse_arguments::<Args>(json!({ "name": 5 })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
