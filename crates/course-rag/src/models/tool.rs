use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{AgentError, AgentResult};

/// A tool that can be offered to a model.
///
/// Serializes to the canonical declaration shape
/// `{name, description, input_schema}`, which the tool-certified provider
/// accepts as-is and which the reasoning provider adapts on the way out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// JSON schema of the arguments the tool accepts
    pub input_schema: Value,
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// The declaration as handed to providers
    pub fn to_declaration(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema,
        })
    }
}

/// A model's request to invoke a tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// The arguments exactly as the provider serialized them
    pub arguments: String,
}

impl ToolCall {
    pub fn new<N, A>(name: N, arguments: A) -> Self
    where
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the serialized arguments, which must describe a JSON object.
    /// An empty payload is read as an empty object.
    pub fn parse_arguments(&self) -> AgentResult<Value> {
        if self.arguments.trim().is_empty() {
            return Ok(json!({}));
        }
        let value: Value = serde_json::from_str(&self.arguments).map_err(|e| {
            AgentError::InvalidParameters(format!(
                "Could not interpret arguments for tool '{}': {}",
                self.name, e
            ))
        })?;
        if !value.is_object() {
            return Err(AgentError::InvalidParameters(format!(
                "Arguments for tool '{}' must be a JSON object, got {}",
                self.name, value
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_shape() {
        let tool = Tool::new(
            "search_course_content",
            "Search course materials",
            json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        );
        let declaration = tool.to_declaration();
        assert_eq!(declaration["name"], "search_course_content");
        assert_eq!(declaration["description"], "Search course materials");
        assert_eq!(declaration["input_schema"]["type"], "object");
        assert!(declaration.get("type").is_none());
    }

    #[test]
    fn test_parse_arguments() {
        let call = ToolCall::new("search", r#"{"query": "RAG", "lesson_number": 2}"#);
        let args = call.parse_arguments().unwrap();
        assert_eq!(args["query"], "RAG");
        assert_eq!(args["lesson_number"], 2);

        assert_eq!(ToolCall::new("search", "  ").parse_arguments().unwrap(), json!({}));
    }

    #[test]
    fn test_parse_arguments_rejects_bad_payloads() {
        let broken = ToolCall::new("search", "{not json");
        assert!(matches!(
            broken.parse_arguments(),
            Err(AgentError::InvalidParameters(msg)) if msg.contains("Could not interpret")
        ));

        let scalar = ToolCall::new("search", "42");
        assert!(matches!(
            scalar.parse_arguments(),
            Err(AgentError::InvalidParameters(msg)) if msg.contains("must be a JSON object")
        ));
    }
}
