use serde_json::{json, Map, Value};
use tracing::debug;

use crate::errors::ProviderError;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::ToolCall;

/// Convert internal Message format to OpenAI's API message specification.
///
/// Tool responses are lifted out of their carrying message into one
/// `role: "tool"` message each, in order.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = Map::new();
        converted.insert("role".to_string(), json!(message.role));

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        let mut output = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(t) => text.push_str(&t.text),
                MessageContent::ToolRequest(request) => {
                    tool_calls.push(json!({
                        "id": request.id,
                        "type": "function",
                        "function": {
                            "name": request.tool_call.name,
                            "arguments": request.tool_call.arguments,
                        }
                    }));
                }
                MessageContent::ToolResponse(response) => {
                    output.push(json!({
                        "role": "tool",
                        "content": response.content,
                        "tool_call_id": response.id
                    }));
                }
            }
        }

        if !tool_calls.is_empty() {
            // some compatible servers reject a null content next to tool_calls
            converted.insert("content".to_string(), json!(text));
            converted.insert("tool_calls".to_string(), json!(tool_calls));
        } else if !text.is_empty() || output.is_empty() {
            // a turn without tool results is always sent, even with empty text
            converted.insert("content".to_string(), json!(text));
        }

        if converted.contains_key("content") {
            output.insert(0, Value::Object(converted));
        }
        messages_spec.extend(output);
    }

    messages_spec
}

fn empty_object_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}

/// Whether a declaration list is already in the nested function format
pub fn is_openai_tool_spec(tools: &[Value]) -> bool {
    tools
        .first()
        .and_then(Value::as_object)
        .and_then(|first| first.get("type"))
        .and_then(Value::as_str)
        == Some("function")
}

/// Convert tool declarations to OpenAI's nested function specification.
///
/// Lists that already start with a `{"type": "function"}` entry are returned
/// unchanged. Otherwise every flat `{name, description, input_schema}`
/// declaration is nested, and declarations without a name are skipped.
pub fn tools_to_openai_spec(tools: &[Value]) -> Vec<Value> {
    if is_openai_tool_spec(tools) {
        return tools.to_vec();
    }

    let mut result = Vec::with_capacity(tools.len());
    for tool in tools {
        let Some(name) = tool.get("name").and_then(Value::as_str) else {
            debug!(declaration = %tool, "skipping tool declaration without a name");
            continue;
        };

        let description = tool
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let parameters = tool
            .get("input_schema")
            .cloned()
            .unwrap_or_else(empty_object_schema);

        result.push(json!({
            "type": "function",
            "function": {
                "name": name,
                "description": description,
                "parameters": parameters,
            }
        }));
    }

    result
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> Result<Message, ProviderError> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| ProviderError::MalformedResponse("no choices[0].message".to_string()))?;

    let mut message = Message::assistant();

    if let Some(text) = original.get("content").and_then(Value::as_str) {
        if !text.is_empty() {
            message = message.with_text(text);
        }
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(Value::as_array) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default();
            let name = tool_call["function"]["name"].as_str().unwrap_or_default();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();
            message = message.with_tool_request(id, ToolCall::new(name, arguments));
        }
    }

    Ok(message)
}

pub fn check_openai_context_length_error(error: &Value) -> Option<ProviderError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ProviderError::ContextLengthExceeded(message))
    } else {
        None
    }
}

/// Role name on the wire for either provider
pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}
