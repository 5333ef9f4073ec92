use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use super::base::{Provider, Usage};
use super::configs::AnthropicProviderConfig;
use super::utils::role_name;
use crate::errors::ProviderError;
use crate::models::message::{Message, MessageContent};
use crate::models::tool::ToolCall;

pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Anthropic messages endpoint. Its tool declarations are the canonical
/// format, so they are sent exactly as received.
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.params.request_timeout_secs))
            .build()?;
        info!(host = %config.host, model = %config.model, "Anthropic provider ready");

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let usage = &data["usage"];
        let input_tokens = usage["input_tokens"].as_i64().map(|v| v as i32);
        let output_tokens = usage["output_tokens"].as_i64().map(|v| v as i32);
        let total_tokens = match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        };
        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> Result<Value, ProviderError> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() => {
                Err(ProviderError::Server(status))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::Request { status, body })
            }
        }
    }
}

/// Convert internal messages to Anthropic's message list.
///
/// A message holding a single text block is sent as a plain string, anything
/// else as a list of content blocks. Tool responses stay inside the user
/// message that carries them, as one `tool_result` block each.
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .filter(|message| !message.content.is_empty())
        .map(|message| {
            let content = match message.content.as_slice() {
                [MessageContent::Text(text)] => json!(text.text),
                blocks => Value::Array(blocks.iter().map(content_to_anthropic_block).collect()),
            };
            json!({
                "role": role_name(message.role),
                "content": content,
            })
        })
        .collect()
}

fn content_to_anthropic_block(content: &MessageContent) -> Value {
    match content {
        MessageContent::Text(text) => json!({"type": "text", "text": text.text}),
        MessageContent::ToolRequest(request) => json!({
            "type": "tool_use",
            "id": request.id,
            "name": request.tool_call.name,
            "input": request.tool_call.parse_arguments().unwrap_or_else(|_| json!({})),
        }),
        MessageContent::ToolResponse(response) => {
            let mut block = json!({
                "type": "tool_result",
                "tool_use_id": response.id,
                "content": response.content,
            });
            if response.is_error {
                block["is_error"] = json!(true);
            }
            block
        }
    }
}

/// Convert Anthropic's content block list to an internal assistant message
pub fn anthropic_response_to_message(response: &Value) -> Result<Message, ProviderError> {
    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::MalformedResponse("no content block list".to_string()))?;

    let mut message = Message::assistant();
    for block in blocks {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                let text = block["text"].as_str().unwrap_or_default();
                message = message.with_text(text);
            }
            Some("tool_use") => {
                let id = block["id"].as_str().unwrap_or_default();
                let name = block["name"].as_str().unwrap_or_default();
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                message = message.with_tool_request(id, ToolCall::new(name, input.to_string()));
            }
            _ => {}
        }
    }

    Ok(message)
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Value],
    ) -> Result<(Message, Usage), ProviderError> {
        let mut payload = json!({
            "model": self.config.model,
            "system": system,
            "messages": messages_to_anthropic_spec(messages),
            "temperature": self.config.params.temperature,
            "max_tokens": self.config.params.max_tokens,
        });

        if !tools.is_empty() {
            payload["tools"] = json!(tools);
            payload["tool_choice"] = json!({"type": "auto"});
        }

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(ProviderError::Api(error.to_string()));
        }

        let message = anthropic_response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }
}
