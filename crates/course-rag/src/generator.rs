use serde_json::Value;
use tracing::{debug, error, warn};

use crate::configuration::Settings;
use crate::errors::{ConfigError, GenerateError};
use crate::models::message::{Message, MessageContent, ToolRequest};
use crate::prompt::{system_prompt, SYSTEM_PROMPT};
use crate::providers::base::Provider;
use crate::providers::factory::get_provider;
use crate::sanitizer::ResponseSanitizer;
use crate::tool::{ToolExecutor, ToolRegistry};

/// What the user sees when generation fails outright
pub const APOLOGY: &str = "Sorry, I ran into a technical problem. Please try again later.";

/// One question to answer. Borrowed for the duration of a single call.
#[derive(Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub query: &'a str,
    /// Prior conversation, already formatted by the caller
    pub history: Option<&'a str>,
    /// Tool declarations in either wire format
    pub tools: Option<&'a [Value]>,
    pub executor: Option<&'a dyn ToolExecutor>,
}

impl<'a> GenerationRequest<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            history: None,
            tools: None,
            executor: None,
        }
    }

    pub fn with_history(mut self, history: &'a str) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_tools(mut self, tools: &'a [Value]) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_executor(mut self, executor: &'a dyn ToolExecutor) -> Self {
        self.executor = Some(executor);
        self
    }
}

/// Turns a question into an answer: one provider call, at most one round of
/// tool execution, and one tool-free finalize call.
///
/// Holds no per-request state, so a single instance can serve concurrent
/// requests.
pub struct ResponseGenerator {
    provider: Box<dyn Provider>,
    sanitizer: ResponseSanitizer,
    system_prompt: String,
}

impl ResponseGenerator {
    pub fn new(provider: Box<dyn Provider>, sanitizer: ResponseSanitizer) -> Self {
        Self {
            provider,
            sanitizer,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Build the provider and sanitizer described by `settings`
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let sanitizer = ResponseSanitizer::new(settings.sanitizer_config())?;
        let provider = get_provider(settings.provider_config())?;
        Ok(Self::new(provider, sanitizer))
    }

    /// Replace the base instructions sent as the system prompt
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Answer the request. Never fails: provider errors become an apology.
    pub async fn generate(&self, request: &GenerationRequest<'_>) -> String {
        match self.try_generate(request).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "response generation failed");
                APOLOGY.to_string()
            }
        }
    }

    /// Answer with every tool the registry offers
    pub async fn generate_with_registry<R: ToolRegistry>(
        &self,
        query: &str,
        history: Option<&str>,
        registry: &R,
    ) -> String {
        let tools = registry.tool_definitions();
        let request = GenerationRequest {
            query,
            history,
            tools: Some(&tools),
            executor: Some(registry),
        };
        self.generate(&request).await
    }

    /// Like [`generate`](Self::generate) but surfaces provider failures
    pub async fn try_generate(&self, request: &GenerationRequest<'_>) -> Result<String, GenerateError> {
        let system = system_prompt(&self.system_prompt, request.history);
        let tools = request.tools.unwrap_or_default();
        let mut messages = vec![Message::user().with_text(request.query)];

        let (response, usage) = self.provider.complete(&system, &messages, tools).await?;
        debug!(?usage, "initial completion");

        let executor = match request.executor {
            Some(executor) if response.has_tool_requests() => executor,
            _ => return self.finish(response.text()),
        };

        let results = run_tools(executor, &response.tool_requests()).await;
        messages.push(response);
        messages.push(results);

        // tools are withheld so the model has to answer; any tool requests it
        // still makes are ignored
        match self.provider.complete(&system, &messages, &[]).await {
            Ok((final_response, usage)) => {
                debug!(?usage, "final completion");
                self.finish(final_response.text())
            }
            Err(e) => {
                error!(error = %e, "final completion after tool use failed");
                Ok(format!("Error generating final response: {}", e))
            }
        }
    }

    fn finish(&self, text: String) -> Result<String, GenerateError> {
        if text.trim().is_empty() {
            return Err(GenerateError::EmptyResponse);
        }
        if self.provider.emits_reasoning() {
            Ok(self.sanitizer.sanitize(&text))
        } else {
            Ok(text)
        }
    }
}

/// Execute every request in order and collect one result each into a single
/// user message
async fn run_tools(executor: &dyn ToolExecutor, requests: &[&ToolRequest]) -> Message {
    let mut results = Message::user();
    for request in requests {
        results = results.with_content(dispatch(executor, request).await);
    }
    results
}

async fn dispatch(executor: &dyn ToolExecutor, request: &ToolRequest) -> MessageContent {
    let call = &request.tool_call;
    let outcome = match call.parse_arguments() {
        Ok(arguments) => executor.execute_tool(&call.name, arguments).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(output) => MessageContent::tool_response(&request.id, output, false),
        Err(e) => {
            warn!(tool = %call.name, id = %request.id, error = %e, "tool call failed");
            MessageContent::tool_response(&request.id, format!("Tool execution error: {}", e), true)
        }
    }
}
