use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ProviderError;
use crate::models::message::Message;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for model providers (OpenAI-compatible, Anthropic)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message.
    ///
    /// `tools` are declarations as handed out by the tool registry; each
    /// provider adapts them to its own wire format. An empty slice means the
    /// call is made without tools.
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Value],
    ) -> Result<(Message, Usage), ProviderError>;

    /// Whether the provider's text may carry leaked reasoning that needs
    /// sanitizing before it reaches the user
    fn emits_reasoning(&self) -> bool {
        false
    }
}
