// Unified enum to wrap the configuration of each provider
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Anthropic(AnthropicProviderConfig),
}

/// Shared sampling and transport parameters, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: i32,
    pub request_timeout_secs: u64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 800,
            request_timeout_secs: 600,
        }
    }
}

/// OpenAI-compatible endpoint serving both a reasoning and a tool-capable model
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub reasoning_model: String,
    pub tool_model: String,
    pub params: GenerationParams,
}

#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub params: GenerationParams,
}
