use config::{Config, Environment};
use serde::Deserialize;

use crate::errors::{to_env_var, ConfigError};
use crate::providers::configs::{
    AnthropicProviderConfig, GenerationParams, OpenAiProviderConfig, ProviderConfig,
};
use crate::sanitizer::SanitizerConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_reasoning_model")]
        reasoning_model: String,
        #[serde(default = "default_tool_model")]
        tool_model: String,
    },
    Anthropic {
        #[serde(default = "default_anthropic_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_anthropic_model")]
        model: String,
    },
}

impl ProviderSettings {
    fn api_key(&self) -> &str {
        match self {
            ProviderSettings::OpenAi { api_key, .. } | ProviderSettings::Anthropic { api_key, .. } => {
                api_key
            }
        }
    }

    pub fn into_config(self, params: GenerationParams) -> ProviderConfig {
        match self {
            ProviderSettings::OpenAi {
                host,
                api_key,
                reasoning_model,
                tool_model,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                reasoning_model,
                tool_model,
                params,
            }),
            ProviderSettings::Anthropic {
                host,
                api_key,
                model,
            } => ProviderConfig::Anthropic(AnthropicProviderConfig {
                host,
                api_key,
                model,
                params,
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl From<&GenerationSettings> for GenerationParams {
    fn from(settings: &GenerationSettings) -> Self {
        GenerationParams {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            request_timeout_secs: settings.request_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SanitizerSettings {
    #[serde(default = "default_sanitizer_enabled")]
    pub enabled: bool,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
}

impl Default for SanitizerSettings {
    fn default() -> Self {
        Self {
            enabled: default_sanitizer_enabled(),
            min_length: default_min_length(),
        }
    }
}

/// Process-wide settings, read once from `COURSE_RAG_*` environment variables
#[derive(Debug, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub sanitizer: SanitizerSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("COURSE_RAG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = match config.try_deserialize() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                if let Some(field) = missing_field_path(&err.to_string()) {
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&field),
                    });
                }
                if let config::ConfigError::NotFound(field) = &err {
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    });
                }
                return Err(ConfigError::Other(err));
            }
        };

        if settings.provider.api_key().trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                env_var: to_env_var("provider.api_key"),
            });
        }
        if settings.generation.max_tokens <= 0 {
            return Err(ConfigError::Invalid(format!(
                "{} must be positive",
                to_env_var("generation.max_tokens")
            )));
        }

        Ok(settings)
    }

    pub fn provider_config(self) -> ProviderConfig {
        let params = GenerationParams::from(&self.generation);
        self.provider.into_config(params)
    }

    pub fn sanitizer_config(&self) -> SanitizerConfig {
        SanitizerConfig {
            enabled: self.sanitizer.enabled,
            min_length: self.sanitizer.min_length,
            ..SanitizerConfig::default()
        }
    }
}

/// Dotted settings path for a "missing field `x`" error, optionally qualified
/// by "for key `y`"
fn missing_field_path(error_str: &str) -> Option<String> {
    let field = error_str
        .split("missing field `")
        .nth(1)?
        .split('`')
        .next()?;
    let key = error_str
        .split("for key `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
        .filter(|key| !key.is_empty());

    let path = match (key, field) {
        (Some(key), field) => format!("{}.{}", key, field),
        (None, "provider") => "provider.type".to_string(),
        (None, field @ ("type" | "api_key")) => format!("provider.{}", field),
        (None, field) => field.to_string(),
    };
    Some(path)
}

fn default_openai_host() -> String {
    "https://llm.chutes.ai".to_string()
}

fn default_reasoning_model() -> String {
    "deepseek-ai/DeepSeek-R1".to_string()
}

fn default_tool_model() -> String {
    "deepseek-ai/DeepSeek-V3".to_string()
}

fn default_anthropic_host() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_tokens() -> i32 {
    800
}

fn default_request_timeout_secs() -> u64 {
    600
}

fn default_sanitizer_enabled() -> bool {
    true
}

fn default_min_length() -> usize {
    50
}
