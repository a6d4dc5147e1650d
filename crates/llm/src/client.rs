use async_trait::async_trait;
use runlog_core::{BalanceSnapshot, PromptTemplates, REFERENCE_CURRENCY};

use crate::error::LlmError;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.deepseek.com";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Client for the report-writing model and its billing endpoint.
///
/// Implementations handle the specifics of the provider API. The caller
/// handles log formatting and persistence.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Query the provider's balance endpoint.
    async fn check_balance(&self) -> Result<BalanceSnapshot, LlmError>;

    /// Send `prompt` as the user message and return the full completion.
    async fn generate_report(&self, prompt: &str) -> Result<String, LlmError>;

    /// The prompt templates this client was built with.
    fn templates(&self) -> &PromptTemplates;
}

/// Settings for [`DeepSeekClient`](crate::DeepSeekClient).
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Bearer credential. `None` surfaces as `LlmError::Authentication` at
    /// call time.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Stream the completion as server-sent events.
    pub stream: bool,
    /// Write streamed fragments to stdout as they arrive.
    pub echo: bool,
    /// Currency preferred when the balance response lists several.
    pub reference_currency: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: true,
            echo: false,
            reference_currency: REFERENCE_CURRENCY.to_string(),
        }
    }
}

impl ModelConfig {
    /// Default settings with the given credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}
