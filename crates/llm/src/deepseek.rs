//! Client for the DeepSeek chat-completions and balance endpoints.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking`.

use std::io::{BufReader, Write};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use runlog_core::{BalanceResponse, BalanceSnapshot, PromptTemplates};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ureq::http::Response;
use ureq::config::Config;
use ureq::{Agent, Body};

use crate::client::{ModelClient, ModelConfig};
use crate::error::LlmError;
use crate::stream::{accumulate, DeltaStream};

const BALANCE_TIMEOUT: Duration = Duration::from_secs(10);
const STREAM_TIMEOUT: Duration = Duration::from_secs(120);
const STREAM_BODY_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Model client for DeepSeek and other OpenAI-compatible providers.
pub struct DeepSeekClient {
    config: ModelConfig,
    templates: PromptTemplates,
}

impl DeepSeekClient {
    /// Create a client with the default prompt templates.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            templates: PromptTemplates::default(),
        }
    }

    /// Replace the prompt templates.
    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn api_key(&self) -> Result<String, LlmError> {
        self.config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::Authentication("DEEPSEEK_API_KEY is not configured".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn chat_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.templates.system().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: self.config.stream,
        }
    }
}

#[async_trait]
impl ModelClient for DeepSeekClient {
    async fn check_balance(&self) -> Result<BalanceSnapshot, LlmError> {
        let api_key = self.api_key()?;
        let url = self.url("/user/balance");
        let reference = self.config.reference_currency.clone();

        let response: BalanceResponse =
            tokio::task::spawn_blocking(move || fetch_balance(&url, &api_key))
                .await
                .map_err(|e| LlmError::Network(format!("task join error: {}", e)))??;

        let snapshot = BalanceSnapshot::from_response(&response, &reference);
        debug!(
            currency = %snapshot.currency,
            total = %snapshot.total,
            available = snapshot.available,
            "Fetched balance"
        );
        Ok(snapshot)
    }

    async fn generate_report(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key()?;
        let url = self.url("/chat/completions");
        let request = self.chat_request(prompt);
        let stream = self.config.stream;
        let echo = self.config.echo;

        info!(
            model = %self.config.model,
            stream,
            prompt_chars = prompt.chars().count(),
            "Requesting report"
        );
        let started = Instant::now();

        let text = tokio::task::spawn_blocking(move || {
            if stream {
                stream_completion(&url, &api_key, &request, echo)
            } else {
                complete(&url, &api_key, &request)
            }
        })
        .await
        .map_err(|e| LlmError::Network(format!("task join error: {}", e)))??;

        info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            chars = text.chars().count(),
            "Report generated"
        );
        Ok(text)
    }

    fn templates(&self) -> &PromptTemplates {
        &self.templates
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

// ── Blocking calls ───────────────────────────────────────────────────────────

fn agent(timeout: Duration) -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    Agent::new_with_config(config)
}

/// `STREAM_TIMEOUT` bounds everything up to the response headers. The body
/// gets `STREAM_BODY_TIMEOUT`, since a long report streams for minutes.
fn stream_config() -> Config {
    Agent::config_builder()
        .timeout_connect(Some(STREAM_TIMEOUT))
        .timeout_send_request(Some(STREAM_TIMEOUT))
        .timeout_send_body(Some(STREAM_TIMEOUT))
        .timeout_recv_response(Some(STREAM_TIMEOUT))
        .timeout_recv_body(Some(STREAM_BODY_TIMEOUT))
        .http_status_as_error(false)
        .build()
}

fn bearer(api_key: &str) -> String {
    format!("Bearer {}", api_key)
}

fn transport_err(e: ureq::Error) -> LlmError {
    match e {
        ureq::Error::StatusCode(status) => LlmError::Provider {
            status,
            message: String::new(),
        },
        other => LlmError::Network(other.to_string()),
    }
}

/// Pass 2xx responses through, turn anything else into `LlmError::Provider`.
fn ensure_success(response: Response<Body>) -> Result<Response<Body>, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.into_body();
    let message = body.read_to_string().unwrap_or_default();
    Err(LlmError::Provider {
        status: status.as_u16(),
        message: truncate(message.trim(), 200),
    })
}

fn fetch_balance(url: &str, api_key: &str) -> Result<BalanceResponse, LlmError> {
    let response = agent(BALANCE_TIMEOUT)
        .get(url)
        .header("Authorization", &bearer(api_key))
        .header("Accept", "application/json")
        .call()
        .map_err(transport_err)?;

    ensure_success(response)?
        .into_body()
        .read_json()
        .map_err(|e| LlmError::Parse(format!("failed to parse balance response: {}", e)))
}

fn stream_completion(
    url: &str,
    api_key: &str,
    request: &ChatRequest,
    echo: bool,
) -> Result<String, LlmError> {
    let response = Agent::new_with_config(stream_config())
        .post(url)
        .header("Authorization", &bearer(api_key))
        .header("Accept", "text/event-stream")
        .send_json(request)
        .map_err(transport_err)?;

    let reader = BufReader::new(ensure_success(response)?.into_body().into_reader());
    let mut stdout = std::io::stdout();
    accumulate(DeltaStream::new(reader), |delta| {
        if echo {
            if let Err(e) = write!(stdout, "{}", delta).and_then(|()| stdout.flush()) {
                warn!("Failed to echo report fragment: {}", e);
            }
        }
    })
}

fn complete(url: &str, api_key: &str, request: &ChatRequest) -> Result<String, LlmError> {
    let response = agent(COMPLETION_TIMEOUT)
        .post(url)
        .header("Authorization", &bearer(api_key))
        .send_json(request)
        .map_err(transport_err)?;

    let body: CompletionResponse = ensure_success(response)?
        .into_body()
        .read_json()
        .map_err(|e| LlmError::Parse(format!("failed to parse completion response: {}", e)))?;

    message_content(body)
}

fn message_content(body: CompletionResponse) -> Result<String, LlmError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| LlmError::Parse("completion response contained no message content".to_string()))
}

/// Truncate a string for error messages.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
