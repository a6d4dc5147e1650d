//! runlog-llm: the model provider seam.
//!
//! [`ModelClient`] is the trait the pipeline talks to. [`DeepSeekClient`]
//! implements it over the OpenAI-compatible chat-completions API, and
//! [`stream`] decodes the server-sent event body of a streamed completion.

mod client;
mod deepseek;
mod error;
pub mod stream;

pub use client::{
    ModelClient, ModelConfig, DEFAULT_API_BASE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
pub use deepseek::DeepSeekClient;
pub use error::LlmError;
pub use stream::{accumulate, DeltaStream};
