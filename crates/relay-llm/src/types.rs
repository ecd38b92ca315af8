//! Wire shapes for the relay
//!
//! Three layers: the incoming generation event, the Llama-specific body
//! sent to Bedrock, and the outward envelope handed back to the invoking
//! platform.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

fn default_prompt() -> String {
    "Hello, how are you?".to_owned()
}

const fn default_max_tokens() -> u32 {
    512
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_top_p() -> f64 {
    0.9
}

/// Incoming generation request
///
/// Every field is optional on the wire; absent fields take the defaults
/// below. Values are passed through to the provider as-is, with no range
/// validation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    /// Text prompt to complete
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Nucleus sampling threshold
    #[serde(default = "default_top_p")]
    pub top_p: f64,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

/// Request body in the shape the Llama models on Bedrock expect
///
/// Identical to [`GenerationRequest`] except that `max_tokens` travels as
/// `max_gen_len`.
#[derive(Debug, Serialize)]
pub struct LlamaRequest {
    /// Text prompt to complete
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_gen_len: u32,
    /// Sampling temperature
    pub temperature: f64,
    /// Nucleus sampling threshold
    pub top_p: f64,
}

impl From<&GenerationRequest> for LlamaRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            prompt: request.prompt.clone(),
            max_gen_len: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        }
    }
}

/// Response body returned by the Llama models on Bedrock
///
/// Only the generated text is of interest; other fields are ignored and a
/// missing `generation` field yields the empty string.
#[derive(Debug, Default, Deserialize)]
pub struct LlamaOutput {
    /// Generated completion text
    #[serde(default)]
    pub generation: String,
}

/// Effective generation parameters echoed back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct GenerationParams {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f64,
    /// Nucleus sampling threshold
    pub top_p: f64,
}

impl From<&GenerationRequest> for GenerationParams {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        }
    }
}

/// Successful generation result
#[derive(Debug, Serialize)]
pub struct GenerationSuccess {
    /// Always true on this branch
    pub success: bool,
    /// Text produced by the model
    pub generated_text: String,
    /// Model identifier that served the request
    pub model_id: String,
    /// Prompt as received
    pub input_prompt: String,
    /// Effective parameters after defaulting
    pub parameters: GenerationParams,
}

/// Failed generation result
#[derive(Debug, Serialize)]
pub struct GenerationFailure {
    /// Always false on this branch
    pub success: bool,
    /// Outward-facing error label
    pub error: String,
    /// Detail carried alongside the label
    pub message: String,
}

/// Permissive cross-origin headers attached to every envelope
pub fn cors_headers() -> IndexMap<&'static str, &'static str> {
    IndexMap::from([
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Headers", "Content-Type"),
        ("Access-Control-Allow-Methods", "OPTIONS,POST,GET"),
    ])
}

/// Envelope returned to the invoking platform
///
/// Mirrors the `{statusCode, headers, body}` shape the platform expects;
/// `body` is the JSON-encoded success or failure result.
#[derive(Debug, Serialize)]
pub struct InvocationResponse {
    /// HTTP status associated with the result
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Response headers, always including the cross-origin set
    pub headers: IndexMap<&'static str, &'static str>,
    /// JSON-encoded result body
    pub body: String,
}

impl InvocationResponse {
    /// Wrap a successful generation in a 200 envelope
    pub fn success(result: &GenerationSuccess) -> Self {
        Self {
            status_code: 200,
            headers: cors_headers(),
            body: serde_json::to_string(result).unwrap_or_default(),
        }
    }

    /// Wrap a relay failure in an envelope carrying its mapped status
    pub fn failure(error: &RelayError) -> Self {
        let result = GenerationFailure {
            success: false,
            error: error.error_label(),
            message: error.detail(),
        };

        Self {
            status_code: error.status_code().as_u16(),
            headers: cors_headers(),
            body: serde_json::to_string(&result).unwrap_or_default(),
        }
    }
}
