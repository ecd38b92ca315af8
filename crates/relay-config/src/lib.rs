//! Configuration for the relay, resolved from the environment
//!
//! The deployment platform supplies two knobs: the AWS region the Bedrock
//! client should target and the model identifier to invoke. Both fall back
//! to fixed defaults when unset.

#![allow(clippy::must_use_candidate)]

/// Region used when `AWS_REGION` is unset
pub const DEFAULT_REGION: &str = "us-east-1";

/// Model identifier used when `MODEL_ID` is unset
pub const DEFAULT_MODEL_ID: &str = "meta.llama3-8b-instruct-v1:0";

/// Resolved relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// AWS region the Bedrock client targets
    pub region: String,
    /// Bedrock model identifier passed to `InvokeModel`
    pub model_id: String,
}

impl RelayConfig {
    /// Resolve configuration from `AWS_REGION` and `MODEL_ID`
    ///
    /// Absent or empty variables fall back to the defaults; resolution
    /// never fails.
    pub fn from_env() -> Self {
        let config = Self {
            region: env_or("AWS_REGION", DEFAULT_REGION),
            model_id: env_or("MODEL_ID", DEFAULT_MODEL_ID),
        };

        tracing::debug!(region = %config.region, model_id = %config.model_id, "resolved configuration");

        config
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            model_id: DEFAULT_MODEL_ID.to_owned(),
        }
    }
}

fn env_or(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_owned(),
    }
}
