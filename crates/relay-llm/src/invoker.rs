//! Outbound call to the hosted inference service

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use relay_config::RelayConfig;

use crate::error::RelayError;

/// Seam between the handler and the hosted inference service
///
/// The handler only needs a blocking-until-done invocation that takes a
/// JSON body and returns the provider's raw response bytes. Tests swap in
/// canned implementations.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Invoke the model, returning the raw response body bytes
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, RelayError>;
}

/// AWS Bedrock runtime invoker
///
/// Holds a single client handle, built once at startup and shared across
/// invocations.
pub struct BedrockInvoker {
    client: BedrockClient,
}

impl BedrockInvoker {
    /// Build a client for the configured region using the default
    /// credential chain
    pub async fn new(config: &RelayConfig) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        Self {
            client: BedrockClient::new(&aws_config),
        }
    }
}

#[async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, RelayError> {
        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output.body.into_inner())
    }
}

/// Map an SDK failure onto the relay error tiers
///
/// Structured service errors keep the provider's code and message;
/// transport-level failures (connection, timeout, response construction)
/// fall through to the internal catch-all.
fn map_sdk_error(error: SdkError<InvokeModelError>) -> RelayError {
    if let SdkError::ServiceError(_) = &error {
        let code = error.code().unwrap_or("Unknown").to_owned();
        let message = error.message().map_or_else(|| error.to_string(), str::to_owned);
        tracing::error!(%code, %message, "bedrock invoke_model failed");
        return RelayError::Aws { code, message };
    }

    tracing::error!(error = %error, "bedrock invoke_model transport failure");
    RelayError::Internal(error.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failure_maps_to_internal() {
        let error = map_sdk_error(SdkError::timeout_error("deadline elapsed"));
        assert!(matches!(error, RelayError::Internal(_)));
    }
}
