//! Event handler: translate, invoke, unwrap

use relay_config::RelayConfig;
use serde_json::Value;

use crate::error::RelayError;
use crate::invoker::ModelInvoker;
use crate::types::{GenerationParams, GenerationRequest, GenerationSuccess, InvocationResponse, LlamaOutput, LlamaRequest};

/// Handle a single generation event
///
/// Accepts the event either as structured JSON or as a JSON document
/// wrapped in a string. Never fails: every error is mapped into a failure
/// envelope carrying its status code and the cross-origin header set.
pub async fn handle_event(invoker: &dyn ModelInvoker, config: &RelayConfig, event: Value) -> InvocationResponse {
    match relay(invoker, config, event).await {
        Ok(result) => InvocationResponse::success(&result),
        Err(error) => {
            tracing::error!(error = %error, "generation request failed");
            InvocationResponse::failure(&error)
        }
    }
}

async fn relay(invoker: &dyn ModelInvoker, config: &RelayConfig, event: Value) -> Result<GenerationSuccess, RelayError> {
    // A string event carries the JSON document as text
    let event = match event {
        Value::String(text) => serde_json::from_str(&text)?,
        structured => structured,
    };

    let request: GenerationRequest = serde_json::from_value(event)?;

    tracing::info!(prompt = %preview(&request.prompt), "processing generation request");

    let body = serde_json::to_vec(&LlamaRequest::from(&request))?;
    let raw = invoker.invoke(&config.model_id, body).await?;

    let output: LlamaOutput = serde_json::from_slice(&raw)?;

    tracing::info!("successfully generated response");

    Ok(GenerationSuccess {
        success: true,
        generated_text: output.generation,
        model_id: config.model_id.clone(),
        input_prompt: request.prompt.clone(),
        parameters: GenerationParams::from(&request),
    })
}

/// First 100 characters of the prompt, for logging
fn preview(prompt: &str) -> &str {
    prompt.char_indices().nth(100).map_or(prompt, |(i, _)| &prompt[..i])
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;

    /// Returns a fixed response body for every invocation
    struct CannedInvoker(&'static str);

    #[async_trait]
    impl ModelInvoker for CannedInvoker {
        async fn invoke(&self, _model_id: &str, _body: Vec<u8>) -> Result<Vec<u8>, RelayError> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    /// Records the model id and body it was invoked with
    struct RecordingInvoker {
        seen: Mutex<Option<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl ModelInvoker for RecordingInvoker {
        async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, RelayError> {
            *self.seen.lock().unwrap() = Some((model_id.to_owned(), body));
            Ok(br#"{"generation": ""}"#.to_vec())
        }
    }

    /// Fails every invocation with a structured provider error
    struct ThrottledInvoker;

    #[async_trait]
    impl ModelInvoker for ThrottledInvoker {
        async fn invoke(&self, _model_id: &str, _body: Vec<u8>) -> Result<Vec<u8>, RelayError> {
            Err(RelayError::Aws {
                code: "ThrottlingException".to_owned(),
                message: "Rate exceeded".to_owned(),
            })
        }
    }

    /// Fails every invocation with an unexpected error
    struct BrokenInvoker;

    #[async_trait]
    impl ModelInvoker for BrokenInvoker {
        async fn invoke(&self, _model_id: &str, _body: Vec<u8>) -> Result<Vec<u8>, RelayError> {
            Err(RelayError::Internal(anyhow::anyhow!("connection reset by peer")))
        }
    }

    fn config() -> RelayConfig {
        RelayConfig::default()
    }

    fn body_json(envelope: &InvocationResponse) -> Value {
        serde_json::from_str(&envelope.body).unwrap()
    }

    #[tokio::test]
    async fn generation_field_becomes_generated_text() {
        let invoker = CannedInvoker(r#"{"generation": "X"}"#);
        let envelope = handle_event(&invoker, &config(), json!({"prompt": "hi"})).await;

        assert_eq!(envelope.status_code, 200);
        let body = body_json(&envelope);
        assert_eq!(body["success"], true);
        assert_eq!(body["generated_text"], "X");
        assert_eq!(body["input_prompt"], "hi");
        assert_eq!(body["model_id"], config().model_id);
    }

    #[tokio::test]
    async fn missing_fields_take_defaults() {
        let invoker = CannedInvoker(r#"{"generation": "ok"}"#);
        let envelope = handle_event(&invoker, &config(), json!({})).await;

        assert_eq!(envelope.status_code, 200);
        let body = body_json(&envelope);
        assert_eq!(body["input_prompt"], "Hello, how are you?");
        assert_eq!(body["parameters"]["max_tokens"], 512);
        assert_eq!(body["parameters"]["temperature"], 0.7);
        assert_eq!(body["parameters"]["top_p"], 0.9);
    }

    #[tokio::test]
    async fn omitted_temperature_is_echoed_as_default() {
        let invoker = CannedInvoker(r#"{"generation": "ok"}"#);
        let envelope = handle_event(&invoker, &config(), json!({"prompt": "hi", "max_tokens": 64})).await;

        let body = body_json(&envelope);
        assert_eq!(body["parameters"]["max_tokens"], 64);
        assert_eq!(body["parameters"]["temperature"], 0.7);
    }

    #[tokio::test]
    async fn missing_generation_yields_empty_text() {
        let invoker = CannedInvoker(r#"{"stop_reason": "stop"}"#);
        let envelope = handle_event(&invoker, &config(), json!({"prompt": "hi"})).await;

        assert_eq!(envelope.status_code, 200);
        assert_eq!(body_json(&envelope)["generated_text"], "");
    }

    #[tokio::test]
    async fn string_event_is_decoded() {
        let invoker = CannedInvoker(r#"{"generation": "ok"}"#);
        let event = Value::String(r#"{"prompt": "from text"}"#.to_owned());
        let envelope = handle_event(&invoker, &config(), event).await;

        assert_eq!(envelope.status_code, 200);
        assert_eq!(body_json(&envelope)["input_prompt"], "from text");
    }

    #[tokio::test]
    async fn malformed_string_event_is_client_error() {
        let invoker = CannedInvoker(r#"{"generation": "unreachable"}"#);
        let event = Value::String("{not valid json".to_owned());
        let envelope = handle_event(&invoker, &config(), event).await;

        assert_eq!(envelope.status_code, 400);
        let body = body_json(&envelope);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid JSON format");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_object_event_is_client_error() {
        let invoker = CannedInvoker(r#"{"generation": "unreachable"}"#);
        let envelope = handle_event(&invoker, &config(), json!([1])).await;

        assert_eq!(envelope.status_code, 400);
        assert_eq!(body_json(&envelope)["error"], "Invalid JSON format");
    }

    #[tokio::test]
    async fn non_json_provider_body_is_decode_error() {
        let invoker = CannedInvoker("not json at all");
        let envelope = handle_event(&invoker, &config(), json!({"prompt": "hi"})).await;

        assert_eq!(envelope.status_code, 400);
        let body = body_json(&envelope);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid JSON format");
    }

    #[tokio::test]
    async fn provider_error_keeps_its_code() {
        let envelope = handle_event(&ThrottledInvoker, &config(), json!({"prompt": "hi"})).await;

        assert_eq!(envelope.status_code, 400);
        let body = body_json(&envelope);
        assert_eq!(body["error"], "AWS Error: ThrottlingException");
        assert_eq!(body["message"], "Rate exceeded");
    }

    #[tokio::test]
    async fn unexpected_failure_is_internal_error() {
        let envelope = handle_event(&BrokenInvoker, &config(), json!({"prompt": "hi"})).await;

        assert_eq!(envelope.status_code, 500);
        let body = body_json(&envelope);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["message"], "connection reset by peer");
    }

    #[tokio::test]
    async fn cors_headers_on_success_and_failure() {
        let success = handle_event(&CannedInvoker(r#"{"generation": "ok"}"#), &config(), json!({})).await;
        let failure = handle_event(&BrokenInvoker, &config(), json!({})).await;

        for envelope in [success, failure] {
            assert_eq!(envelope.headers["Access-Control-Allow-Origin"], "*");
            assert_eq!(envelope.headers["Content-Type"], "application/json");
        }
    }

    #[tokio::test]
    async fn provider_body_uses_bedrock_field_names() {
        let invoker = RecordingInvoker { seen: Mutex::new(None) };
        let custom_model = RelayConfig {
            model_id: "meta.llama3-70b-instruct-v1:0".to_owned(),
            ..RelayConfig::default()
        };

        handle_event(&invoker, &custom_model, json!({"prompt": "hi", "max_tokens": 64})).await;

        let (model_id, body) = invoker.seen.lock().unwrap().take().unwrap();
        assert_eq!(model_id, "meta.llama3-70b-instruct-v1:0");

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["prompt"], "hi");
        assert_eq!(body["max_gen_len"], 64);
        assert!(body.get("max_tokens").is_none());
    }
}
