use http::StatusCode;
use thiserror::Error;

/// Errors that can occur while relaying a generation request
///
/// Three tiers, mirroring the outward contract: provider errors keep the
/// provider's own code, malformed input surfaces as a generic decode error,
/// and everything else collapses into an internal catch-all. Nothing is
/// retried; every error is formatted into the failure envelope.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Bedrock reported a structured service error
    #[error("aws error {code}: {message}")]
    Aws {
        /// Provider error code (e.g. `ThrottlingException`)
        code: String,
        /// Provider-supplied detail
        message: String,
    },

    /// Event payload could not be decoded as JSON
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    /// HTTP status associated with this error tier
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Aws { .. } | Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Outward-facing label for the failure envelope's `error` field
    pub fn error_label(&self) -> String {
        match self {
            Self::Aws { code, .. } => format!("AWS Error: {code}"),
            Self::InvalidJson(_) => "Invalid JSON format".to_owned(),
            Self::Internal(_) => "Internal server error".to_owned(),
        }
    }

    /// Detail carried in the failure envelope's `message` field
    pub fn detail(&self) -> String {
        match self {
            Self::Aws { message, .. } => message.clone(),
            Self::InvalidJson(source) => source.to_string(),
            Self::Internal(source) => source.to_string(),
        }
    }
}
