//! Bedrock text-generation relay
//!
//! Receives a generation event, normalizes its parameters, forwards it to
//! AWS Bedrock `InvokeModel`, and wraps the provider's result or failure in
//! an HTTP-shaped envelope. There is no retry, streaming, or routing logic;
//! the whole crate is straight-line request/response translation.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod handler;
pub mod invoker;
pub mod router;
pub mod types;

pub use error::RelayError;
pub use handler::handle_event;
pub use invoker::{BedrockInvoker, ModelInvoker};
pub use router::{RelayState, relay_router};
pub use types::{GenerationRequest, InvocationResponse};
