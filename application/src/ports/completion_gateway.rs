//! Completion gateway port
//!
//! Defines the interface to the external completion provider. The engine
//! treats it as an opaque asynchronous function: no retries, no backoff, no
//! timeouts are defined here — whatever the provider does internally is
//! invisible to this core.

use async_trait::async_trait;
use roundtable_domain::Message;
use thiserror::Error;

/// Errors that can occur during completion gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for generating persona replies
///
/// This port defines how the application layer reaches the completion
/// provider. Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Generate a reply given a persona's system prompt, the accumulated
    /// conversation history, and an optional instruction for this turn.
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[Message],
        context: Option<&str>,
    ) -> Result<String, GatewayError>;
}
