//! Scripted completion gateway
//!
//! Replays queued replies in order, then falls back to echoing the turn
//! instruction. Used by the demo CLI and the end-to-end tests; a real
//! provider adapter implements the same port.

use async_trait::async_trait;
use roundtable_application::{CompletionGateway, GatewayError};
use roundtable_domain::Message;
use std::collections::VecDeque;
use tokio::sync::Mutex;

enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// Deterministic implementation of [`CompletionGateway`]
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<ScriptedReply>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub async fn push_reply(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(ScriptedReply::Text(text.into()));
    }

    /// Queue a provider failure
    pub async fn push_failure(&self, error_text: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(ScriptedReply::Failure(error_text.into()));
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn generate(
        &self,
        _system_prompt: &str,
        _history: &[Message],
        context: Option<&str>,
    ) -> Result<String, GatewayError> {
        if let Some(reply) = self.replies.lock().await.pop_front() {
            return match reply {
                ScriptedReply::Text(text) => Ok(text),
                ScriptedReply::Failure(e) => Err(GatewayError::RequestFailed(e)),
            };
        }
        Ok(match context {
            Some(instruction) => format!("(scripted) {}", instruction),
            None => "(scripted reply)".to_string(),
        })
    }
}
