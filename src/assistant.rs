use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::context::ContextStore;
use crate::domain::ChatContext;

/// Backend replied but carried no text.
const FALLBACK_EMPTY: &str = "I cannot speak right now.";
/// Transport failure.
const FALLBACK_SEVERED: &str = "The connection to the backend is severed.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    context: &'a ChatContext,
}

#[derive(Deserialize)]
struct ChatResponse {
    reply: Option<String>,
}

/// Conversational client. Reads the shared context on every outgoing message
/// so the assistant always discusses the most recent analyzed transaction.
#[derive(Clone)]
pub struct AssistantClient {
    base_url: String,
    http: Client,
    context: Arc<ContextStore>,
}

impl AssistantClient {
    pub fn new(base_url: String, timeout: Duration, context: Arc<ContextStore>) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            context,
        })
    }

    /// Never fails: any failure becomes a fixed fallback reply appended to
    /// the conversation.
    pub async fn send(&self, message: &str) -> String {
        let context = self.context.get().await;
        match self.request(message, &context).await {
            Ok(resp) => reply_or_fallback(resp.reply),
            Err(err) => {
                warn!(error = %err, "assistant.request_failed");
                FALLBACK_SEVERED.to_string()
            }
        }
    }

    async fn request(&self, message: &str, context: &ChatContext) -> Result<ChatResponse> {
        let url = format!("{}/chat", self.base_url);
        let resp = self
            .http
            .post(url)
            .json(&ChatRequest { message, context })
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}

fn reply_or_fallback(reply: Option<String>) -> String {
    match reply {
        Some(text) if !text.is_empty() => text,
        _ => FALLBACK_EMPTY.to_string(),
    }
}
