use tokio::sync::RwLock;

use crate::domain::ChatContext;

/// Latest-analysis record shared between the orchestrator (sole writer) and
/// the assistant client (reader on every outgoing message).
///
/// No history: only the most recent applied verdict is ever visible. Starts
/// neutral (score 0, no factors).
#[derive(Debug, Default)]
pub struct ContextStore {
    inner: RwLock<ChatContext>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, risk_score: u8, risk_factors: Vec<String>) {
        let mut ctx = self.inner.write().await;
        ctx.risk_score = risk_score;
        ctx.risk_factors = risk_factors;
    }

    pub async fn get(&self) -> ChatContext {
        self.inner.read().await.clone()
    }
}
