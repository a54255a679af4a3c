use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::domain::{AnalysisResult, TransactionPayload};

/// Anything that can score a transaction. The orchestrator only ever talks
/// to this seam.
#[async_trait]
pub trait ScoreBackend: Send + Sync {
    async fn predict(&self, payload: &TransactionPayload) -> Result<AnalysisResult>;
}

#[derive(Debug, Clone)]
pub struct ScoringClient {
    base_url: String,
    http: Client,
}

impl ScoringClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl ScoreBackend for ScoringClient {
    /// One request/response exchange, no retries. Transport errors,
    /// non-success statuses and an `error` field in the body all collapse to
    /// the same failure signal.
    async fn predict(&self, payload: &TransactionPayload) -> Result<AnalysisResult> {
        let url = format!("{}/predict", self.base_url);
        let resp = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        let result: AnalysisResult = resp.json().await?;
        if let Some(message) = &result.error {
            return Err(anyhow!("scoring backend error: {message}"));
        }
        Ok(result)
    }
}
