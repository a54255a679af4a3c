use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub amount: f64,
    pub merchant: String,
    pub location: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "cardType")]
    pub card_type: String,
}

impl TransactionPayload {
    /// Builds a payload from raw form-style inputs. A missing card selection
    /// collapses to "unknown".
    pub fn new(
        amount: f64,
        merchant: impl Into<String>,
        location: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        card_type: Option<String>,
    ) -> Self {
        Self {
            amount,
            merchant: merchant.into(),
            location: location.into(),
            date: date.into(),
            time: time.into(),
            card_type: card_type.unwrap_or_else(|| "unknown".to_string()),
        }
    }

    /// Local validation gate. A payload that fails here must never reach the
    /// scoring backend.
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() {
            return Err(anyhow!("amount is not a finite number"));
        }
        if self.amount < 0.0 {
            return Err(anyhow!("amount cannot be negative: {}", self.amount));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub long: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationTrajectory {
    pub current: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Coordinate>,
}

/// Per-metric detail block backing the radar axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskDetails {
    pub velocity: f64,
    pub avg_spending: f64,
    pub dist_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "isFraud")]
    pub is_fraud: bool,

    /// 0-100.
    #[serde(rename = "riskScore")]
    pub risk_score: u8,

    #[serde(rename = "riskFactors", default)]
    pub risk_factors: Vec<String>,

    #[serde(rename = "locationData", skip_serializing_if = "Option::is_none")]
    pub location_data: Option<LocationTrajectory>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<RiskDetails>,

    #[serde(rename = "mlScore", skip_serializing_if = "Option::is_none")]
    pub ml_score: Option<f64>,

    /// Present iff the backend reports a failure; the result carries no
    /// usable verdict in that case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Latest applied analysis, as seen by the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatContext {
    #[serde(rename = "riskScore")]
    pub risk_score: u8,
    #[serde(rename = "riskFactors")]
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=40 => RiskBand::Low,
            41..=70 => RiskBand::Moderate,
            _ => RiskBand::High,
        }
    }
}
