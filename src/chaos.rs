use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::TransactionPayload;
use crate::engine::Engine;

const LOCATIONS: [&str; 3] = ["local", "domestic", "international"];

/// Synthetic load generator. While active, a fixed-period timer submits a
/// randomized transaction through the same path as a manual submission, with
/// no overlap suppression: if a scoring round-trip outlasts the period,
/// several requests are simply outstanding at once.
pub struct ChaosMode {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl ChaosMode {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    /// The timer task is the single source of truth for the active state, so
    /// the two can never diverge.
    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Flips the generator and returns the new active state. Toggling while
    /// active stops it instead of stacking a second timer.
    pub fn toggle(&mut self, engine: Arc<Engine>) -> bool {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("chaos.stop");
            return false;
        }

        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // interval fires once immediately; the first synthetic
            // submission should wait one full period like the rest.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let payload = synth_payload();
                info!(
                    amount = payload.amount,
                    location = %payload.location,
                    "chaos.tick"
                );
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    if let Err(err) = engine.analyze(payload).await {
                        warn!(error = %err, "chaos.analyze_failed");
                    }
                });
            }
        }));
        info!(period_ms = self.period.as_millis() as u64, "chaos.start");
        true
    }
}

impl Drop for ChaosMode {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub fn synth_payload() -> TransactionPayload {
    let mut rng = rand::thread_rng();
    let amount = rng.gen_range(10..5_010) as f64;
    let merchant = format!("Chaos Sim {}", rng.gen_range(0..100));
    let location = LOCATIONS[rng.gen_range(0..LOCATIONS.len())];
    let date = Local::now().format("%Y-%m-%d").to_string();
    TransactionPayload::new(amount, merchant, location, date, "12:00", Some("visa".to_string()))
}
