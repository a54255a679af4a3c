mod assistant;
mod chaos;
mod config;
mod context;
mod domain;
mod engine;
mod logging;
mod render;
mod scoring;
mod surfaces;
mod tracker;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load local .env if present (no-op in prod/systemd envs)
    let _ = dotenvy::dotenv();

    logging::init_tracing();

    let cfg = config::Config::from_env()?;
    info!(?cfg, "boot");

    let timeout = Duration::from_millis(cfg.http_timeout_ms);
    let store = Arc::new(context::ContextStore::new());
    let scoring = Arc::new(scoring::ScoringClient::new(
        cfg.backend_base_url.clone(),
        timeout,
    )?);
    let assistant =
        assistant::AssistantClient::new(cfg.backend_base_url.clone(), timeout, Arc::clone(&store))?;

    let fanout = render::RenderFanout::new()
        .with_verdict(Arc::new(surfaces::LogVerdictSurface))
        .with_map(Arc::new(surfaces::LogMapSurface))
        .with_radar(Arc::new(surfaces::LogRadarSurface));

    let engine = Arc::new(
        engine::Engine::new(scoring, Arc::clone(&store), fanout)
            .with_busy(Arc::new(surfaces::LogBusySurface)),
    );

    // One manual-style submission at boot so a run without chaos mode still
    // exercises the full pipeline, assistant included.
    let now = Local::now();
    let payload = domain::TransactionPayload::new(
        100.0,
        "Corner Store",
        "local",
        now.format("%Y-%m-%d").to_string(),
        now.format("%H:%M").to_string(),
        Some("visa".to_string()),
    );
    match engine.analyze(payload).await {
        Ok(outcome) => {
            info!(?outcome, "boot.analyze");
            let reply = assistant.send("Explain the last analysis.").await;
            info!(reply = %reply, "assistant.reply");
        }
        Err(err) => warn!(error = %err, "boot.analyze_failed"),
    }

    let mut chaos = chaos::ChaosMode::new(Duration::from_millis(cfg.chaos_period_ms));
    if cfg.chaos_on_boot {
        chaos.toggle(Arc::clone(&engine));
    }

    loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        info!(
            chaos = chaos.is_active(),
            outstanding = engine.outstanding(),
            "sentinel.heartbeat"
        );
    }
}
