use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Backend
    pub backend_base_url: String,
    pub http_timeout_ms: u64,

    // Chaos mode
    pub chaos_period_ms: u64,
    pub chaos_on_boot: bool,
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|s| s.trim().to_lowercase()) {
        None => default,
        Some(v) if v.is_empty() => default,
        Some(v) if v == "1" || v == "true" || v == "yes" || v == "y" || v == "on" => true,
        Some(v) if v == "0" || v == "false" || v == "no" || v == "n" || v == "off" => false,
        Some(_) => default,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|x| x.parse().ok())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let backend_base_url = std::env::var("SENTINEL_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());

        let http_timeout_ms = env_parse::<u64>("SENTINEL_HTTP_TIMEOUT_MS").unwrap_or(10_000);

        // Matches the generator's stock cadence of one synthetic transaction
        // every 1.5s.
        let chaos_period_ms = env_parse::<u64>("SENTINEL_CHAOS_PERIOD_MS").unwrap_or(1_500);
        let chaos_on_boot = env_bool("SENTINEL_CHAOS_ON_BOOT", false);

        if http_timeout_ms == 0 {
            return Err(anyhow!("SENTINEL_HTTP_TIMEOUT_MS cannot be 0"));
        }
        if chaos_period_ms == 0 {
            return Err(anyhow!("SENTINEL_CHAOS_PERIOD_MS cannot be 0"));
        }

        Ok(Self {
            backend_base_url,
            http_timeout_ms,
            chaos_period_ms,
            chaos_on_boot,
        })
    }
}
