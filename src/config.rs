// src/config.rs
use log::warn;
use std::env;
use std::time::Duration;

pub const BANXICO_BASE_URL: &str = "https://www.banxico.org.mx/SieAPIRest/service/v1";

/// ISR provisional withholding on the invested capital, 2025 fiscal year.
/// Must be revisited annually (a 0.9% rate has been proposed for 2026).
pub const DEFAULT_ISR_RETENTION_RATE: f64 = 0.005;

/// How long a fetched rate set / historical series stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub banxico_base_url: String,
    pub banxico_token: String,
    pub cron_secret: Option<String>,
    pub database_url: Option<String>,
    pub isr_retention_rate: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(|| {
                warn!("$PORT not set, defaulting to 3030");
                3030
            });

        let banxico_token = env::var("BANXICO_TOKEN").unwrap_or_else(|_| {
            warn!("$BANXICO_TOKEN not set, using the public demo token");
            "191860f124b2b1f7747333cb34affe8ee0c8059161416c3d8e8a483282693043".to_string()
        });

        let isr_retention_rate = env::var("ISR_RETENTION_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ISR_RETENTION_RATE);

        Config {
            port,
            banxico_base_url: env::var("BANXICO_BASE_URL")
                .unwrap_or_else(|_| BANXICO_BASE_URL.to_string()),
            banxico_token,
            cron_secret: env::var("CRON_SECRET").ok(),
            database_url: env::var("DATABASE_URL").ok(),
            isr_retention_rate,
        }
    }
}
