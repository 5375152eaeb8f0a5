// src/lib.rs

// Re-export or define the top-level modules you need
pub mod config;
pub mod services;
pub mod models;
pub mod handlers;
pub mod routes;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

use std::sync::Arc;

use crate::config::Config;
use crate::models::{CetesRate, HistoricalPoint};
use crate::services::banxico::BanxicoClient;
use crate::services::cache::TtlCache;
use crate::services::db::DbStore;

/// Shared state handed to every handler. Caches live here, scoped to one
/// server process.
pub struct AppState {
    pub config: Config,
    pub banxico: BanxicoClient,
    pub rates_cache: TtlCache<Vec<CetesRate>>,
    pub historical_cache: TtlCache<Vec<HistoricalPoint>>,
    pub db: Option<DbStore>,
}

impl AppState {
    pub fn new(config: Config, db: Option<DbStore>) -> Arc<Self> {
        let banxico = BanxicoClient::new(&config.banxico_base_url, &config.banxico_token);
        Arc::new(Self {
            config,
            banxico,
            rates_cache: TtlCache::new(),
            historical_cache: TtlCache::new(),
            db,
        })
    }
}
