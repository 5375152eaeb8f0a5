// src/handlers/rates.rs
use chrono::Utc;
use log::info;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use crate::config::CACHE_TTL;
use crate::models::{CetesRate, RateSource, RatesResponse};
use crate::AppState;

const RATES_CACHE_KEY: &str = "cetes_rates";

/// Cached rate set, refetched from Banxico when the cache window lapses.
/// Shared with the calculator handler so both see the same rates.
pub(crate) async fn current_rates(state: &AppState) -> Vec<CetesRate> {
    if let Some(rates) = state.rates_cache.get(RATES_CACHE_KEY).await {
        return rates;
    }

    let rates = state.banxico.fetch_rates().await;
    state
        .rates_cache
        .set(RATES_CACHE_KEY, rates.clone(), CACHE_TTL)
        .await;
    rates
}

/// Per-term fallback inside `fetch_rates` means this endpoint always answers
/// 200 with four entries; it never surfaces an upstream failure.
pub async fn get_cetes_rates(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get CETES rates");

    let rates = current_rates(&state).await;
    let source = if rates.iter().all(|r| r.source == RateSource::Fallback) {
        RateSource::Fallback
    } else {
        RateSource::Api
    };

    Ok(warp::reply::json(&RatesResponse {
        success: true,
        data: rates,
        last_updated: Utc::now(),
        source,
    }))
}
