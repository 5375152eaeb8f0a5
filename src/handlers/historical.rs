// src/handlers/historical.rs
use chrono::Utc;
use log::{error, info};
use std::collections::HashMap;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::config::CACHE_TTL;
use crate::models::{CetesPlazo, DateRange, HistoricalResponse, Period};
use crate::AppState;

pub async fn get_historical_data(
    query: HashMap<String, String>,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    let plazo: CetesPlazo = query
        .get("plazo")
        .ok_or_else(|| warp::reject::custom(ApiError::bad_request("Plazo parameter is required")))?
        .parse()
        .map_err(|e: String| warp::reject::custom(ApiError::bad_request(e)))?;

    let period: Period = match query.get("period") {
        Some(p) => p
            .parse()
            .map_err(|e: String| warp::reject::custom(ApiError::bad_request(e)))?,
        None => Period::OneYear,
    };

    let end = Utc::now().date_naive();
    let start = period.start_date(end);
    info!(
        "Handling historical request: plazo={}, period={}, range={}..{}",
        plazo,
        period.as_str(),
        start,
        end
    );

    let cache_key = format!("historical:{}:{}", plazo, period.as_str());
    let data = match state.historical_cache.get(&cache_key).await {
        Some(points) => points,
        None => {
            let points = state
                .banxico
                .fetch_historical(plazo, start, end)
                .await
                .map_err(|e| {
                    error!("Failed to fetch historical data: {}", e);
                    warp::reject::custom(ApiError::external_error("Failed to fetch historical data"))
                })?;
            state
                .historical_cache
                .set(cache_key, points.clone(), CACHE_TTL)
                .await;
            points
        }
    };

    Ok(warp::reply::json(&HistoricalResponse {
        success: true,
        data,
        period: period.as_str(),
        plazo,
        date_range: DateRange { start, end },
    }))
}
