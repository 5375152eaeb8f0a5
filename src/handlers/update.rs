// src/handlers/update.rs
use chrono::Utc;
use log::{error, info, warn};
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::db::DbStore;
use crate::services::updater::{run_update, UpdateOutcome};
use crate::AppState;

fn check_bearer(state: &AppState, auth_header: Option<&str>) -> Result<(), Rejection> {
    let Some(secret) = state.config.cron_secret.as_deref() else {
        warn!("Update endpoint called but $CRON_SECRET is not configured");
        return Err(warp::reject::custom(ApiError::unauthorized()));
    };
    match auth_header {
        Some(header) if header == format!("Bearer {}", secret) => Ok(()),
        _ => Err(warp::reject::custom(ApiError::unauthorized())),
    }
}

fn require_db(state: &AppState) -> Result<&DbStore, Rejection> {
    state.db.as_ref().ok_or_else(|| {
        warp::reject::custom(ApiError::database_error("Rate persistence is not configured"))
    })
}

async fn update_reply(state: &AppState, force: bool) -> Result<Json, Rejection> {
    let db = require_db(state)?;

    match run_update(&state.banxico, db, force).await {
        Ok(UpdateOutcome::Updated(snapshot)) => Ok(warp::reply::json(&json!({
            "success": true,
            "message": "Rates updated successfully",
            "rates": snapshot,
            "timestamp": Utc::now(),
        }))),
        Ok(UpdateOutcome::Skipped(reason)) => Ok(warp::reply::json(&json!({
            "success": true,
            "message": format!("Skipped: {}", reason),
            "timestamp": Utc::now(),
        }))),
        Err(e) => {
            error!("Rate update failed: {}", e);
            Err(warp::reject::custom(ApiError::external_error(format!(
                "Failed to update rates: {}",
                e
            ))))
        }
    }
}

/// Manual trigger; bypasses the business-hours gate.
pub async fn post_update_rates(
    auth_header: Option<String>,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    check_bearer(&state, auth_header.as_deref())?;
    info!("Handling manual rate update");
    update_reply(&state, true).await
}

/// External-cron trigger; the update job applies the business-day and
/// publication-hour gate itself.
pub async fn get_cron_update(
    auth_header: Option<String>,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    check_bearer(&state, auth_header.as_deref())?;
    info!("Handling scheduled rate update");
    update_reply(&state, false).await
}
