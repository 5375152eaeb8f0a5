// src/handlers/calculator.rs
use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::rates::current_rates;
use crate::models::{CalculationResponse, CetesPlazo};
use crate::services::calculations::calculate_net_return;
use crate::AppState;

fn bad_request(message: impl Into<String>) -> Rejection {
    warp::reject::custom(ApiError::bad_request(message))
}

pub async fn get_calculation(
    query: HashMap<String, String>,
    state: Arc<AppState>,
) -> Result<Json, Rejection> {
    let amount: f64 = query
        .get("amount")
        .ok_or_else(|| bad_request("Amount parameter is required"))?
        .parse()
        .map_err(|_| bad_request("Amount must be a number"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(bad_request("Amount must be zero or positive"));
    }

    let plazo: CetesPlazo = query
        .get("plazo")
        .ok_or_else(|| bad_request("Plazo parameter is required"))?
        .parse()
        .map_err(bad_request)?;

    // Callers may pin a rate; otherwise the term's current rate applies.
    let tasa: f64 = match query.get("tasa") {
        Some(t) => {
            let tasa = t.parse().map_err(|_| bad_request("Tasa must be a number"))?;
            if !(0.0..=100.0).contains(&tasa) {
                return Err(bad_request("Tasa must be between 0 and 100"));
            }
            tasa
        }
        None => current_rates(&state)
            .await
            .iter()
            .find(|r| r.plazo == plazo)
            .map(|r| r.tasa)
            .ok_or_else(|| bad_request("No current rate available for plazo"))?,
    };

    info!(
        "Handling calculation: amount={}, plazo={}, tasa={}",
        amount, plazo, tasa
    );

    let data = calculate_net_return(amount, tasa, plazo.days(), state.config.isr_retention_rate);
    Ok(warp::reply::json(&CalculationResponse {
        success: true,
        plazo,
        tasa,
        dias: plazo.days(),
        data,
    }))
}
