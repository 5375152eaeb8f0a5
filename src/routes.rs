// src/routes.rs
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::{ApiError, ApiErrorKind};
use crate::handlers::{calculator, historical, rates, update};
use crate::AppState;

// Add recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = match api_error.kind {
            ApiErrorKind::BadRequest => warp::http::StatusCode::BAD_REQUEST,
            ApiErrorKind::Unauthorized => warp::http::StatusCode::UNAUTHORIZED,
            ApiErrorKind::External | ApiErrorKind::Database => {
                warp::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        message = api_error.message.clone();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "success": false,
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let rates_route = warp::path!("api" / "v1" / "cetes")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(rates::get_cetes_rates);

    let historical_route = warp::path!("api" / "v1" / "cetes" / "historical")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(state_filter.clone())
        .and_then(historical::get_historical_data);

    let calculate_route = warp::path!("api" / "v1" / "cetes" / "calculate")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(state_filter.clone())
        .and_then(calculator::get_calculation);

    let manual_update_route = warp::path!("api" / "v1" / "admin" / "update-rates")
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(state_filter.clone())
        .and_then(update::post_update_rates);

    let cron_update_route = warp::path!("api" / "v1" / "cron" / "update-rates")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(state_filter.clone())
        .and_then(update::get_cron_update);

    info!("All routes configured successfully.");

    rates_route
        .or(historical_route)
        .or(calculate_route)
        .or(manual_update_route)
        .or(cron_update_route)
        .recover(handle_rejection)
}
