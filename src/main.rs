use dotenv::dotenv;
use log::{error, info, warn};
use std::net::SocketAddr;
use warp::Filter;

use cetes_rates_backend::config::Config;
use cetes_rates_backend::services::db::DbStore;
use cetes_rates_backend::services::updater;
use cetes_rates_backend::{routes, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = Config::from_env();
    let port = config.port;
    info!("Using PORT: {}", port);

    let db = match config.database_url.as_deref() {
        Some(url) => match DbStore::new(url).await {
            Ok(db) => {
                info!("Connected to Postgres");
                Some(db)
            }
            Err(e) => {
                error!("Failed to connect to database, persistence disabled: {}", e);
                None
            }
        },
        None => {
            warn!("$DATABASE_URL not set, rate persistence disabled");
            None
        }
    };
    let has_db = db.is_some();

    let state = AppState::new(config, db);

    // Internal hourly tick; the job itself gates on business hours
    if has_db {
        if let Err(e) = updater::start_scheduler(state.clone()).await {
            error!("Failed to start rate-update scheduler: {}", e);
        }
    }

    // Bind to 0.0.0.0 for the hosting platform
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Will bind to: {}", addr);

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    // Set up routes
    let api = routes::routes(state).with(cors);
    info!("Routes configured successfully with CORS.");

    // Start the server
    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
}
