// src/services/updater.rs
use chrono::{Datelike, Timelike, Utc, Weekday};
use chrono_tz::America::Mexico_City;
use log::{error, info};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::models::RatesSnapshot;
use crate::services::banxico::BanxicoClient;
use crate::services::db::DbStore;
use crate::{AppState, BoxError};

/// Banxico publishes CETES results on business days; scheduled runs only act
/// at these local hours.
const UPDATE_HOURS: [u32; 2] = [6, 13];

#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(RatesSnapshot),
    Skipped(&'static str),
}

/// Fetches fresh rates and flips the persisted current row, appending an
/// audit-log row either way. Scheduled callers leave `force` off and get the
/// business-day / publication-hour gate; the admin endpoint forces through.
pub async fn run_update(
    banxico: &BanxicoClient,
    db: &DbStore,
    force: bool,
) -> Result<UpdateOutcome, BoxError> {
    if !force {
        let now = Utc::now().with_timezone(&Mexico_City);

        if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
            info!("Rate update skipped: weekend day");
            db.log_update(false, Some("Skipped: Weekend day"), None).await?;
            return Ok(UpdateOutcome::Skipped("Not a business day"));
        }

        if !UPDATE_HOURS.contains(&now.hour()) {
            info!("Rate update skipped: {}h is outside publication hours", now.hour());
            return Ok(UpdateOutcome::Skipped("Not a scheduled hour (06:00 or 13:00 Mexico City)"));
        }
    }

    let snapshot = match banxico.fetch_latest_all().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("Rate update failed fetching from Banxico: {}", e);
            if let Err(log_err) = db.log_update(false, Some(&e.to_string()), None).await {
                error!("Failed to append audit row: {}", log_err);
            }
            return Err(e);
        }
    };

    if let Err(e) = db.replace_current_rates(&snapshot).await {
        error!("Rate update failed persisting snapshot: {}", e);
        if let Err(log_err) = db.log_update(false, Some(&e.to_string()), None).await {
            error!("Failed to append audit row: {}", log_err);
        }
        return Err(e);
    }

    db.log_update(true, None, Some(&snapshot)).await?;
    info!("Persisted new current rates fetched at {}", snapshot.fetched_at);
    Ok(UpdateOutcome::Updated(snapshot))
}

/// Hourly tick; `run_update` itself decides whether this hour is actionable.
pub async fn start_scheduler(state: Arc<AppState>) -> Result<(), BoxError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            let Some(db) = state.db.as_ref() else {
                return;
            };
            match run_update(&state.banxico, db, false).await {
                Ok(UpdateOutcome::Updated(snapshot)) => {
                    info!("Scheduled update stored rates from {}", snapshot.fetched_at)
                }
                Ok(UpdateOutcome::Skipped(reason)) => {
                    info!("Scheduled update skipped: {}", reason)
                }
                Err(e) => error!("Scheduled update failed: {}", e),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    info!("Rate-update scheduler started (hourly tick)");
    Ok(())
}
