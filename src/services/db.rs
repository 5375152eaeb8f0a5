// src/services/db.rs
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::models::RatesSnapshot;
use crate::BoxError;

pub struct DbStore {
    pub(crate) pool: PgPool,
}

impl DbStore {
    pub async fn new(database_url: &str) -> Result<Self, BoxError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// The single row flagged `is_current`, if any.
    pub async fn get_current_rates(&self) -> Result<Option<RatesSnapshot>, BoxError> {
        let row = sqlx::query(
            r#"
            SELECT rate_28_days, rate_91_days, rate_182_days, rate_364_days, fetched_at
            FROM cetes_rates
            WHERE is_current = TRUE
            ORDER BY id DESC LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(r) => Some(RatesSnapshot {
                rate_28_days: r.try_get("rate_28_days")?,
                rate_91_days: r.try_get("rate_91_days")?,
                rate_182_days: r.try_get("rate_182_days")?,
                rate_364_days: r.try_get("rate_364_days")?,
                fetched_at: r.try_get::<DateTime<Utc>, _>("fetched_at")?,
            }),
            None => None,
        })
    }

    /// Flips the current-rates row: previous rows lose `is_current`, the new
    /// snapshot gains it. Both steps run in one transaction so a crash can
    /// never leave zero or duplicate current rows.
    pub async fn replace_current_rates(&self, snapshot: &RatesSnapshot) -> Result<(), BoxError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE cetes_rates SET is_current = FALSE WHERE is_current = TRUE")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO cetes_rates
                (rate_28_days, rate_91_days, rate_182_days, rate_364_days, is_current, fetched_at)
            VALUES ($1, $2, $3, $4, TRUE, $5)
            "#,
        )
        .bind(snapshot.rate_28_days)
        .bind(snapshot.rate_91_days)
        .bind(snapshot.rate_182_days)
        .bind(snapshot.rate_364_days)
        .bind(snapshot.fetched_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Appends an audit row for one update attempt, success or failure.
    pub async fn log_update(
        &self,
        success: bool,
        error_message: Option<&str>,
        rates: Option<&RatesSnapshot>,
    ) -> Result<(), BoxError> {
        let rates_json = rates.map(serde_json::to_value).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO rate_update_log (success, error_message, rates_fetched, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(success)
        .bind(error_message)
        .bind(rates_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
