// src/bin/setup_db.rs
use anyhow::Result;
use dotenv::dotenv;
use sqlx::PgPool;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Get database URL from environment
    let database_url = env::var("DATABASE_URL")?;

    // Connect to database
    let pool = PgPool::connect(&database_url).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cetes_rates (
            id BIGSERIAL PRIMARY KEY,
            rate_28_days DOUBLE PRECISION NOT NULL,
            rate_91_days DOUBLE PRECISION NOT NULL,
            rate_182_days DOUBLE PRECISION NOT NULL,
            rate_364_days DOUBLE PRECISION NOT NULL,
            is_current BOOLEAN NOT NULL DEFAULT FALSE,
            fetched_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS cetes_rates_is_current_idx ON cetes_rates (is_current) WHERE is_current",
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rate_update_log (
            id BIGSERIAL PRIMARY KEY,
            success BOOLEAN NOT NULL,
            error_message TEXT,
            rates_fetched JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(&pool)
    .await?;

    println!("Database tables created");
    Ok(())
}
