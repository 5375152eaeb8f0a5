// src/bin/fetch_rates.rs
// Smoke check against the live Banxico API.
use anyhow::Result;
use cetes_rates_backend::config::Config;
use cetes_rates_backend::services::banxico::BanxicoClient;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = Config::from_env();
    let client = BanxicoClient::new(&config.banxico_base_url, &config.banxico_token);

    for rate in client.fetch_rates().await {
        println!(
            "CETES {:>3} days: {:>5.2}% ({}, {:?}, source {:?})",
            rate.plazo.days(),
            rate.tasa,
            rate.fecha,
            rate.tendencia,
            rate.source
        );
    }
    Ok(())
}
