// src/services/banxico.rs
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use log::{error, info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{CetesPlazo, CetesRate, HistoricalPoint, RateSource, RatesSnapshot, Trend};
use crate::BoxError;

/// Trend deltas within +/- this band count as neutral (percentage points).
const TREND_THRESHOLD: f64 = 0.05;

/// Trailing window used for trend classification.
const TREND_WINDOW_DAYS: i64 = 30;

/// Publication date stamped on fallback entries.
const FALLBACK_FECHA: &str = "31/03/2025";

#[derive(Debug, Deserialize)]
struct SieResponse {
    bmx: SieBody,
}

#[derive(Debug, Deserialize)]
struct SieBody {
    #[serde(default)]
    series: Vec<SieSeries>,
}

#[derive(Debug, Deserialize)]
struct SieSeries {
    #[serde(rename = "idSerie")]
    id_serie: String,
    #[serde(default)]
    datos: Vec<SieDato>,
}

#[derive(Debug, Deserialize)]
struct SieDato {
    fecha: String,
    dato: String,
}

impl SieDato {
    /// SIE publishes values as strings, with "N/E" for gaps.
    fn value(&self) -> Option<f64> {
        self.dato.trim().parse::<f64>().ok()
    }

    fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.fecha.trim(), "%d/%m/%Y").ok()
    }
}

pub struct BanxicoClient {
    http: Client,
    base_url: String,
    token: String,
}

impl BanxicoClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    async fn get_series(&self, path: &str) -> Result<Vec<SieSeries>, BoxError> {
        let url = format!("{}/series/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header("Bmx-Token", &self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("Banxico API error: {}", response.status()).into());
        }

        let body: SieResponse = response.json().await?;
        Ok(body.bmx.series)
    }

    /// Most recent published observation for one term.
    async fn fetch_latest(&self, plazo: CetesPlazo) -> Result<SieDato, BoxError> {
        let series = self
            .get_series(&format!("{}/datos/oportuno", plazo.series_id()))
            .await?;

        series
            .into_iter()
            .next()
            .and_then(|s| s.datos.into_iter().next())
            .ok_or_else(|| format!("No data for CETES {} days", plazo.days()).into())
    }

    /// Raw observations for one term between two dates, oldest first.
    async fn fetch_range(
        &self,
        plazo: CetesPlazo,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SieDato>, BoxError> {
        let series = self
            .get_series(&format!(
                "{}/datos/{}/{}",
                plazo.series_id(),
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d"),
            ))
            .await?;

        Ok(series.into_iter().next().map(|s| s.datos).unwrap_or_default())
    }

    /// Live rate + trend for one term. Any failure here resolves to the
    /// static fallback in `fetch_rates`.
    async fn fetch_term(&self, plazo: CetesPlazo) -> Result<CetesRate, BoxError> {
        let latest = self.fetch_latest(plazo).await?;
        let tasa = latest
            .value()
            .ok_or_else(|| format!("Unparsable rate '{}' for CETES {}", latest.dato, plazo.days()))?;

        // Trend needs a trailing window ending at the observation date. A
        // failed window fetch degrades the trend, never the rate itself.
        let (tendencia, diferencia) = match latest.date() {
            Some(end) => {
                let start = end - ChronoDuration::days(TREND_WINDOW_DAYS);
                match self.fetch_range(plazo, start, end).await {
                    Ok(datos) => {
                        let history: Vec<f64> = datos.iter().filter_map(|d| d.value()).collect();
                        classify_trend(tasa, &history)
                    }
                    Err(e) => {
                        warn!("Trend window fetch failed for CETES {}: {}", plazo.days(), e);
                        (Trend::Down, None)
                    }
                }
            }
            None => (Trend::Down, None),
        };

        Ok(CetesRate {
            plazo,
            tasa,
            fecha: latest.fecha,
            tendencia,
            diferencia,
            source: RateSource::Api,
            last_updated: Utc::now(),
        })
    }

    /// Current rates for all four terms, fetched concurrently. Failures are
    /// isolated per term and resolved with the static reference table, so the
    /// result always holds exactly four entries.
    pub async fn fetch_rates(&self) -> Vec<CetesRate> {
        let (r28, r91, r182, r364) = tokio::join!(
            self.fetch_term(CetesPlazo::Days28),
            self.fetch_term(CetesPlazo::Days91),
            self.fetch_term(CetesPlazo::Days182),
            self.fetch_term(CetesPlazo::Days364),
        );

        CetesPlazo::ALL
            .into_iter()
            .zip([r28, r91, r182, r364])
            .map(|(plazo, result)| match result {
                Ok(rate) => rate,
                Err(e) => {
                    error!("Falling back to reference rate for CETES {}: {}", plazo.days(), e);
                    fallback_rate(plazo)
                }
            })
            .collect()
    }

    /// Historical series for the charting endpoint. Unlike `fetch_rates`,
    /// errors here propagate to the caller.
    pub async fn fetch_historical(
        &self,
        plazo: CetesPlazo,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HistoricalPoint>, BoxError> {
        let datos = self.fetch_range(plazo, start, end).await?;
        let points: Vec<HistoricalPoint> = datos
            .iter()
            .filter_map(|d| {
                Some(HistoricalPoint {
                    fecha: d.date()?,
                    tasa: d.value()?,
                })
            })
            .collect();

        info!(
            "Fetched {} historical points for CETES {} ({} raw)",
            points.len(),
            plazo.days(),
            datos.len()
        );
        Ok(points)
    }

    /// Latest observation for all four terms in one combined-series request.
    /// Used by the persistence job; errors unless at least one term parses.
    pub async fn fetch_latest_all(&self) -> Result<RatesSnapshot, BoxError> {
        let ids: Vec<&str> = CetesPlazo::ALL.iter().map(|p| p.series_id()).collect();
        let series = self
            .get_series(&format!("{}/datos/oportuno", ids.join(",")))
            .await?;

        let mut snapshot = RatesSnapshot {
            rate_28_days: 0.0,
            rate_91_days: 0.0,
            rate_182_days: 0.0,
            rate_364_days: 0.0,
            fetched_at: Utc::now(),
        };

        let mut valid = 0;
        for serie in &series {
            let Some(plazo) = CetesPlazo::from_series_id(&serie.id_serie) else {
                continue;
            };
            if let Some(rate) = serie.datos.first().and_then(|d| d.value()) {
                snapshot.set_rate(plazo, rate);
                valid += 1;
            }
        }

        if valid == 0 {
            return Err("No valid rates received from Banxico API".into());
        }
        info!("Fetched {}/4 current rates from Banxico", valid);
        Ok(snapshot)
    }
}

/// Static reference entry used whenever a term's live fetch fails.
pub fn fallback_rate(plazo: CetesPlazo) -> CetesRate {
    CetesRate {
        plazo,
        tasa: plazo.fallback_rate(),
        fecha: FALLBACK_FECHA.to_string(),
        tendencia: Trend::Down,
        diferencia: None,
        source: RateSource::Fallback,
        last_updated: Utc::now(),
    }
}

/// Compares the current rate against a point ~70% through the trailing
/// window. Fewer than 2 points degrades to `down`.
pub fn classify_trend(current: f64, history: &[f64]) -> (Trend, Option<f64>) {
    if history.len() < 2 {
        return (Trend::Down, None);
    }

    let idx = usize::min(
        (history.len() as f64 * 0.7).floor() as usize,
        history.len() - 2,
    );
    let diferencia = current - history[idx];

    let tendencia = if diferencia > TREND_THRESHOLD {
        Trend::Up
    } else if diferencia < -TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Neutral
    };
    (tendencia, Some(diferencia))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10 points puts the sampled index at min(7, 8) = 7.
    fn window_with_sample(sampled: f64) -> Vec<f64> {
        let mut history = vec![9.50; 10];
        history[7] = sampled;
        history
    }

    #[test]
    fn rising_rate_classifies_up() {
        let (trend, delta) = classify_trend(10.00, &window_with_sample(9.90));
        assert_eq!(trend, Trend::Up);
        assert!((delta.unwrap() - 0.10).abs() < 1e-9);
    }

    #[test]
    fn small_delta_classifies_neutral() {
        let (trend, delta) = classify_trend(10.00, &window_with_sample(10.02));
        assert_eq!(trend, Trend::Neutral);
        assert!((delta.unwrap() + 0.02).abs() < 1e-9);
    }

    #[test]
    fn falling_rate_classifies_down() {
        let (trend, delta) = classify_trend(10.00, &window_with_sample(10.10));
        assert_eq!(trend, Trend::Down);
        assert!((delta.unwrap() + 0.10).abs() < 1e-9);
    }

    #[test]
    fn exact_threshold_is_neutral() {
        let (trend, _) = classify_trend(10.05, &window_with_sample(10.00));
        assert_eq!(trend, Trend::Neutral);
    }

    #[test]
    fn short_history_degrades_to_down() {
        assert_eq!(classify_trend(10.0, &[]), (Trend::Down, None));
        assert_eq!(classify_trend(10.0, &[9.9]), (Trend::Down, None));
    }

    #[test]
    fn two_point_history_samples_the_first() {
        // len 2: idx = min(1, 0) = 0
        let (trend, delta) = classify_trend(10.00, &[9.80, 10.00]);
        assert_eq!(trend, Trend::Up);
        assert!((delta.unwrap() - 0.20).abs() < 1e-9);
    }

    #[test]
    fn sie_payload_parses_rates_and_gaps() {
        let dato = SieDato {
            fecha: "15/08/2025".into(),
            dato: "7.65".into(),
        };
        assert_eq!(dato.value(), Some(7.65));
        assert_eq!(
            dato.date(),
            NaiveDate::from_ymd_opt(2025, 8, 15)
        );

        let gap = SieDato {
            fecha: "16/08/2025".into(),
            dato: "N/E".into(),
        };
        assert_eq!(gap.value(), None);
    }
}
