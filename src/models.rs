// src/models.rs
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four standard CETES terms, keyed to their official Banxico SIE series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CetesPlazo {
    #[serde(rename = "28")]
    Days28,
    #[serde(rename = "91")]
    Days91,
    #[serde(rename = "182")]
    Days182,
    #[serde(rename = "364")]
    Days364,
}

impl CetesPlazo {
    pub const ALL: [CetesPlazo; 4] = [
        CetesPlazo::Days28,
        CetesPlazo::Days91,
        CetesPlazo::Days182,
        CetesPlazo::Days364,
    ];

    pub fn days(self) -> u32 {
        match self {
            CetesPlazo::Days28 => 28,
            CetesPlazo::Days91 => 91,
            CetesPlazo::Days182 => 182,
            CetesPlazo::Days364 => 364,
        }
    }

    pub fn series_id(self) -> &'static str {
        match self {
            CetesPlazo::Days28 => "SF43936",
            CetesPlazo::Days91 => "SF43939",
            CetesPlazo::Days182 => "SF43942",
            CetesPlazo::Days364 => "SF43945",
        }
    }

    pub fn from_series_id(id: &str) -> Option<Self> {
        CetesPlazo::ALL.into_iter().find(|p| p.series_id() == id)
    }

    /// Static reference rate used when the SIE fetch for this term fails.
    pub fn fallback_rate(self) -> f64 {
        match self {
            CetesPlazo::Days28 => 9.10,
            CetesPlazo::Days91 => 9.02,
            CetesPlazo::Days182 => 8.96,
            CetesPlazo::Days364 => 9.06,
        }
    }
}

impl fmt::Display for CetesPlazo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

impl FromStr for CetesPlazo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "28" => Ok(CetesPlazo::Days28),
            "91" => Ok(CetesPlazo::Days91),
            "182" => Ok(CetesPlazo::Days182),
            "364" => Ok(CetesPlazo::Days364),
            other => Err(format!("Invalid plazo '{}' (expected 28, 91, 182 or 364)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Api,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CetesRate {
    pub plazo: CetesPlazo,
    /// Annualized rate, percent.
    pub tasa: f64,
    /// Publication date as reported by the SIE (dd/mm/yyyy).
    pub fecha: String,
    pub tendencia: Trend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diferencia: Option<f64>,
    pub source: RateSource,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub fecha: NaiveDate,
    pub tasa: f64,
}

/// Charting window for the historical endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    SixMonths,
    OneYear,
    FiveYears,
    Max,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::SixMonths => "6M",
            Period::OneYear => "1Y",
            Period::FiveYears => "5Y",
            Period::Max => "MAX",
        }
    }

    pub fn start_date(self, end: NaiveDate) -> NaiveDate {
        let months = match self {
            Period::SixMonths => 6,
            Period::OneYear => 12,
            Period::FiveYears => 60,
            // "MAX" is capped at ten years of history
            Period::Max => 120,
        };
        end.checked_sub_months(Months::new(months)).unwrap_or(end)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "6M" => Ok(Period::SixMonths),
            "1Y" => Ok(Period::OneYear),
            "5Y" => Ok(Period::FiveYears),
            "MAX" => Ok(Period::Max),
            other => Err(format!("Invalid period '{}' (expected 6M, 1Y, 5Y or MAX)", other)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesResponse {
    pub success: bool,
    pub data: Vec<CetesRate>,
    pub last_updated: DateTime<Utc>,
    pub source: RateSource,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalResponse {
    pub success: bool,
    pub data: Vec<HistoricalPoint>,
    pub period: &'static str,
    pub plazo: CetesPlazo,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub gross_return: f64,
    pub isr_retention: f64,
    pub net_return: f64,
    pub total_amount: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub success: bool,
    pub plazo: CetesPlazo,
    pub tasa: f64,
    pub dias: u32,
    pub data: CalculationResult,
}

/// One persisted rates snapshot (the `cetes_rates` table row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesSnapshot {
    pub rate_28_days: f64,
    pub rate_91_days: f64,
    pub rate_182_days: f64,
    pub rate_364_days: f64,
    pub fetched_at: DateTime<Utc>,
}

impl RatesSnapshot {
    pub fn rate_for(&self, plazo: CetesPlazo) -> f64 {
        match plazo {
            CetesPlazo::Days28 => self.rate_28_days,
            CetesPlazo::Days91 => self.rate_91_days,
            CetesPlazo::Days182 => self.rate_182_days,
            CetesPlazo::Days364 => self.rate_364_days,
        }
    }

    pub fn set_rate(&mut self, plazo: CetesPlazo, rate: f64) {
        match plazo {
            CetesPlazo::Days28 => self.rate_28_days = rate,
            CetesPlazo::Days91 => self.rate_91_days = rate,
            CetesPlazo::Days182 => self.rate_182_days = rate,
            CetesPlazo::Days364 => self.rate_364_days = rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn plazo_roundtrips_through_serde_as_day_count() {
        let json = serde_json::to_string(&CetesPlazo::Days91).unwrap();
        assert_eq!(json, r#""91""#);
        let back: CetesPlazo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CetesPlazo::Days91);
    }

    #[test]
    fn plazo_parses_from_query_strings() {
        assert_eq!("28".parse::<CetesPlazo>().unwrap(), CetesPlazo::Days28);
        assert_eq!(" 364 ".parse::<CetesPlazo>().unwrap(), CetesPlazo::Days364);
        assert!("90".parse::<CetesPlazo>().is_err());
    }

    #[test]
    fn period_windows_count_back_from_the_end_date() {
        let end = NaiveDate::from_ymd_opt(2025, 8, 25).unwrap();
        assert_eq!(
            Period::SixMonths.start_date(end),
            NaiveDate::from_ymd_opt(2025, 2, 25).unwrap()
        );
        assert_eq!(
            Period::OneYear.start_date(end),
            NaiveDate::from_ymd_opt(2024, 8, 25).unwrap()
        );
        assert_eq!(
            Period::Max.start_date(end),
            NaiveDate::from_ymd_opt(2015, 8, 25).unwrap()
        );
    }

    #[test]
    fn period_parsing_is_case_insensitive() {
        assert_eq!("max".parse::<Period>().unwrap(), Period::Max);
        assert_eq!("6m".parse::<Period>().unwrap(), Period::SixMonths);
        assert!("2Y".parse::<Period>().is_err());
    }
}
