// src/services/calculations.rs
use crate::models::CalculationResult;

/// Net return of a CETES position held to maturity.
///
/// Gross interest follows the 360-day discount-market convention; the ISR
/// provisional retention is prorated over the 365-day tax year and applies to
/// the invested capital, not the interest.
pub fn calculate_net_return(amount: f64, rate: f64, days: u32, isr_rate: f64) -> CalculationResult {
    let days = days as f64;
    let gross_return = amount * rate * days / (100.0 * 360.0);
    let isr_retention = amount * isr_rate * days / 365.0;
    let net_return = gross_return - isr_retention;

    CalculationResult {
        gross_return,
        isr_retention,
        net_return,
        total_amount: amount + net_return,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ISR_RETENTION_RATE;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn gross_return_uses_the_360_day_convention() {
        let r = calculate_net_return(100_000.0, 10.0, 360, 0.0);
        assert_close(r.gross_return, 10_000.0);
        assert_close(r.net_return, 10_000.0);
        assert_close(r.total_amount, 110_000.0);
    }

    #[test]
    fn retention_uses_the_365_day_convention() {
        let r = calculate_net_return(100_000.0, 0.0, 365, 0.005);
        assert_close(r.gross_return, 0.0);
        assert_close(r.isr_retention, 500.0);
        assert_close(r.net_return, -500.0);
    }

    #[test]
    fn zero_amount_yields_all_zeros() {
        let r = calculate_net_return(0.0, 9.5, 91, DEFAULT_ISR_RETENTION_RATE);
        assert_eq!(r.gross_return, 0.0);
        assert_eq!(r.isr_retention, 0.0);
        assert_eq!(r.net_return, 0.0);
        assert_eq!(r.total_amount, 0.0);
    }

    #[test]
    fn worked_example_91_days() {
        // 10,000 MXN at 9.02% for 91 days, 0.50% ISR retention
        let r = calculate_net_return(10_000.0, 9.02, 91, 0.005);
        assert_close(r.gross_return, 10_000.0 * 9.02 * 91.0 / 36_000.0);
        assert_close(r.isr_retention, 10_000.0 * 0.005 * 91.0 / 365.0);
        assert!((r.gross_return - 228.0056).abs() < 1e-3);
        assert!((r.isr_retention - 12.4658).abs() < 1e-3);
        assert!((r.net_return - 215.5398).abs() < 1e-3);
        assert!((r.total_amount - 10_215.5398).abs() < 1e-3);
    }
}
