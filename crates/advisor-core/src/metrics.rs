//! Market-data snapshot types consumed by the quantitative stage

use serde::{Deserialize, Serialize};

/// Fundamental metrics for one ticker at one point in time
///
/// Produced once per quant run and never mutated or cached. Unavailable
/// fields stay `None` and render as an explicit "N/A" marker; omitting them
/// outright would silently corrupt the downstream risk evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub beta: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub analyst_recommendation: Option<String>,
}

/// Marker rendered for metrics the provider could not supply
pub const NOT_AVAILABLE: &str = "N/A";

/// Render an optional metric, falling back to the explicit "N/A" marker
pub fn render_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Format market cap in human-readable form
pub fn format_market_cap(cap: Option<f64>) -> String {
    let Some(cap) = cap else {
        return NOT_AVAILABLE.to_string();
    };
    if cap >= 1_000_000_000_000.0 {
        format!("${:.2}T", cap / 1_000_000_000_000.0)
    } else if cap >= 1_000_000_000.0 {
        format!("${:.2}B", cap / 1_000_000_000.0)
    } else if cap >= 1_000_000.0 {
        format!("${:.2}M", cap / 1_000_000.0)
    } else {
        format!("${cap:.2}")
    }
}

/// Percentage returns of a subject ticker and its benchmark over a trailing
/// window, computed from the first and last available closes only
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RelativePerformance {
    pub subject_return_pct: f64,
    pub benchmark_return_pct: f64,
}

impl RelativePerformance {
    /// `(end - start) / start * 100`, the only formula used for window returns
    pub fn percentage_return(start_price: f64, end_price: f64) -> f64 {
        (end_price - start_price) / start_price * 100.0
    }

    /// Subject return minus benchmark return, in percentage points
    pub fn spread_pct(&self) -> f64 {
        self.subject_return_pct - self.benchmark_return_pct
    }

    /// True when the subject beat the benchmark over the window
    pub fn outperformed(&self) -> bool {
        self.spread_pct() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_return_uses_endpoints_only() {
        // Intermediate closes (110, 90) must not influence the result.
        let series = [100.0, 110.0, 90.0, 120.0];
        let pct = RelativePerformance::percentage_return(series[0], series[series.len() - 1]);
        assert!((pct - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_metric_na_marker() {
        assert_eq!(render_metric(None), "N/A");
        assert_eq!(render_metric(Some(1.5)), "1.50");
    }

    #[test]
    fn test_format_market_cap() {
        assert_eq!(format_market_cap(Some(1_500_000_000_000.0)), "$1.50T");
        assert_eq!(format_market_cap(Some(50_000_000_000.0)), "$50.00B");
        assert_eq!(format_market_cap(Some(250_000_000.0)), "$250.00M");
        assert_eq!(format_market_cap(None), "N/A");
    }

    #[test]
    fn test_spread_and_outperformance() {
        let perf = RelativePerformance {
            subject_return_pct: -30.0,
            benchmark_return_pct: 8.0,
        };
        assert!((perf.spread_pct() + 38.0).abs() < f64::EPSILON);
        assert!(!perf.outperformed());
    }
}
