//! Quantitative analysis stage

use advisor_core::metrics::{format_market_cap, render_metric};
use advisor_core::{
    AdvisorConfig, MetricsProvider, MetricsSnapshot, QuantReport, RelativePerformance, Result,
    RiskFlag, Ticker,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// First pipeline stage: strictly data-driven analysis of one ticker
///
/// A pure transformation over provider responses. No narrative content
/// enters this stage; the assessment is derived entirely from the snapshot,
/// the relative-performance window, and the risk predicates. No side
/// effects, no caching.
pub struct QuantStage {
    metrics: Arc<dyn MetricsProvider>,
    config: Arc<AdvisorConfig>,
}

impl QuantStage {
    pub fn new(metrics: Arc<dyn MetricsProvider>, config: Arc<AdvisorConfig>) -> Self {
        Self { metrics, config }
    }

    /// Produce the five-section quantitative report for a ticker
    ///
    /// Fails with `DataUnavailable` when either provider call does; it never
    /// fabricates placeholder numbers beyond the explicit "N/A" markers.
    pub async fn produce(&self, ticker: &Ticker) -> Result<QuantReport> {
        info!(ticker = %ticker, "quant stage started");

        let snapshot = self.metrics.snapshot(ticker).await?;
        let performance = self
            .metrics
            .relative_performance(
                ticker,
                &self.config.benchmark_ticker,
                self.config.performance_window_days,
            )
            .await?;

        let risk_flags = evaluate_risk_flags(&snapshot, &performance, &self.config);
        debug!(ticker = %ticker, flags = risk_flags.len(), "risk predicates evaluated");

        let report = QuantReport {
            ticker: ticker.clone(),
            valuation: render_valuation(&snapshot),
            volatility: render_volatility(&snapshot, &self.config),
            relative_performance: render_performance(&performance, &self.config),
            assessment: render_assessment(&snapshot, &performance, &risk_flags, &self.config),
            risk_flags,
            generated_at: Utc::now(),
        };

        info!(ticker = %ticker, flags = report.risk_flags.len(), "quant stage complete");
        Ok(report)
    }
}

/// Evaluate the four risk predicates against the snapshot and performance
///
/// A predicate that cannot be evaluated because its metric is unavailable
/// does not fire; the "N/A" marker in the rendered sections makes the gap
/// visible instead.
pub fn evaluate_risk_flags(
    snapshot: &MetricsSnapshot,
    performance: &RelativePerformance,
    config: &AdvisorConfig,
) -> Vec<RiskFlag> {
    let mut flags = Vec::new();

    if eps_negative_or_declining(snapshot) {
        flags.push(RiskFlag::NegativeOrDecliningEps);
    }

    if let Some(pe) = snapshot.trailing_pe {
        if pe > config.pe_threshold() {
            flags.push(RiskFlag::ElevatedPe);
        }
    }

    if let Some(beta) = snapshot.beta {
        if beta > config.beta_volatility_threshold {
            flags.push(RiskFlag::HighBeta);
        }
    }

    if performance.spread_pct() <= -config.drawdown_threshold {
        flags.push(RiskFlag::ExtremeDrawdown);
    }

    flags
}

/// Negative trailing EPS, or an expected decline implied by the forward
/// P/E sitting above the trailing P/E at the same price
fn eps_negative_or_declining(snapshot: &MetricsSnapshot) -> bool {
    if matches!(snapshot.trailing_eps, Some(eps) if eps <= 0.0) {
        return true;
    }
    match (snapshot.trailing_pe, snapshot.forward_pe) {
        (Some(trailing), Some(forward)) => forward > trailing,
        _ => false,
    }
}

fn render_valuation(snapshot: &MetricsSnapshot) -> String {
    format!(
        "Current price: {price} | Market cap: {cap} | P/E (trailing): {pe} | \
         Forward P/E: {fpe} | PEG: {peg} | EPS (trailing): {eps} | \
         52-week range: {low} – {high} | Analyst recommendation: {rec}",
        price = render_metric(snapshot.current_price),
        cap = format_market_cap(snapshot.market_cap),
        pe = render_metric(snapshot.trailing_pe),
        fpe = render_metric(snapshot.forward_pe),
        peg = render_metric(snapshot.peg_ratio),
        eps = render_metric(snapshot.trailing_eps),
        low = render_metric(snapshot.fifty_two_week_low),
        high = render_metric(snapshot.fifty_two_week_high),
        rec = snapshot.analyst_recommendation.as_deref().unwrap_or("none"),
    )
}

fn render_volatility(snapshot: &MetricsSnapshot, config: &AdvisorConfig) -> String {
    match snapshot.beta {
        Some(beta) => format!(
            "Beta: {beta:.2} - {}",
            interpret_beta(beta, config.beta_volatility_threshold)
        ),
        None => "Beta: N/A - volatility relative to the market could not be assessed".to_string(),
    }
}

/// Interpret beta relative to the configured volatility threshold
fn interpret_beta(beta: f64, threshold: f64) -> String {
    if beta > threshold {
        format!("high volatility versus the market (above the {threshold:.2} threshold)")
    } else if beta >= 0.8 {
        "volatility roughly in line with the market".to_string()
    } else {
        "lower volatility than the market".to_string()
    }
}

fn render_performance(performance: &RelativePerformance, config: &AdvisorConfig) -> String {
    let months = config.performance_window_days / 30;
    let stance = if performance.outperformed() {
        "outperformed"
    } else {
        "underperformed"
    };
    format!(
        "{months}-month return: {subject:+.1}% vs {benchmark} {bench:+.1}% - {stance} the \
         benchmark by {spread:.1} percentage points",
        subject = performance.subject_return_pct,
        benchmark = config.benchmark_ticker,
        bench = performance.benchmark_return_pct,
        spread = performance.spread_pct().abs(),
    )
}

/// Two to four objective sentences, strictly derived from the inputs
fn render_assessment(
    snapshot: &MetricsSnapshot,
    performance: &RelativePerformance,
    flags: &[RiskFlag],
    config: &AdvisorConfig,
) -> String {
    let valuation = match snapshot.trailing_pe {
        Some(pe) if pe > config.pe_threshold() => format!(
            "Valuation looks stretched: trailing P/E {pe:.1} sits above {threshold:.0} \
             ({multiple:.0}x the sector norm of {norm:.0}).",
            threshold = config.pe_threshold(),
            multiple = config.sector_pe_multiple,
            norm = config.sector_pe_norm,
        ),
        Some(pe) if pe <= 0.0 => format!("Trailing P/E of {pe:.1} reflects negative earnings."),
        Some(pe) => format!(
            "Valuation is within range: trailing P/E {pe:.1} against a sector norm of {norm:.0}.",
            norm = config.sector_pe_norm,
        ),
        None => "Trailing P/E is not available, limiting the valuation read.".to_string(),
    };

    let momentum = format!(
        "The stock {} its benchmark by {:.1} percentage points over the trailing window.",
        if performance.outperformed() {
            "led"
        } else {
            "trailed"
        },
        performance.spread_pct().abs(),
    );

    let risk = if flags.is_empty() {
        "No quantitative risk predicate fired.".to_string()
    } else {
        format!(
            "{} of 4 quantitative risk predicates fired, indicating weak fundamentals.",
            flags.len()
        )
    };

    format!("{valuation} {momentum} {risk}")
}
