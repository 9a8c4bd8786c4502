//! Yahoo Finance metrics provider

use advisor_core::{
    AdvisorError, MetricsProvider, MetricsSnapshot, RelativePerformance, Result, Ticker,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const QUOTE_SUMMARY_MODULES: &str = "summaryDetail,defaultKeyStatistics,financialData";

/// Yahoo Finance client implementing [`MetricsProvider`]
///
/// Fundamentals come from the `quoteSummary` endpoint; the relative
/// performance window is computed from daily close history via
/// `yahoo_finance_api`, using only the first and last closes in the window.
#[derive(Debug, Clone)]
pub struct YahooMetricsClient {
    client: Client,
}

/// Yahoo wraps numeric fields as `{"raw": 1.23, "fmt": "1.23"}`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

impl RawValue {
    fn value(self) -> Option<f64> {
        self.raw
    }
}

fn raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(RawValue::value)
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<QuoteSummaryModules>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryModules {
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
    financial_data: Option<FinancialData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    beta: Option<RawValue>,
    market_cap: Option<RawValue>,
    fifty_two_week_high: Option<RawValue>,
    fifty_two_week_low: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    trailing_eps: Option<RawValue>,
    peg_ratio: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    current_price: Option<RawValue>,
    recommendation_key: Option<String>,
}

impl YahooMetricsClient {
    /// Create a new client with the given request timeout
    pub fn new(request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    fn parse_summary(ticker: &Ticker, envelope: QuoteSummaryEnvelope) -> Result<MetricsSnapshot> {
        if let Some(error) = envelope.quote_summary.error {
            return Err(AdvisorError::data_unavailable(
                ticker.as_str(),
                "metrics",
                format!("Yahoo quoteSummary error: {error}"),
            ));
        }
        let modules = envelope
            .quote_summary
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| {
                AdvisorError::data_unavailable(
                    ticker.as_str(),
                    "metrics",
                    "Yahoo quoteSummary returned no result",
                )
            })?;

        let detail = modules.summary_detail.unwrap_or_default();
        let stats = modules.default_key_statistics.unwrap_or_default();
        let financial = modules.financial_data.unwrap_or_default();

        Ok(MetricsSnapshot {
            current_price: raw(financial.current_price),
            market_cap: raw(detail.market_cap),
            trailing_pe: raw(detail.trailing_pe),
            forward_pe: raw(detail.forward_pe),
            peg_ratio: raw(stats.peg_ratio),
            beta: raw(detail.beta),
            trailing_eps: raw(stats.trailing_eps),
            fifty_two_week_high: raw(detail.fifty_two_week_high),
            fifty_two_week_low: raw(detail.fifty_two_week_low),
            analyst_recommendation: financial.recommendation_key,
        })
    }

    /// Percentage return over the window from the first and last closes
    async fn window_return(&self, ticker: &Ticker, window_days: u32) -> Result<f64> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| AdvisorError::data_unavailable(ticker.as_str(), "performance", e))?;

        let end = OffsetDateTime::now_utc();
        let start = end - time::Duration::days(i64::from(window_days));

        let response = provider
            .get_quote_history(ticker.as_str(), start, end)
            .await
            .map_err(|e| AdvisorError::data_unavailable(ticker.as_str(), "performance", e))?;

        let quotes = response
            .quotes()
            .map_err(|e| AdvisorError::data_unavailable(ticker.as_str(), "performance", e))?;

        let (first, last) = match (quotes.first(), quotes.last()) {
            (Some(first), Some(last)) if quotes.len() >= 2 => (first.close, last.close),
            _ => {
                return Err(AdvisorError::data_unavailable(
                    ticker.as_str(),
                    "performance",
                    format!("only {} close prices in the window", quotes.len()),
                ));
            }
        };
        if first <= 0.0 {
            return Err(AdvisorError::data_unavailable(
                ticker.as_str(),
                "performance",
                format!("non-positive starting close {first}"),
            ));
        }

        debug!(ticker = %ticker, first, last, "computed window return");
        Ok(RelativePerformance::percentage_return(first, last))
    }
}

#[async_trait]
impl MetricsProvider for YahooMetricsClient {
    async fn snapshot(&self, ticker: &Ticker) -> Result<MetricsSnapshot> {
        let url = format!("{QUOTE_SUMMARY_URL}/{}", ticker.as_str());
        let response = self
            .client
            .get(&url)
            .query(&[("modules", QUOTE_SUMMARY_MODULES)])
            .send()
            .await
            .map_err(|e| AdvisorError::data_unavailable(ticker.as_str(), "metrics", e))?;

        if !response.status().is_success() {
            return Err(AdvisorError::data_unavailable(
                ticker.as_str(),
                "metrics",
                format!("Yahoo quoteSummary returned HTTP {}", response.status()),
            ));
        }

        let envelope: QuoteSummaryEnvelope = response
            .json()
            .await
            .map_err(|e| AdvisorError::data_unavailable(ticker.as_str(), "metrics", e))?;

        Self::parse_summary(ticker, envelope)
    }

    async fn relative_performance(
        &self,
        subject: &Ticker,
        benchmark: &Ticker,
        window_days: u32,
    ) -> Result<RelativePerformance> {
        let subject_return_pct = self.window_return(subject, window_days).await?;
        let benchmark_return_pct = self.window_return(benchmark, window_days).await?;
        Ok(RelativePerformance {
            subject_return_pct,
            benchmark_return_pct,
        })
    }
}
