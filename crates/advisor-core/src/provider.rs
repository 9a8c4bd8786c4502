//! Traits behind which every external collaborator lives
//!
//! The pipeline only ever sees these seams. Concrete implementations
//! (Yahoo Finance, Firecrawl, Postgres + blob archive) live in the
//! `advisor-providers` crate; tests substitute doubles.

use crate::error::Result;
use crate::metrics::{MetricsSnapshot, RelativePerformance};
use crate::report::{Document, Recommendation, ReferenceHandle};
use crate::ticker::Ticker;
use async_trait::async_trait;

/// Source of fundamental metrics and historical price performance
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Fetch the current fundamental metrics for a ticker
    ///
    /// Unavailable fields come back as `None`; a provider that cannot be
    /// reached at all fails with `DataUnavailable`.
    async fn snapshot(&self, ticker: &Ticker) -> Result<MetricsSnapshot>;

    /// Percentage returns of subject vs. benchmark over a trailing window,
    /// computed from the first and last available closes in the window
    async fn relative_performance(
        &self,
        subject: &Ticker,
        benchmark: &Ticker,
        window_days: u32,
    ) -> Result<RelativePerformance>;
}

/// Source of ranked news/sentiment documents for a free-text query
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Return up to `limit` documents relevant to the query
    ///
    /// Zero results is a valid (degraded) outcome, not an error.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Document>>;
}

/// Durable store for finished recommendations
///
/// Writes are append-only; concurrent runs for different tickers must never
/// interleave-corrupt the persisted log.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist the rendered recommendation, returning a retrievable handle
    async fn persist(
        &self,
        ticker: &Ticker,
        recommendation: &Recommendation,
    ) -> Result<ReferenceHandle>;
}
