//! Concrete external collaborators for the advisor pipeline
//!
//! Implementations of the `advisor-core` provider traits:
//! Yahoo Finance for metrics and price history, Firecrawl for news/sentiment
//! search, and Postgres (with optional Azure blob archival) for the report
//! sink. Each client maps its own failure modes onto the shared error
//! taxonomy; none of them retry.

pub mod firecrawl;
pub mod sink;
pub mod yahoo;

pub use firecrawl::FirecrawlClient;
pub use sink::{BlobArchive, PostgresReportSink};
pub use yahoo::YahooMetricsClient;
