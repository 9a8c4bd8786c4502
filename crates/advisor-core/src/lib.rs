//! Core domain types and seams for the equity advisor pipeline
//!
//! This crate defines the data contract between the quantitative and
//! strategist stages, the error taxonomy, the configuration surface, and the
//! traits behind which every external collaborator (market data, sentiment
//! search, report persistence) lives.

pub mod config;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod report;
pub mod ticker;

pub use config::{AdvisorConfig, AdvisorConfigBuilder};
pub use error::{AdvisorError, Result};
pub use metrics::{MetricsSnapshot, RelativePerformance};
pub use provider::{MetricsProvider, ReportSink, SentimentProvider};
pub use report::{
    Confidence, Document, QuantReport, Recommendation, ReferenceHandle, RiskFlag, SentimentDigest,
    TaggedDocument, Tone, Verdict,
};
pub use ticker::Ticker;
