//! Error taxonomy for advisor operations

use thiserror::Error;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Errors surfaced by the pipeline and its collaborators
///
/// Every failure carries enough context (ticker, stage, underlying cause) to
/// be actionable. There are no automatic retries anywhere in this crate
/// family; a provider failure is reported once and the run aborts.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// A data provider was unreachable or returned malformed data
    #[error("data unavailable for {ticker} in {stage} stage: {reason}")]
    DataUnavailable {
        ticker: String,
        stage: String,
        reason: String,
    },

    /// A stage received a structurally incomplete input from a prior stage.
    /// This indicates a bug and is never silently patched.
    #[error("upstream contract violation for {ticker}: {detail}")]
    UpstreamContractViolation { ticker: String, detail: String },

    /// The report sink could not durably store the recommendation. The
    /// recommendation itself is still returned to the caller.
    #[error("failed to persist report for {ticker}: {reason}")]
    PersistenceFailure { ticker: String, reason: String },

    /// Caller supplied an unusable ticker symbol
    #[error("invalid ticker symbol: {0:?}")]
    InvalidTicker(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AdvisorError {
    /// Build a `DataUnavailable` error from any displayable cause
    pub fn data_unavailable(
        ticker: impl Into<String>,
        stage: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::DataUnavailable {
            ticker: ticker.into(),
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an `UpstreamContractViolation` error
    pub fn contract_violation(ticker: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UpstreamContractViolation {
            ticker: ticker.into(),
            detail: detail.into(),
        }
    }

    /// Build a `PersistenceFailure` error from any displayable cause
    pub fn persistence(ticker: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::PersistenceFailure {
            ticker: ticker.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdvisorError::data_unavailable("AAPL", "quant", "connection refused");
        assert_eq!(
            err.to_string(),
            "data unavailable for AAPL in quant stage: connection refused"
        );

        let err = AdvisorError::contract_violation("MSFT", "missing assessment section");
        assert_eq!(
            err.to_string(),
            "upstream contract violation for MSFT: missing assessment section"
        );
    }

    #[test]
    fn test_persistence_keeps_context() {
        let err = AdvisorError::persistence("NVDA", "pool timed out");
        match err {
            AdvisorError::PersistenceFailure { ticker, reason } => {
                assert_eq!(ticker, "NVDA");
                assert!(reason.contains("timed out"));
            }
            _ => panic!("expected PersistenceFailure"),
        }
    }
}
