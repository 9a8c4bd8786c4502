//! Ticker symbol newtype

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An exchange symbol identifying one tradable equity
///
/// Immutable once constructed. Validation is deliberately minimal: the
/// symbol must be non-empty after trimming; anything else is left to the
/// data providers, which know their own symbol universes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Create a ticker, trimming whitespace and normalizing to uppercase
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AdvisorError::InvalidTicker(raw.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// The normalized symbol
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = AdvisorError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}
