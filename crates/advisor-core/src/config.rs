//! Configuration for the advisor pipeline and its providers

use crate::error::{AdvisorError, Result};
use crate::ticker::Ticker;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by both stages and the provider clients
///
/// The risk thresholds deliberately live here rather than as constants: the
/// 2x sector-norm multiple and the 1.3 beta cutoff are judgment calls, not
/// facts about markets, so callers may tune them per sector or strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Sector-norm trailing P/E used as the valuation baseline
    pub sector_pe_norm: f64,

    /// Multiple of the sector norm beyond which the P/E flag fires
    pub sector_pe_multiple: f64,

    /// Beta above which the volatility flag fires
    pub beta_volatility_threshold: f64,

    /// Percentage points below the benchmark return beyond which the
    /// drawdown flag fires
    pub drawdown_threshold: f64,

    /// Benchmark against which relative performance is measured
    pub benchmark_ticker: Ticker,

    /// Trailing window for the performance comparison
    pub performance_window_days: u32,

    /// Maximum documents requested from the sentiment provider
    pub search_result_limit: usize,

    /// Request timeout applied to provider HTTP calls
    pub request_timeout: Duration,

    /// Sentiment-provider requests allowed per minute
    pub sentiment_rate_limit: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            sector_pe_norm: 15.0,
            sector_pe_multiple: 2.0,
            beta_volatility_threshold: 1.3,
            drawdown_threshold: 20.0,
            benchmark_ticker: Ticker::new("SPY").expect("static benchmark symbol"),
            performance_window_days: 365,
            search_result_limit: 3,
            request_timeout: Duration::from_secs(30),
            sentiment_rate_limit: 10,
        }
    }
}

impl AdvisorConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder::default()
    }

    /// The effective P/E cutoff: sector norm times the configured multiple
    pub fn pe_threshold(&self) -> f64 {
        self.sector_pe_norm * self.sector_pe_multiple
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sector_pe_norm <= 0.0 || self.sector_pe_multiple <= 0.0 {
            return Err(AdvisorError::Config(
                "sector P/E norm and multiple must be positive".to_string(),
            ));
        }
        if self.beta_volatility_threshold <= 0.0 {
            return Err(AdvisorError::Config(
                "beta volatility threshold must be positive".to_string(),
            ));
        }
        if self.drawdown_threshold <= 0.0 {
            return Err(AdvisorError::Config(
                "drawdown threshold must be positive".to_string(),
            ));
        }
        if self.performance_window_days < 2 {
            return Err(AdvisorError::Config(
                "performance window must cover at least two days".to_string(),
            ));
        }
        if self.search_result_limit == 0 {
            return Err(AdvisorError::Config(
                "search result limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`AdvisorConfig`]
#[derive(Debug, Default)]
pub struct AdvisorConfigBuilder {
    sector_pe_norm: Option<f64>,
    sector_pe_multiple: Option<f64>,
    beta_volatility_threshold: Option<f64>,
    drawdown_threshold: Option<f64>,
    benchmark_ticker: Option<Ticker>,
    performance_window_days: Option<u32>,
    search_result_limit: Option<usize>,
    request_timeout: Option<Duration>,
    sentiment_rate_limit: Option<u32>,
}

impl AdvisorConfigBuilder {
    /// Set the sector-norm trailing P/E baseline
    pub fn sector_pe_norm(mut self, norm: f64) -> Self {
        self.sector_pe_norm = Some(norm);
        self
    }

    /// Set the multiple applied to the sector norm
    pub fn sector_pe_multiple(mut self, multiple: f64) -> Self {
        self.sector_pe_multiple = Some(multiple);
        self
    }

    /// Set the beta volatility threshold
    pub fn beta_volatility_threshold(mut self, threshold: f64) -> Self {
        self.beta_volatility_threshold = Some(threshold);
        self
    }

    /// Set the drawdown threshold in percentage points
    pub fn drawdown_threshold(mut self, threshold: f64) -> Self {
        self.drawdown_threshold = Some(threshold);
        self
    }

    /// Set the benchmark ticker
    pub fn benchmark_ticker(mut self, ticker: Ticker) -> Self {
        self.benchmark_ticker = Some(ticker);
        self
    }

    /// Set the trailing performance window
    pub fn performance_window_days(mut self, days: u32) -> Self {
        self.performance_window_days = Some(days);
        self
    }

    /// Set the sentiment search result limit
    pub fn search_result_limit(mut self, limit: usize) -> Self {
        self.search_result_limit = Some(limit);
        self
    }

    /// Set the provider request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the sentiment-provider rate limit (requests per minute)
    pub fn sentiment_rate_limit(mut self, per_minute: u32) -> Self {
        self.sentiment_rate_limit = Some(per_minute);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AdvisorConfig> {
        let defaults = AdvisorConfig::default();

        let config = AdvisorConfig {
            sector_pe_norm: self.sector_pe_norm.unwrap_or(defaults.sector_pe_norm),
            sector_pe_multiple: self.sector_pe_multiple.unwrap_or(defaults.sector_pe_multiple),
            beta_volatility_threshold: self
                .beta_volatility_threshold
                .unwrap_or(defaults.beta_volatility_threshold),
            drawdown_threshold: self.drawdown_threshold.unwrap_or(defaults.drawdown_threshold),
            benchmark_ticker: self.benchmark_ticker.unwrap_or(defaults.benchmark_ticker),
            performance_window_days: self
                .performance_window_days
                .unwrap_or(defaults.performance_window_days),
            search_result_limit: self.search_result_limit.unwrap_or(defaults.search_result_limit),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            sentiment_rate_limit: self
                .sentiment_rate_limit
                .unwrap_or(defaults.sentiment_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
