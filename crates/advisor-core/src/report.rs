//! Report and recommendation types: the contract between pipeline stages

use crate::error::{AdvisorError, Result};
use crate::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A quantitative risk predicate that fired during the quant stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskFlag {
    /// Trailing EPS is negative or declining
    NegativeOrDecliningEps,
    /// Trailing P/E beyond the configured multiple of the sector norm
    ElevatedPe,
    /// Beta above the configured volatility threshold
    HighBeta,
    /// Trailing return far below the benchmark
    ExtremeDrawdown,
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NegativeOrDecliningEps => "Negative or declining EPS",
            Self::ElevatedPe => "P/E significantly above sector norm",
            Self::HighBeta => "High beta volatility",
            Self::ExtremeDrawdown => "Extreme drawdown vs benchmark",
        };
        f.write_str(text)
    }
}

/// Structured output of the quantitative stage
///
/// All five sections are mandatory. The strategist stage validates this
/// contract before consuming the report and refuses to proceed on a
/// violation, so a partially populated report can never feed a verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantReport {
    pub ticker: Ticker,
    /// Valuation Metrics section
    pub valuation: String,
    /// Volatility Profile section
    pub volatility: String,
    /// Relative Performance vs benchmark section
    pub relative_performance: String,
    /// Quantitative Risk Flags: zero or more triggered predicates
    pub risk_flags: Vec<RiskFlag>,
    /// Overall Quantitative Assessment section
    pub assessment: String,
    pub generated_at: DateTime<Utc>,
}

impl QuantReport {
    /// Sentinel rendered when no risk predicate fired
    pub const NO_FLAGS_SENTINEL: &'static str = "No major quantitative red flags detected.";

    /// Check that every mandatory section is present and non-empty
    pub fn validate(&self) -> Result<()> {
        let sections = [
            ("Valuation Metrics", &self.valuation),
            ("Volatility Profile", &self.volatility),
            ("Relative Performance", &self.relative_performance),
            ("Overall Quantitative Assessment", &self.assessment),
        ];
        for (name, body) in sections {
            if body.trim().is_empty() {
                return Err(AdvisorError::contract_violation(
                    self.ticker.as_str(),
                    format!("quant report is missing the {name} section"),
                ));
            }
        }
        Ok(())
    }

    /// Fundamentals are "weak" once at least one risk predicate fired
    pub fn is_weak(&self) -> bool {
        !self.risk_flags.is_empty()
    }

    /// Render the risk-flag section: bullets, or the explicit sentinel when
    /// the list is empty (never an empty section)
    pub fn rendered_risk_flags(&self) -> String {
        if self.risk_flags.is_empty() {
            return Self::NO_FLAGS_SENTINEL.to_string();
        }
        self.risk_flags
            .iter()
            .map(|flag| format!("- {flag}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Tone classification of one retrieved document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        };
        f.write_str(text)
    }
}

/// One retrieved news/sentiment document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub url: String,
    /// Full page content in markdown
    pub markdown: String,
}

/// A document after the strategist stage judged its tone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedDocument {
    pub document: Document,
    pub tone: Tone,
    /// Material structural risk: lawsuit, fraud investigation, regulatory ban
    pub structural_risk: bool,
}

/// Up to three tone-tagged documents for one ticker
///
/// Tagging is a judgment call made by the consuming stage, not the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentDigest {
    pub documents: Vec<TaggedDocument>,
}

impl SentimentDigest {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// True when any document carries a material structural risk
    pub fn has_structural_risk(&self) -> bool {
        self.documents.iter().any(|d| d.structural_risk)
    }

    /// Majority tone across the digest
    ///
    /// Negative wins ties against Positive (conservative), and an empty or
    /// balanced digest reads as Neutral.
    pub fn overall_tone(&self) -> Tone {
        let positive = self.count(Tone::Positive);
        let negative = self.count(Tone::Negative);
        if negative >= positive && negative > 0 {
            Tone::Negative
        } else if positive > negative {
            Tone::Positive
        } else {
            Tone::Neutral
        }
    }

    fn count(&self, tone: Tone) -> usize {
        self.documents.iter().filter(|d| d.tone == tone).count()
    }
}

/// Final verdict of the strategist stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Hold,
    Sell,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
        };
        f.write_str(text)
    }
}

/// Confidence level attached to the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(text)
    }
}

/// The terminal artifact of a pipeline run, immutable once written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub ticker: Ticker,
    pub quantitative_summary: String,
    pub qualitative_summary: String,
    /// Key risks; empty renders the explicit "no material risks" sentinel
    pub risks: Vec<String>,
    pub verdict: Verdict,
    pub confidence: Confidence,
    /// Evidence-grounded rationale, bounded to [`Recommendation::RATIONALE_WORD_LIMIT`]
    pub rationale: String,
    pub generated_at: DateTime<Utc>,
}

impl Recommendation {
    /// Sentinel rendered when the risk list is empty
    pub const NO_RISKS_SENTINEL: &'static str = "No material structural risks identified.";

    /// Upper bound on rationale length, in words
    pub const RATIONALE_WORD_LIMIT: usize = 400;

    /// Render the recommendation as markdown with the exact section headers
    /// callers depend on
    pub fn to_markdown(&self) -> String {
        let risks = if self.risks.is_empty() {
            format!("- {}", Self::NO_RISKS_SENTINEL)
        } else {
            self.risks
                .iter()
                .map(|r| format!("- {r}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "# Investment Recommendation: {ticker}\n\n\
             ## Quantitative Summary\n{quant}\n\n\
             ## Qualitative Catalyst Summary\n{qual}\n\n\
             ## Risk Assessment\n{risks}\n\n\
             ## Final Verdict\n{verdict}\n\n\
             ## Confidence Level\n{confidence}\n\n\
             ## Investment Rationale\n{rationale}\n",
            ticker = self.ticker,
            quant = self.quantitative_summary,
            qual = self.qualitative_summary,
            risks = risks,
            verdict = self.verdict,
            confidence = self.confidence,
            rationale = self.rationale,
        )
    }
}

/// Truncate text to at most `limit` words, appending an ellipsis when cut
pub fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return text.to_string();
    }
    let mut truncated = words[..limit].join(" ");
    truncated.push('…');
    truncated
}

/// Handle returned by the report sink after a durable write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceHandle {
    /// Primary key of the persisted log record
    pub record_id: uuid::Uuid,
    /// Retrievable archive URL, when blob archival is configured
    pub archive_url: Option<String>,
}
