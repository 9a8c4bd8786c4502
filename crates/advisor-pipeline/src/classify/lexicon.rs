//! Deterministic keyword-lexicon tone classifier

use super::{ToneClassifier, ToneJudgment};
use advisor_core::{Document, Result, Ticker, Tone};
use async_trait::async_trait;

const POSITIVE_TERMS: &[&str] = &[
    "beat expectations",
    "beats estimates",
    "record revenue",
    "record profit",
    "upgrade",
    "upgraded",
    "raised guidance",
    "raises guidance",
    "strong growth",
    "partnership",
    "breakthrough",
    "buyback",
    "dividend increase",
    "outperform",
    "all-time high",
];

const NEGATIVE_TERMS: &[&str] = &[
    "missed expectations",
    "misses estimates",
    "downgrade",
    "downgraded",
    "cut guidance",
    "cuts guidance",
    "lowered guidance",
    "layoffs",
    "profit warning",
    "decline in revenue",
    "resignation",
    "steps down",
    "sell-off",
    "underperform",
    "weak demand",
    "loss widened",
];

/// Terms that mark a negative event as a material structural risk, the one
/// condition that overrides fundamentals-first weighting
const STRUCTURAL_TERMS: &[&str] = &[
    "lawsuit",
    "class action",
    "fraud",
    "investigation",
    "indicted",
    "regulatory ban",
    "banned",
    "subpoena",
    "sec charges",
    "antitrust",
    "sanctions",
    "recall",
    "accounting irregularities",
];

/// Keyword-count classifier: fully deterministic, no external calls
///
/// Counts lexicon hits over the lowercased title and body. Negative wins
/// ties, and any structural-term hit forces Negative with the structural
/// marker set.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    fn judge(text: &str) -> ToneJudgment {
        let text = text.to_lowercase();
        let hits = |terms: &[&str]| terms.iter().filter(|t| text.contains(*t)).count();

        let structural = hits(STRUCTURAL_TERMS) > 0;
        if structural {
            return ToneJudgment {
                tone: Tone::Negative,
                structural_risk: true,
            };
        }

        let positive = hits(POSITIVE_TERMS);
        let negative = hits(NEGATIVE_TERMS);
        let tone = if negative >= positive && negative > 0 {
            Tone::Negative
        } else if positive > negative {
            Tone::Positive
        } else {
            Tone::Neutral
        };

        ToneJudgment {
            tone,
            structural_risk: false,
        }
    }
}

#[async_trait]
impl ToneClassifier for LexiconClassifier {
    async fn classify(&self, _ticker: &Ticker, document: &Document) -> Result<ToneJudgment> {
        let text = format!("{}\n{}", document.title, document.markdown);
        Ok(Self::judge(&text))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_document() {
        let judgment = LexiconClassifier::judge("Company beats estimates, raises guidance");
        assert_eq!(judgment.tone, Tone::Positive);
        assert!(!judgment.structural_risk);
    }

    #[test]
    fn test_negative_document() {
        let judgment = LexiconClassifier::judge("Analyst downgrade after weak demand");
        assert_eq!(judgment.tone, Tone::Negative);
        assert!(!judgment.structural_risk);
    }

    #[test]
    fn test_neutral_when_no_hits() {
        let judgment = LexiconClassifier::judge("Quarterly report scheduled for next month");
        assert_eq!(judgment.tone, Tone::Neutral);
    }

    #[test]
    fn test_structural_terms_force_negative() {
        // Positive language does not outweigh a structural event.
        let judgment =
            LexiconClassifier::judge("Record revenue overshadowed by SEC charges and fraud probe");
        assert_eq!(judgment.tone, Tone::Negative);
        assert!(judgment.structural_risk);
    }

    #[test]
    fn test_negative_wins_ties() {
        let judgment = LexiconClassifier::judge("Upgrade reversed: downgrade follows");
        assert_eq!(judgment.tone, Tone::Negative);
    }
}
