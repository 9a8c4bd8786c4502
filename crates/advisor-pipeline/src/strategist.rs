//! Strategist stage: reconciles quantitative evidence with news tone

use crate::classify::ToneClassifier;
use advisor_core::report::truncate_words;
use advisor_core::{
    AdvisorConfig, AdvisorError, Confidence, QuantReport, Recommendation, Result, SentimentDigest,
    SentimentProvider, TaggedDocument, Ticker, Tone, Verdict,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Statement emitted when the sentiment provider yields zero documents
pub const NO_QUALITATIVE_DATA: &str =
    "No qualitative data available; the verdict rests on quantitative evidence alone.";

/// Second pipeline stage: the investment strategist
///
/// Consumes the quant report as immutable context. It never mutates or
/// re-derives quantitative figures; its own contribution is the single news
/// query, the per-document tone judgment, and the deterministic
/// conflict-resolution policy that turns both evidence streams into a
/// verdict.
pub struct StrategistStage {
    sentiment: Arc<dyn SentimentProvider>,
    classifier: Arc<dyn ToneClassifier>,
    config: Arc<AdvisorConfig>,
}

/// Policy outcome, bundled so the rationale can explain an override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub verdict: Verdict,
    pub confidence: Confidence,
    /// True when structural news overrode otherwise-strong fundamentals
    pub structural_override: bool,
}

impl StrategistStage {
    pub fn new(
        sentiment: Arc<dyn SentimentProvider>,
        classifier: Arc<dyn ToneClassifier>,
        config: Arc<AdvisorConfig>,
    ) -> Self {
        Self {
            sentiment,
            classifier,
            config,
        }
    }

    /// The single sentiment/news query issued per run
    pub fn sentiment_query(ticker: &Ticker) -> String {
        format!(
            "{ticker} stock recent developments: earnings announcements, leadership changes, \
             regulatory or legal issues, product launches or partnerships, \
             analyst upgrades or downgrades"
        )
    }

    /// Produce the final recommendation from the quant report and fresh news
    pub async fn produce(&self, ticker: &Ticker, quant: &QuantReport) -> Result<Recommendation> {
        // Refuse structurally incomplete upstream input before any I/O.
        quant.validate()?;
        if quant.ticker != *ticker {
            return Err(AdvisorError::contract_violation(
                ticker.as_str(),
                format!("quant report belongs to {}", quant.ticker),
            ));
        }

        info!(ticker = %ticker, classifier = self.classifier.name(), "strategist stage started");

        let query = Self::sentiment_query(ticker);
        let documents = self
            .sentiment
            .search(&query, self.config.search_result_limit)
            .await?;

        let mut tagged = Vec::with_capacity(documents.len());
        for document in documents.into_iter().take(self.config.search_result_limit) {
            let judgment = self.classifier.classify(ticker, &document).await?;
            tagged.push(TaggedDocument {
                document,
                tone: judgment.tone,
                structural_risk: judgment.structural_risk,
            });
        }
        let digest = SentimentDigest { documents: tagged };
        if digest.is_empty() {
            warn!(ticker = %ticker, "sentiment search returned no documents; proceeding quant-only");
        }

        let resolution = resolve(quant, &digest);
        info!(
            ticker = %ticker,
            verdict = %resolution.verdict,
            confidence = %resolution.confidence,
            "strategist stage complete"
        );

        Ok(Recommendation {
            ticker: ticker.clone(),
            quantitative_summary: quantitative_summary(quant),
            qualitative_summary: qualitative_summary(&digest),
            risks: collect_risks(quant, &digest),
            verdict: resolution.verdict,
            confidence: resolution.confidence,
            rationale: rationale(quant, &digest, resolution),
            generated_at: Utc::now(),
        })
    }
}

/// The deterministic conflict-resolution policy, evaluated top to bottom
///
/// Fundamentals dominate unless the news carries a material structural risk;
/// that override is the single place news outweighs quant strength. Any
/// structural-risk document makes the digest structural, even when outvoted
/// on majority tone, so a structural digest can never yield Buy.
pub fn resolve(quant: &QuantReport, digest: &SentimentDigest) -> Resolution {
    let weak = quant.is_weak();
    let tone = digest.overall_tone();
    let structural = digest.has_structural_risk();

    let base = match (weak, tone) {
        // Strong fundamentals, supportive or quiet news: bullish bias.
        (false, Tone::Positive) => Resolution {
            verdict: Verdict::Buy,
            confidence: Confidence::High,
            structural_override: false,
        },
        (false, Tone::Neutral) => Resolution {
            verdict: Verdict::Buy,
            confidence: Confidence::Medium,
            structural_override: false,
        },
        // Structural negative news overrides otherwise-strong fundamentals.
        (false, Tone::Negative) if structural => Resolution {
            verdict: Verdict::Sell,
            confidence: Confidence::Medium,
            structural_override: true,
        },
        (false, Tone::Negative) => Resolution {
            verdict: Verdict::Hold,
            confidence: Confidence::Medium,
            structural_override: false,
        },
        // Weak fundamentals plus positive hype: skeptical, never upgraded to Buy.
        (true, Tone::Positive) => Resolution {
            verdict: Verdict::Hold,
            confidence: Confidence::Low,
            structural_override: false,
        },
        (true, Tone::Negative) => Resolution {
            verdict: Verdict::Sell,
            confidence: Confidence::High,
            structural_override: false,
        },
        // Weak fundamentals with neutral news: the numbers decide. A pile of
        // flags is bearish on its own; one flag warrants caution, not exit.
        (true, Tone::Neutral) => {
            if quant.risk_flags.len() >= 3 {
                Resolution {
                    verdict: Verdict::Sell,
                    confidence: Confidence::Medium,
                    structural_override: false,
                }
            } else {
                Resolution {
                    verdict: Verdict::Hold,
                    confidence: Confidence::Medium,
                    structural_override: false,
                }
            }
        }
    };

    // A structural risk caps the verdict at Hold even when positive or
    // neutral documents outvote it on tone.
    if structural && base.verdict == Verdict::Buy {
        return Resolution {
            verdict: Verdict::Hold,
            confidence: Confidence::Medium,
            structural_override: true,
        };
    }
    base
}

fn quantitative_summary(quant: &QuantReport) -> String {
    format!(
        "{valuation} {volatility}. {performance}.",
        valuation = quant.assessment,
        volatility = quant.volatility,
        performance = quant.relative_performance,
    )
}

fn qualitative_summary(digest: &SentimentDigest) -> String {
    if digest.is_empty() {
        return NO_QUALITATIVE_DATA.to_string();
    }
    let mut lines: Vec<String> = digest
        .documents
        .iter()
        .map(|d| {
            let marker = if d.structural_risk {
                " [structural risk]"
            } else {
                ""
            };
            format!("- {}: {}{}", d.document.title, d.tone, marker)
        })
        .collect();
    lines.insert(
        0,
        format!(
            "Overall tone across {} retrieved document(s): {}.",
            digest.documents.len(),
            digest.overall_tone()
        ),
    );
    lines.join("\n")
}

fn collect_risks(quant: &QuantReport, digest: &SentimentDigest) -> Vec<String> {
    let mut risks: Vec<String> = quant.risk_flags.iter().map(|f| f.to_string()).collect();
    for tagged in &digest.documents {
        if tagged.structural_risk {
            risks.push(format!("Structural risk: {}", tagged.document.title));
        }
    }
    risks
}

fn rationale(quant: &QuantReport, digest: &SentimentDigest, resolution: Resolution) -> String {
    let mut sentences = Vec::new();

    if quant.is_weak() {
        sentences.push(format!(
            "Quantitatively, {} of 4 risk predicates fired ({}), which anchors the verdict in weak fundamentals.",
            quant.risk_flags.len(),
            quant
                .risk_flags
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        ));
    } else {
        sentences.push(
            "Quantitatively, no risk predicate fired, so the fundamentals read as strong."
                .to_string(),
        );
    }

    if digest.is_empty() {
        sentences.push(NO_QUALITATIVE_DATA.to_string());
    } else {
        sentences.push(format!(
            "Recent coverage ({} document(s)) reads {} overall.",
            digest.documents.len(),
            digest.overall_tone()
        ));
    }

    if resolution.structural_override {
        sentences.push(
            "A material structural risk in the news overrides the fundamentals-first weighting; \
             this is the single override condition in the policy and drives the downgrade."
                .to_string(),
        );
    }

    sentences.push(format!(
        "Weighing both evidence streams under the fixed conflict-resolution policy yields {} with {} confidence.",
        resolution.verdict, resolution.confidence
    ));

    truncate_words(&sentences.join(" "), Recommendation::RATIONALE_WORD_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::{Document, RiskFlag};

    fn report(flags: Vec<RiskFlag>) -> QuantReport {
        QuantReport {
            ticker: Ticker::new("XYZ").unwrap(),
            valuation: "P/E 45.0".to_string(),
            volatility: "Beta: 1.60 - high volatility versus the market".to_string(),
            relative_performance: "12-month return: -30.0% vs SPY +8.0%".to_string(),
            risk_flags: flags,
            assessment: "Weak fundamentals.".to_string(),
            generated_at: Utc::now(),
        }
    }

    fn digest(tones: &[Tone], structural: bool) -> SentimentDigest {
        SentimentDigest {
            documents: tones
                .iter()
                .enumerate()
                .map(|(i, &tone)| TaggedDocument {
                    document: Document {
                        title: format!("doc {i}"),
                        url: String::new(),
                        markdown: String::new(),
                    },
                    tone,
                    structural_risk: structural && tone == Tone::Negative,
                })
                .collect(),
        }
    }

    #[test]
    fn test_strong_positive_is_buy() {
        let r = resolve(&report(vec![]), &digest(&[Tone::Positive, Tone::Neutral], false));
        assert_eq!(r.verdict, Verdict::Buy);
        assert_eq!(r.confidence, Confidence::High);
    }

    #[test]
    fn test_strong_negative_nonstructural_is_hold() {
        let r = resolve(&report(vec![]), &digest(&[Tone::Negative], false));
        assert_eq!(r.verdict, Verdict::Hold);
        assert!(!r.structural_override);
    }

    #[test]
    fn test_structural_news_overrides_strong_quant() {
        let r = resolve(&report(vec![]), &digest(&[Tone::Negative], true));
        assert_eq!(r.verdict, Verdict::Sell);
        assert!(r.structural_override);
    }

    #[test]
    fn test_outvoted_structural_risk_caps_verdict_at_hold() {
        // Two positive documents outvote the structural one on tone, but the
        // structural risk still blocks a Buy.
        let d = digest(&[Tone::Positive, Tone::Positive, Tone::Negative], true);
        assert_eq!(d.overall_tone(), Tone::Positive);

        let r = resolve(&report(vec![]), &d);
        assert_eq!(r.verdict, Verdict::Hold);
        assert_eq!(r.confidence, Confidence::Medium);
        assert!(r.structural_override);

        // The rationale and the risk list agree with the capped verdict.
        let text = rationale(&report(vec![]), &d, r);
        assert!(text.contains("structural risk"));
        assert!(!collect_risks(&report(vec![]), &d).is_empty());
    }

    #[test]
    fn test_structural_digest_never_yields_buy() {
        for tones in [
            vec![Tone::Positive, Tone::Negative],
            vec![Tone::Neutral, Tone::Negative],
            vec![Tone::Positive, Tone::Positive, Tone::Negative],
        ] {
            let r = resolve(&report(vec![]), &digest(&tones, true));
            assert_ne!(r.verdict, Verdict::Buy);
        }
    }

    #[test]
    fn test_weak_plus_hype_never_buys() {
        let r = resolve(
            &report(vec![RiskFlag::HighBeta]),
            &digest(&[Tone::Positive, Tone::Positive, Tone::Positive], false),
        );
        assert_eq!(r.verdict, Verdict::Hold);
        assert_eq!(r.confidence, Confidence::Low);
    }

    #[test]
    fn test_bearish_dominance_property() {
        // Never Buy with >= 1 flag and negative tone.
        for flags in [
            vec![RiskFlag::HighBeta],
            vec![RiskFlag::HighBeta, RiskFlag::ElevatedPe],
        ] {
            let r = resolve(&report(flags), &digest(&[Tone::Negative, Tone::Negative], false));
            assert_eq!(r.verdict, Verdict::Sell);
        }
    }

    #[test]
    fn test_four_flags_neutral_news_sells() {
        // Weak quant dominates neutral news once enough predicates fire.
        let flags = vec![
            RiskFlag::NegativeOrDecliningEps,
            RiskFlag::ElevatedPe,
            RiskFlag::HighBeta,
            RiskFlag::ExtremeDrawdown,
        ];
        let r = resolve(
            &report(flags),
            &digest(&[Tone::Neutral, Tone::Neutral, Tone::Neutral], false),
        );
        assert_eq!(r.verdict, Verdict::Sell);
        assert!(matches!(r.confidence, Confidence::Medium | Confidence::High));
    }

    #[test]
    fn test_single_flag_neutral_news_holds() {
        let r = resolve(&report(vec![RiskFlag::HighBeta]), &digest(&[Tone::Neutral], false));
        assert_eq!(r.verdict, Verdict::Hold);
    }

    #[test]
    fn test_empty_digest_reads_neutral() {
        let r = resolve(&report(vec![]), &SentimentDigest::default());
        assert_eq!(r.verdict, Verdict::Buy);
        assert_eq!(r.confidence, Confidence::Medium);
    }

    #[test]
    fn test_qualitative_summary_empty_sentinel() {
        assert_eq!(qualitative_summary(&SentimentDigest::default()), NO_QUALITATIVE_DATA);
    }

    #[test]
    fn test_rationale_mentions_override() {
        let resolution = resolve(&report(vec![]), &digest(&[Tone::Negative], true));
        let text = rationale(&report(vec![]), &digest(&[Tone::Negative], true), resolution);
        assert!(text.contains("structural risk"));
        assert!(text.contains("override"));
    }

    #[test]
    fn test_rationale_references_both_evidence_streams() {
        let d = digest(&[Tone::Neutral], false);
        let q = report(vec![RiskFlag::ElevatedPe]);
        let text = rationale(&q, &d, resolve(&q, &d));
        assert!(text.contains("risk predicates fired"));
        assert!(text.contains("Recent coverage"));
    }

    #[test]
    fn test_sentiment_query_is_single_and_catalyst_focused() {
        let query = StrategistStage::sentiment_query(&Ticker::new("aapl").unwrap());
        assert!(query.starts_with("AAPL"));
        for topic in ["earnings", "leadership", "regulatory", "partnerships", "analyst"] {
            assert!(query.contains(topic), "query missing {topic}");
        }
    }
}
