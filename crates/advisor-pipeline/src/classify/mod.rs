//! Tone classification seam for the strategist stage
//!
//! The conflict-resolution policy in the strategist is fixed and testable;
//! the judgment that feeds it (what tone a document carries, and whether it
//! describes a material structural risk) is swappable behind this trait.

pub mod lexicon;
pub mod llm;

use advisor_core::{Document, Result, Ticker, Tone};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use lexicon::LexiconClassifier;
pub use llm::{LlmClassifierConfig, LlmToneClassifier};

/// The stage's judgment about one retrieved document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneJudgment {
    pub tone: Tone,
    /// Material structural risk: lawsuit, fraud investigation, regulatory ban
    pub structural_risk: bool,
}

/// Judgment mechanism for document tone
#[async_trait]
pub trait ToneClassifier: Send + Sync {
    /// Classify one document's tone with respect to the subject ticker
    async fn classify(&self, ticker: &Ticker, document: &Document) -> Result<ToneJudgment>;

    /// Name used in logs
    fn name(&self) -> &str;
}
