//! Two-stage recommendation pipeline
//!
//! Sequencing and data contract between the quantitative stage and the
//! strategist stage: `QuantStage` turns provider metrics into a structured
//! five-section report, `StrategistStage` reconciles that report with
//! tone-classified news into a final verdict, and `Pipeline` runs the two in
//! strict order and hands the result to the report sink.

pub mod classify;
pub mod pipeline;
pub mod quant;
pub mod strategist;

pub use classify::{
    LexiconClassifier, LlmClassifierConfig, LlmToneClassifier, ToneClassifier, ToneJudgment,
};
pub use pipeline::{Pipeline, PipelineRun};
pub use quant::QuantStage;
pub use strategist::StrategistStage;
