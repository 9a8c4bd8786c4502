//! Sequential orchestration of quant stage, strategist stage, and sink

use crate::quant::QuantStage;
use crate::strategist::StrategistStage;
use advisor_core::{AdvisorError, Recommendation, ReferenceHandle, ReportSink, Result, Ticker};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Outcome of one pipeline run
///
/// The recommendation always comes back to the caller once both stages
/// succeed. A sink failure travels alongside it rather than replacing it,
/// since a finished analysis is worth returning even when the durable write
/// was not.
#[derive(Debug)]
pub struct PipelineRun {
    pub recommendation: Recommendation,
    /// `None` when no sink is configured
    pub persistence: Option<std::result::Result<ReferenceHandle, AdvisorError>>,
}

impl PipelineRun {
    /// True when a sink was configured and the write failed
    pub fn persistence_failed(&self) -> bool {
        matches!(self.persistence, Some(Err(_)))
    }
}

/// The two-stage advisory pipeline
///
/// Stages run strictly in sequence: the strategist never starts before the
/// quant report exists, and the sink is only reached with a finished
/// recommendation in hand. A quant failure aborts the run before any
/// sentiment retrieval or persistence happens.
pub struct Pipeline {
    quant: QuantStage,
    strategist: StrategistStage,
    sink: Option<Arc<dyn ReportSink>>,
}

impl Pipeline {
    pub fn new(
        quant: QuantStage,
        strategist: StrategistStage,
        sink: Option<Arc<dyn ReportSink>>,
    ) -> Self {
        Self {
            quant,
            strategist,
            sink,
        }
    }

    /// Run the full pipeline for one ticker
    #[instrument(skip(self), fields(ticker = %ticker))]
    pub async fn run(&self, ticker: &Ticker) -> Result<PipelineRun> {
        let quant_report = self.quant.produce(ticker).await?;
        let recommendation = self.strategist.produce(ticker, &quant_report).await?;

        let persistence = match &self.sink {
            None => None,
            Some(sink) => match sink.persist(ticker, &recommendation).await {
                Ok(handle) => {
                    info!(ticker = %ticker, record_id = %handle.record_id, "recommendation persisted");
                    Some(Ok(handle))
                }
                Err(err) => {
                    error!(ticker = %ticker, error = %err, "failed to persist recommendation");
                    Some(Err(err))
                }
            },
        };
        if persistence.is_none() {
            warn!(ticker = %ticker, "no report sink configured; recommendation not persisted");
        }

        Ok(PipelineRun {
            recommendation,
            persistence,
        })
    }
}
