//! Command-line entry point for the equity advisor pipeline

use advisor_core::{AdvisorConfig, AdvisorError, Ticker};
use advisor_pipeline::{
    LexiconClassifier, LlmClassifierConfig, LlmToneClassifier, Pipeline, PipelineRun, QuantStage,
    StrategistStage, ToneClassifier,
};
use advisor_providers::{BlobArchive, FirecrawlClient, PostgresReportSink, YahooMetricsClient};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "advisor")]
#[command(about = "Two-stage equity recommendation pipeline", long_about = None)]
struct Args {
    /// Ticker symbol to analyse (e.g. AAPL)
    ticker: String,

    /// Benchmark ticker for relative performance
    #[arg(long, default_value = "SPY")]
    benchmark: String,

    /// Tone classifier for retrieved news documents
    #[arg(long, value_enum, default_value_t = ClassifierKind::Lexicon)]
    classifier: ClassifierKind,

    /// Skip persistence even when DATABASE_URL is set
    #[arg(long)]
    no_persist: bool,

    /// Also write the rendered report to a file
    /// (defaults to investment_report_<TICKER>.md when no path is given)
    #[arg(long, num_args = 0..=1)]
    output: Option<Option<PathBuf>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClassifierKind {
    /// Keyword lexicon, fully offline
    Lexicon,
    /// OpenAI-compatible chat model (requires OPENAI_API_KEY)
    Llm,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Map the error taxonomy onto stable shell exit codes
fn exit_code(err: &AdvisorError) -> u8 {
    match err {
        AdvisorError::DataUnavailable { .. } => 2,
        AdvisorError::UpstreamContractViolation { .. } => 3,
        AdvisorError::InvalidTicker(_) | AdvisorError::Config(_) => 4,
        AdvisorError::PersistenceFailure { .. } => 5,
    }
}

async fn run(args: &Args) -> advisor_core::Result<PipelineRun> {
    let ticker = Ticker::new(&args.ticker)?;
    let config = Arc::new(
        AdvisorConfig::builder()
            .benchmark_ticker(Ticker::new(&args.benchmark)?)
            .build()?,
    );

    let metrics = Arc::new(YahooMetricsClient::new(config.request_timeout));
    let sentiment = Arc::new(FirecrawlClient::from_env(
        config.sentiment_rate_limit,
        config.request_timeout,
    )?);

    let classifier: Arc<dyn ToneClassifier> = match args.classifier {
        ClassifierKind::Lexicon => Arc::new(LexiconClassifier::new()),
        ClassifierKind::Llm => Arc::new(LlmToneClassifier::new(LlmClassifierConfig::from_env()?)),
    };

    let sink = if args.no_persist {
        None
    } else {
        match std::env::var("DATABASE_URL") {
            Ok(url) => {
                let archive = BlobArchive::from_env();
                let sink = PostgresReportSink::connect(&url, archive).await?;
                Some(Arc::new(sink) as Arc<dyn advisor_core::ReportSink>)
            }
            Err(_) => {
                warn!("DATABASE_URL not set; running without persistence");
                None
            }
        }
    };

    let pipeline = Pipeline::new(
        QuantStage::new(metrics, Arc::clone(&config)),
        StrategistStage::new(sentiment, classifier, config),
        sink,
    );
    let outcome = pipeline.run(&ticker).await?;

    let markdown = outcome.recommendation.to_markdown();
    println!("{markdown}");

    if let Some(path) = &args.output {
        let path = path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("investment_report_{ticker}.md")));
        std::fs::write(&path, &markdown).map_err(|e| {
            AdvisorError::persistence(ticker.as_str(), format!("write {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), "report written to file");
    }

    Ok(outcome)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args).await {
        Ok(outcome) => {
            if let Some(Err(err)) = &outcome.persistence {
                warn!(error = %err, "recommendation returned but not persisted");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "pipeline run failed");
            ExitCode::from(exit_code(&err))
        }
    }
}
