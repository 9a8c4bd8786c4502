//! End-to-end pipeline behavior against mocked providers

use advisor_core::{
    AdvisorConfig, AdvisorError, Document, MetricsProvider, MetricsSnapshot, QuantReport,
    Recommendation, ReferenceHandle, RelativePerformance, ReportSink, SentimentProvider, Ticker,
    Tone, Verdict,
};
use advisor_pipeline::{
    Pipeline, QuantStage, StrategistStage, ToneClassifier, ToneJudgment,
};
use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;

mock! {
    Metrics {}

    #[async_trait]
    impl MetricsProvider for Metrics {
        async fn snapshot(&self, ticker: &Ticker) -> advisor_core::Result<MetricsSnapshot>;
        async fn relative_performance(
            &self,
            subject: &Ticker,
            benchmark: &Ticker,
            window_days: u32,
        ) -> advisor_core::Result<RelativePerformance>;
    }
}

mock! {
    Sentiment {}

    #[async_trait]
    impl SentimentProvider for Sentiment {
        async fn search(&self, query: &str, limit: usize) -> advisor_core::Result<Vec<Document>>;
    }
}

mock! {
    Sink {}

    #[async_trait]
    impl ReportSink for Sink {
        async fn persist(
            &self,
            ticker: &Ticker,
            recommendation: &Recommendation,
        ) -> advisor_core::Result<ReferenceHandle>;
    }
}

mock! {
    Classifier {}

    #[async_trait]
    impl ToneClassifier for Classifier {
        async fn classify(
            &self,
            ticker: &Ticker,
            document: &Document,
        ) -> advisor_core::Result<ToneJudgment>;
        fn name(&self) -> &str;
    }
}

fn ticker(symbol: &str) -> Ticker {
    Ticker::new(symbol).unwrap()
}

/// Snapshot that trips all four risk predicates under the default config:
/// forward P/E above trailing (declining EPS), P/E above 15 * 2, beta above
/// 1.3, and a deep drawdown supplied separately.
fn distressed_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        current_price: Some(42.0),
        market_cap: Some(8_000_000_000.0),
        trailing_pe: Some(45.0),
        forward_pe: Some(60.0),
        peg_ratio: Some(3.1),
        beta: Some(1.6),
        trailing_eps: Some(0.93),
        fifty_two_week_high: Some(80.0),
        fifty_two_week_low: Some(38.0),
        analyst_recommendation: Some("hold".to_string()),
    }
}

fn document(title: &str) -> Document {
    Document {
        title: title.to_string(),
        url: format!("https://news.example.com/{title}"),
        markdown: "Quarterly update with routine commentary.".to_string(),
    }
}

fn neutral_classifier() -> MockClassifier {
    let mut classifier = MockClassifier::new();
    classifier.expect_name().return_const("test".to_string());
    classifier.expect_classify().returning(|_, _| {
        Ok(ToneJudgment {
            tone: Tone::Neutral,
            structural_risk: false,
        })
    });
    classifier
}

fn pipeline(
    metrics: MockMetrics,
    sentiment: MockSentiment,
    classifier: MockClassifier,
    sink: Option<MockSink>,
) -> Pipeline {
    let config = Arc::new(AdvisorConfig::default());
    Pipeline::new(
        QuantStage::new(Arc::new(metrics), Arc::clone(&config)),
        StrategistStage::new(Arc::new(sentiment), Arc::new(classifier), config),
        sink.map(|s| Arc::new(s) as Arc<dyn ReportSink>),
    )
}

#[tokio::test]
async fn test_distressed_ticker_with_neutral_news_sells() {
    let subject = ticker("XYZ");

    let mut metrics = MockMetrics::new();
    metrics
        .expect_snapshot()
        .with(eq(subject.clone()))
        .times(1)
        .returning(|_| Ok(distressed_snapshot()));
    metrics
        .expect_relative_performance()
        .times(1)
        .returning(|_, _, _| {
            Ok(RelativePerformance {
                subject_return_pct: -30.0,
                benchmark_return_pct: 8.0,
            })
        });

    let mut sentiment = MockSentiment::new();
    sentiment.expect_search().times(1).returning(|_, limit| {
        assert_eq!(limit, 3);
        Ok(vec![
            document("earnings-in-line"),
            document("guidance-reiterated"),
            document("product-roadmap"),
        ])
    });

    let mut sink = MockSink::new();
    sink.expect_persist().times(1).returning(|_, _| {
        Ok(ReferenceHandle {
            record_id: uuid::Uuid::new_v4(),
            archive_url: None,
        })
    });

    let run = pipeline(metrics, sentiment, neutral_classifier(), Some(sink))
        .run(&subject)
        .await
        .unwrap();

    assert_eq!(run.recommendation.verdict, Verdict::Sell);
    assert_eq!(run.recommendation.risks.len(), 4);
    assert!(run.recommendation.rationale.contains("4 of 4 risk predicates"));
    assert!(!run.persistence_failed());
    assert!(run.persistence.is_some());
}

#[tokio::test]
async fn test_quant_failure_aborts_before_sentiment_and_sink() {
    let subject = ticker("XYZ");

    let mut metrics = MockMetrics::new();
    metrics.expect_snapshot().times(1).returning(|t| {
        Err(AdvisorError::data_unavailable(
            t.as_str(),
            "quant",
            "provider timeout",
        ))
    });
    metrics.expect_relative_performance().never();

    let mut sentiment = MockSentiment::new();
    sentiment.expect_search().never();

    let mut sink = MockSink::new();
    sink.expect_persist().never();

    let err = pipeline(metrics, sentiment, neutral_classifier(), Some(sink))
        .run(&subject)
        .await
        .unwrap_err();

    assert!(matches!(err, AdvisorError::DataUnavailable { .. }));
}

#[tokio::test]
async fn test_persistence_failure_still_returns_recommendation() {
    let subject = ticker("XYZ");

    let mut metrics = MockMetrics::new();
    metrics
        .expect_snapshot()
        .returning(|_| Ok(distressed_snapshot()));
    metrics.expect_relative_performance().returning(|_, _, _| {
        Ok(RelativePerformance {
            subject_return_pct: -30.0,
            benchmark_return_pct: 8.0,
        })
    });

    let mut sentiment = MockSentiment::new();
    sentiment.expect_search().returning(|_, _| Ok(Vec::new()));

    let mut sink = MockSink::new();
    sink.expect_persist().times(1).returning(|t, _| {
        Err(AdvisorError::persistence(t.as_str(), "connection refused"))
    });

    let run = pipeline(metrics, sentiment, neutral_classifier(), Some(sink))
        .run(&subject)
        .await
        .unwrap();

    assert_eq!(run.recommendation.verdict, Verdict::Sell);
    assert!(run.persistence_failed());
}

#[tokio::test]
async fn test_no_sink_configured_skips_persistence() {
    let subject = ticker("XYZ");

    let mut metrics = MockMetrics::new();
    metrics
        .expect_snapshot()
        .returning(|_| Ok(distressed_snapshot()));
    metrics.expect_relative_performance().returning(|_, _, _| {
        Ok(RelativePerformance {
            subject_return_pct: -30.0,
            benchmark_return_pct: 8.0,
        })
    });

    let mut sentiment = MockSentiment::new();
    sentiment.expect_search().returning(|_, _| Ok(Vec::new()));

    let run = pipeline(metrics, sentiment, neutral_classifier(), None)
        .run(&subject)
        .await
        .unwrap();

    assert!(run.persistence.is_none());
    assert!(!run.persistence_failed());
}

#[tokio::test]
async fn test_strategist_rejects_incomplete_quant_report() {
    let subject = ticker("XYZ");

    let mut sentiment = MockSentiment::new();
    sentiment.expect_search().never();

    let strategist = StrategistStage::new(
        Arc::new(sentiment),
        Arc::new(neutral_classifier()),
        Arc::new(AdvisorConfig::default()),
    );

    let broken = QuantReport {
        ticker: subject.clone(),
        valuation: "P/E 45.0".to_string(),
        volatility: String::new(),
        relative_performance: "-30.0% vs SPY +8.0%".to_string(),
        risk_flags: Vec::new(),
        assessment: "Weak.".to_string(),
        generated_at: Utc::now(),
    };

    let err = strategist.produce(&subject, &broken).await.unwrap_err();
    assert!(matches!(err, AdvisorError::UpstreamContractViolation { .. }));
    assert!(err.to_string().contains("Volatility Profile"));
}

#[tokio::test]
async fn test_strategist_rejects_report_for_other_ticker() {
    let mut sentiment = MockSentiment::new();
    sentiment.expect_search().never();

    let strategist = StrategistStage::new(
        Arc::new(sentiment),
        Arc::new(neutral_classifier()),
        Arc::new(AdvisorConfig::default()),
    );

    let report = QuantReport {
        ticker: ticker("ABC"),
        valuation: "P/E 12.0".to_string(),
        volatility: "Beta 0.9".to_string(),
        relative_performance: "+4.0% vs SPY +8.0%".to_string(),
        risk_flags: Vec::new(),
        assessment: "Stable.".to_string(),
        generated_at: Utc::now(),
    };

    let err = strategist
        .produce(&ticker("XYZ"), &report)
        .await
        .unwrap_err();
    assert!(matches!(err, AdvisorError::UpstreamContractViolation { .. }));
}
