//! Durable report sink: Postgres log plus optional blob archive

use advisor_core::{
    AdvisorError, Recommendation, ReferenceHandle, ReportSink, Result, Ticker,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

const CREATE_REPORTS_LOG: &str = "CREATE TABLE IF NOT EXISTS reports_log (\
     id UUID PRIMARY KEY DEFAULT gen_random_uuid(), \
     ticker VARCHAR(10) NOT NULL, \
     content TEXT NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL DEFAULT now())";

/// Archive target for rendered reports: an Azure blob container addressed
/// by a SAS URL, so uploads are plain authenticated PUTs
#[derive(Debug, Clone)]
pub struct BlobArchive {
    client: Client,
    container_sas_url: String,
}

impl BlobArchive {
    /// Create an archive over a container SAS URL
    /// (`https://{account}.blob.core.windows.net/{container}?{sas}`)
    pub fn new(container_sas_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            container_sas_url: container_sas_url.into(),
        }
    }

    /// Create from the `REPORTS_CONTAINER_SAS_URL` environment variable
    pub fn from_env() -> Option<Self> {
        std::env::var("REPORTS_CONTAINER_SAS_URL").ok().map(Self::new)
    }

    /// Blob URLs for a named blob: the upload target (with SAS token) and
    /// the plain retrievable URL
    fn blob_urls(&self, blob_name: &str) -> (String, String) {
        match self.container_sas_url.split_once('?') {
            Some((base, sas)) => {
                let base = base.trim_end_matches('/');
                (format!("{base}/{blob_name}?{sas}"), format!("{base}/{blob_name}"))
            }
            None => {
                let base = self.container_sas_url.trim_end_matches('/');
                (format!("{base}/{blob_name}"), format!("{base}/{blob_name}"))
            }
        }
    }

    /// Upload rendered markdown, returning the retrievable blob URL
    pub async fn upload(&self, blob_name: &str, content: &str) -> Result<String> {
        let (upload_url, blob_url) = self.blob_urls(blob_name);

        let response = self
            .client
            .put(&upload_url)
            .header("x-ms-blob-type", "BlockBlob")
            .header("Content-Type", "text/markdown")
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| AdvisorError::persistence(blob_name, e))?;

        if !response.status().is_success() {
            return Err(AdvisorError::persistence(
                blob_name,
                format!("blob upload returned HTTP {}", response.status()),
            ));
        }
        Ok(blob_url)
    }
}

/// Postgres-backed [`ReportSink`]
///
/// Appends one immutable `reports_log` row per run; inserts from concurrent
/// runs for different tickers land as separate rows, never interleaved. Blob
/// archival is best-effort: a failed upload downgrades to a warning because
/// the durable log row already exists.
pub struct PostgresReportSink {
    pool: PgPool,
    archive: Option<BlobArchive>,
}

impl PostgresReportSink {
    /// Connect and make sure the log table exists
    pub async fn connect(database_url: &str, archive: Option<BlobArchive>) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(database_url)
            .await
            .map_err(|e| AdvisorError::Config(format!("database connection failed: {e}")))?;

        sqlx::query(CREATE_REPORTS_LOG)
            .execute(&pool)
            .await
            .map_err(|e| AdvisorError::Config(format!("reports_log bootstrap failed: {e}")))?;

        Ok(Self { pool, archive })
    }

    /// Wrap an existing pool (used by tests and embedding callers)
    pub fn with_pool(pool: PgPool, archive: Option<BlobArchive>) -> Self {
        Self { pool, archive }
    }

    /// Ticker-derived archive name, e.g. `investment_report_NVDA_2026-08-30.md`
    pub fn blob_name(ticker: &Ticker) -> String {
        format!(
            "investment_report_{}_{}.md",
            ticker.as_str(),
            Utc::now().format("%Y-%m-%d")
        )
    }
}

#[async_trait]
impl ReportSink for PostgresReportSink {
    async fn persist(
        &self,
        ticker: &Ticker,
        recommendation: &Recommendation,
    ) -> Result<ReferenceHandle> {
        let content = recommendation.to_markdown();

        let record_id: uuid::Uuid = sqlx::query_scalar(
            "INSERT INTO reports_log (ticker, content) VALUES ($1, $2) RETURNING id",
        )
        .bind(ticker.as_str())
        .bind(&content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AdvisorError::persistence(ticker.as_str(), e))?;

        info!(ticker = %ticker, %record_id, "report persisted to reports_log");

        let archive_url = match &self.archive {
            Some(archive) => match archive.upload(&Self::blob_name(ticker), &content).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "blob archival failed; log row kept");
                    None
                }
            },
            None => None,
        };

        Ok(ReferenceHandle {
            record_id,
            archive_url,
        })
    }
}
