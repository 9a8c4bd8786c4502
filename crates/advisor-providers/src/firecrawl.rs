//! Firecrawl web search sentiment provider

use advisor_core::{AdvisorError, Document, Result, SentimentProvider};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const SEARCH_URL: &str = "https://api.firecrawl.dev/v1/search";
const DEFAULT_RATE_LIMIT: u32 = 10;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Firecrawl search client implementing [`SentimentProvider`]
///
/// Issues one semantic web search per call and returns the scraped page
/// content in markdown. An empty result set is a valid degraded outcome,
/// not an error.
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: usize,
    #[serde(rename = "scrapeOptions")]
    scrape_options: ScrapeOptions,
}

#[derive(Debug, Serialize)]
struct ScrapeOptions {
    formats: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    success: bool,
    #[serde(default)]
    data: Vec<SearchResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl SearchResult {
    fn into_document(self) -> Document {
        Document {
            title: self.title.unwrap_or_else(|| "(untitled)".to_string()),
            url: self.url.unwrap_or_default(),
            // Fall back to the search snippet when full scrape was unavailable
            markdown: self.markdown.or(self.description).unwrap_or_default(),
        }
    }
}

impl FirecrawlClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_key` - Firecrawl API key
    /// * `rate_limit` - Maximum requests per minute
    /// * `request_timeout` - Per-request timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, request_timeout: Duration) -> Self {
        let quota = Quota::per_minute(
            NonZeroU32::new(rate_limit)
                .unwrap_or_else(|| NonZeroU32::new(DEFAULT_RATE_LIMIT).unwrap()),
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Create from the `FIRECRAWL_API_KEY` environment variable
    pub fn from_env(rate_limit: u32, request_timeout: Duration) -> Result<Self> {
        let api_key = std::env::var("FIRECRAWL_API_KEY").map_err(|_| {
            AdvisorError::Config("FIRECRAWL_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key, rate_limit, request_timeout))
    }

    fn parse_response(response: SearchResponse, query: &str) -> Result<Vec<Document>> {
        if !response.success {
            return Err(AdvisorError::data_unavailable(
                query,
                "sentiment",
                response
                    .error
                    .unwrap_or_else(|| "Firecrawl search reported failure".to_string()),
            ));
        }
        Ok(response
            .data
            .into_iter()
            .map(SearchResult::into_document)
            .collect())
    }
}

#[async_trait]
impl SentimentProvider for FirecrawlClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Document>> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let request = SearchRequest {
            query,
            limit,
            scrape_options: ScrapeOptions {
                formats: vec!["markdown"],
            },
        };

        let response = self
            .client
            .post(SEARCH_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdvisorError::data_unavailable(query, "sentiment", e))?;

        if !response.status().is_success() {
            return Err(AdvisorError::data_unavailable(
                query,
                "sentiment",
                format!("Firecrawl returned HTTP {}", response.status()),
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::data_unavailable(query, "sentiment", e))?;

        let documents = Self::parse_response(body, query)?;
        debug!(query, count = documents.len(), "firecrawl search complete");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_maps_documents() {
        let body = serde_json::json!({
            "success": true,
            "data": [
                {"title": "NVDA beats estimates", "url": "https://a", "markdown": "# Earnings\n..."},
                {"title": "Analyst note", "url": "https://b", "description": "Upgrade to buy"}
            ]
        });
        let response: SearchResponse = serde_json::from_value(body).unwrap();
        let docs = FirecrawlClient::parse_response(response, "q").unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "NVDA beats estimates");
        assert!(docs[0].markdown.starts_with("# Earnings"));
        // Snippet fallback when no markdown scrape came back
        assert_eq!(docs[1].markdown, "Upgrade to buy");
    }

    #[test]
    fn test_parse_response_empty_is_ok() {
        let body = serde_json::json!({"success": true, "data": []});
        let response: SearchResponse = serde_json::from_value(body).unwrap();
        let docs = FirecrawlClient::parse_response(response, "q").unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_parse_response_failure_is_data_unavailable() {
        let body = serde_json::json!({"success": false, "error": "quota exceeded"});
        let response: SearchResponse = serde_json::from_value(body).unwrap();
        let err = FirecrawlClient::parse_response(response, "q").unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
