//! LLM-backed tone classifier over an OpenAI-compatible chat API

use super::{ToneClassifier, ToneJudgment};
use advisor_core::{AdvisorError, Document, Result, Ticker, Tone};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// How much document body the classifier sends to the model
const MAX_EXCERPT_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = r#"You classify the tone of a news document about a specific stock.

Respond with a single JSON object and nothing else:
{
    "tone": "positive" | "neutral" | "negative",
    "structural_risk": true | false
}

"structural_risk" is true only for durable qualitative events: a major
lawsuit, a fraud investigation, or a regulatory ban. Short-term negative
news (missed earnings, downgrades) is negative but not structural.
Do not exaggerate sentiment; base the judgment strictly on the document.
"#;

/// Configuration for the LLM classifier
#[derive(Debug, Clone)]
pub struct LlmClassifierConfig {
    pub api_key: String,
    /// Base URL, customizable for OpenAI-compatible deployments
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

impl LlmClassifierConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read `OPENAI_API_KEY` (and optionally `OPENAI_API_BASE`,
    /// `OPENAI_MODEL_NAME`) from the environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AdvisorError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        let mut config = Self::new(api_key);
        if let Ok(base) = std::env::var("OPENAI_API_BASE") {
            config.api_base = base;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL_NAME") {
            config.model = model;
        }
        Ok(config)
    }
}

/// Tone classifier that delegates the judgment call to a chat model
///
/// The surrounding policy stays deterministic; only the per-document tone
/// and structural-risk judgment comes from the model, as strict JSON.
pub struct LlmToneClassifier {
    client: Client,
    config: LlmClassifierConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JudgmentPayload {
    tone: String,
    #[serde(default)]
    structural_risk: bool,
}

impl LlmToneClassifier {
    pub fn new(config: LlmClassifierConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    fn user_prompt(ticker: &Ticker, document: &Document) -> String {
        let excerpt: String = document.markdown.chars().take(MAX_EXCERPT_CHARS).collect();
        format!(
            "Stock: {ticker}\nTitle: {title}\nDocument:\n{excerpt}",
            title = document.title,
        )
    }

    /// Parse the model output, tolerating a fenced code block around the JSON
    fn parse_judgment(ticker: &Ticker, content: &str) -> Result<ToneJudgment> {
        let stripped = strip_code_fences(content);
        let payload: JudgmentPayload = serde_json::from_str(stripped).map_err(|e| {
            AdvisorError::data_unavailable(
                ticker.as_str(),
                "sentiment",
                format!("classifier returned unparseable judgment: {e}"),
            )
        })?;

        let tone = match payload.tone.to_lowercase().as_str() {
            "positive" => Tone::Positive,
            "neutral" => Tone::Neutral,
            "negative" => Tone::Negative,
            other => {
                return Err(AdvisorError::data_unavailable(
                    ticker.as_str(),
                    "sentiment",
                    format!("classifier returned unknown tone {other:?}"),
                ));
            }
        };

        Ok(ToneJudgment {
            tone,
            // Structural risk only makes sense on negative news
            structural_risk: payload.structural_risk && tone == Tone::Negative,
        })
    }
}

/// Strip a markdown code fence (```json ... ```) if the model wrapped its output
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[async_trait]
impl ToneClassifier for LlmToneClassifier {
    async fn classify(&self, ticker: &Ticker, document: &Document) -> Result<ToneJudgment> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::user_prompt(ticker, document),
                },
            ],
            temperature: 0.0,
            max_tokens: 128,
        };

        let url = format!("{}/chat/completions", self.config.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdvisorError::data_unavailable(ticker.as_str(), "sentiment", e))?;

        if !response.status().is_success() {
            return Err(AdvisorError::data_unavailable(
                ticker.as_str(),
                "sentiment",
                format!("classifier endpoint returned HTTP {}", response.status()),
            ));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::data_unavailable(ticker.as_str(), "sentiment", e))?;

        let content = body
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| {
                AdvisorError::data_unavailable(
                    ticker.as_str(),
                    "sentiment",
                    "classifier returned no choices",
                )
            })?;

        let judgment = Self::parse_judgment(ticker, content)?;
        debug!(ticker = %ticker, title = %document.title, ?judgment, "llm tone judgment");
        Ok(judgment)
    }

    fn name(&self) -> &str {
        "llm"
    }
}
