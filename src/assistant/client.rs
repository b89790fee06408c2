use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::retry::RetryPolicy;

/// Framing placed ahead of every user question.
const PREAMBLE: &str = "You are an assistant for a National Youth Service Corps \
Community Development Service (CDS) group. Give practical, step-by-step guidance \
on CDS projects, elections and community development.\n\nQuestion: ";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Settings for the generative-AI relay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssistantConfig {
    /// Without a key the relay reports itself unavailable.
    #[serde(default)]
    pub assistant_api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub assistant_endpoint: String,
    #[serde(default = "default_model")]
    pub assistant_model: String,
    #[serde(default = "default_max_attempts")]
    pub assistant_max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub assistant_initial_delay_ms: u64,
    /// Upper bound on a single attempt, connection included.
    #[serde(default = "default_timeout_ms")]
    pub assistant_timeout_ms: u64,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_attempts() -> u32 {
    RetryPolicy::default().max_attempts
}

fn default_initial_delay_ms() -> u64 {
    RetryPolicy::default().initial_delay.as_millis() as u64
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            assistant_api_key: None,
            assistant_endpoint: default_endpoint(),
            assistant_model: default_model(),
            assistant_max_attempts: default_max_attempts(),
            assistant_initial_delay_ms: default_initial_delay_ms(),
            assistant_timeout_ms: default_timeout_ms(),
        }
    }
}

impl AssistantConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.assistant_max_attempts,
            initial_delay: Duration::from_millis(self.assistant_initial_delay_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.assistant_timeout_ms)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GeneratedCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeneratedCandidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    /// The text of the first candidate reply.
    fn reply(self) -> Result<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| Error::AssistantUnavailable("The assistant returned no reply".into()))
    }
}

/// Relays chat messages to a Gemini-style `generateContent` endpoint.
pub struct AssistantClient {
    http: reqwest::Client,
    config: AssistantConfig,
    retry: RetryPolicy,
}

impl AssistantClient {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            retry: config.retry_policy(),
            config,
        }
    }

    /// Whether an API key has been configured.
    pub fn is_configured(&self) -> bool {
        self.config.assistant_api_key.is_some()
    }

    /// Ask the assistant a question, retrying transient failures.
    pub async fn chat(&self, message: &str) -> Result<String> {
        let Some(api_key) = self.config.assistant_api_key.as_deref() else {
            return Err(Error::AssistantUnavailable(
                "No assistant API key is configured".into(),
            ));
        };
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::bad_request("A message is required"));
        }

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{PREAMBLE}{message}"),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2048,
            },
        };
        let request = &request;
        self.retry
            .run(|attempt| {
                debug!("Assistant request attempt {attempt}");
                self.generate(api_key, request)
            })
            .await
    }

    async fn generate(&self, api_key: &str, request: &GenerateRequest) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.assistant_endpoint.trim_end_matches('/'),
            self.config.assistant_model
        );
        // The key travels in a header so it never appears in a URL or an error.
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .timeout(self.config.timeout())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Assistant endpoint answered {status}: {body}");
            return Err(Error::AssistantUnavailable(format!(
                "Assistant endpoint answered {status}"
            )));
        }

        response.json::<GenerateResponse>().await?.reply()
    }
}
