//! HTTP client for an OpenAI-compatible chat completions API.
//!
//! Wraps `reqwest` with the request envelope, API key handling and typed
//! error mapping. Non-success statuses surface the API's own error message
//! as [`NlpError::Api`] rather than a bare status code.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::NlpError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Client for a chat completions endpoint.
///
/// Cloning is cheap and shares the underlying connection pool. Use
/// [`OpenAiClient::new`] for production or [`OpenAiClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`NlpError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, NlpError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock,
    /// or for an API-compatible alternative endpoint).
    ///
    /// # Errors
    ///
    /// Returns [`NlpError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NlpError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NlpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("vidstats/0.1 (video-analytics)")
            .build()?;

        // Normalise: exactly one trailing slash so join() appends the final
        // path segment instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| NlpError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// The model name sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one system+user exchange and returns the assistant's text.
    ///
    /// With `json_output` set, the API is asked to emit a single JSON
    /// object instead of free text.
    ///
    /// # Errors
    ///
    /// - [`NlpError::Api`] if the API answers with a non-success status.
    /// - [`NlpError::Http`] on network failure.
    /// - [`NlpError::Deserialize`] if the response body is not the
    ///   expected envelope.
    /// - [`NlpError::EmptyOutput`] if the assistant's message is empty.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
        json_output: bool,
    ) -> Result<String, NlpError> {
        let url = self.endpoint()?;
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_text,
                },
            ],
            response_format: json_output.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(NlpError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| NlpError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(NlpError::EmptyOutput);
        }
        Ok(content)
    }

    fn endpoint(&self) -> Result<Url, NlpError> {
        self.base_url
            .join("chat/completions")
            .map_err(|_| NlpError::InvalidBaseUrl(self.base_url.to_string()))
    }
}
