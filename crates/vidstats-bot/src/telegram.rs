//! Minimal Telegram Bot API client: long polling and message sending.
//!
//! Only the two methods and the handful of fields this bot consumes are
//! modeled. Responses arrive in the `{ok, result, description}` envelope;
//! `ok: false` surfaces as [`TelegramError::Api`] with the API's own
//! description.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org/";

#[derive(Debug, Error)]
pub enum TelegramError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered `ok: false`.
    #[error("Telegram API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the envelope.
    #[error("malformed Telegram response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured endpoint is not a parseable URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// One long-poll update. Only message updates matter to this bot; anything
/// else arrives with `message: None` and is skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

/// Client for the Telegram Bot API. Cloning is cheap and shares the
/// underlying connection pool.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
    base_url: Url,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, poll_timeout_secs: u64) -> Result<Self, TelegramError> {
        Self::with_base_url(token, poll_timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`TelegramError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        token: &str,
        poll_timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, TelegramError> {
        // The HTTP timeout stays above the long-poll window so the server,
        // not the client, ends an idle poll.
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("vidstats/0.1 (video-analytics)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| TelegramError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url,
            poll_timeout_secs,
        })
    }

    /// Long-polls for updates newer than `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Api`] if the API answers `ok: false`,
    /// [`TelegramError::Http`] on network failure, or
    /// [`TelegramError::Deserialize`] for an unexpected body.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout_secs,
        };
        self.call("getUpdates", &request).await
    }

    /// Sends a plain-text reply to a chat.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`TelegramClient::get_updates`].
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessageRequest { chat_id, text })
            .await?;
        Ok(())
    }

    fn method_url(&self, method: &str) -> Result<Url, TelegramError> {
        self.base_url
            .join(&format!("bot{}/{method}", self.token))
            .map_err(|_| TelegramError::InvalidBaseUrl(self.base_url.to_string()))
    }

    // Error contexts carry the method name, never the URL: the URL embeds
    // the bot token.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + Sync,
        T: serde::de::DeserializeOwned + Default,
    {
        let url = self.method_url(method)?;
        let response = self.client.post(url).json(body).send().await?;
        let payload = response.text().await?;

        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&payload).map_err(|e| TelegramError::Deserialize {
                context: format!("{method} response"),
                source: e,
            })?;

        if !envelope.ok {
            return Err(TelegramError::Api(
                envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed")),
            ));
        }
        envelope
            .result
            .ok_or_else(|| TelegramError::Api(format!("{method} returned no result")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> TelegramClient {
        TelegramClient::with_base_url("test-token", 1, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn method_url_embeds_the_token() {
        let client = test_client("https://api.telegram.org");
        let url = client.method_url("getUpdates").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.telegram.org/bottest-token/getUpdates"
        );
    }

    #[tokio::test]
    async fn get_updates_parses_message_and_non_message_updates() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "ok": true,
            "result": [
                {
                    "update_id": 10,
                    "message": {
                        "message_id": 1,
                        "chat": { "id": 77, "type": "private" },
                        "text": "Сколько всего видео есть в системе?"
                    }
                },
                { "update_id": 11 }
            ]
        });

        Mock::given(method("POST"))
            .and(path("/bottest-token/getUpdates"))
            .and(body_partial_json(serde_json::json!({ "timeout": 1 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let updates = test_client(&server.uri())
            .get_updates(None)
            .await
            .expect("should parse updates");

        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().expect("first update has a message");
        assert_eq!(message.chat.id, 77);
        assert_eq!(
            message.text.as_deref(),
            Some("Сколько всего видео есть в системе?")
        );
        assert!(updates[1].message.is_none());
    }

    #[tokio::test]
    async fn get_updates_passes_the_offset() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bottest-token/getUpdates"))
            .and(body_partial_json(serde_json::json!({ "offset": 12 })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": true, "result": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let updates = test_client(&server.uri()).get_updates(Some(12)).await.unwrap();
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn send_message_posts_chat_and_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bottest-token/sendMessage"))
            .and(body_partial_json(
                serde_json::json!({ "chat_id": 99, "text": "42" }),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "ok": true, "result": { "message_id": 1 } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server.uri())
            .send_message(99, "42")
            .await
            .expect("should send");
    }

    #[tokio::test]
    async fn api_error_surfaces_the_description() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bottest-token/getUpdates"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 401,
                "description": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).get_updates(None).await.unwrap_err();

        match err {
            TelegramError::Api(description) => assert_eq!(description, "Unauthorized"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
