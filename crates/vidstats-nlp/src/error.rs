use thiserror::Error;

/// Errors returned by the language-model client.
#[derive(Debug, Error)]
pub enum NlpError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("model API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("malformed model response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model answered with no usable text.
    #[error("model returned no output")]
    EmptyOutput,

    /// The configured endpoint is not a parseable URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}
