//! Intent classification backed by an external language model.

use async_trait::async_trait;
use tracing::{debug, warn};
use vidstats_core::{query::is_known_query_type, QueryDescriptor};

use crate::client::OpenAiClient;
use crate::prompts::classifier_system_prompt;

/// Maps free-form user text to a structured query descriptor.
///
/// Implementations never fail: any internal problem resolves to the
/// `unknown` descriptor so the caller can take the fallback path.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> QueryDescriptor;
}

/// Production classifier calling an OpenAI-compatible API in JSON mode.
pub struct LlmClassifier {
    client: OpenAiClient,
    system_prompt: String,
}

impl LlmClassifier {
    #[must_use]
    pub fn new(client: OpenAiClient) -> Self {
        Self {
            client,
            system_prompt: classifier_system_prompt(),
        }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, text: &str) -> QueryDescriptor {
        match self.client.complete(&self.system_prompt, text, true).await {
            Ok(raw) => {
                debug!(raw = %raw, "classifier output");
                normalize_model_output(&raw)
            }
            Err(e) => {
                warn!(error = %e, "classification call failed, treating as unknown");
                QueryDescriptor::Unknown
            }
        }
    }
}

/// Folds raw model output into a descriptor without ever failing.
///
/// Unparsable output and output without a `query_type` string become
/// `Unknown`. A tag outside the fixed set becomes `Unsupported`, and a
/// known tag with a broken payload becomes `Malformed`; neither collapses
/// into `Unknown`, so the dispatcher can tell the cases apart.
#[must_use]
pub fn normalize_model_output(raw: &str) -> QueryDescriptor {
    let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "model output is not valid JSON, treating as unknown");
            return QueryDescriptor::Unknown;
        }
    };

    let Some(tag) = value.get("query_type").and_then(serde_json::Value::as_str) else {
        warn!("model output lacks a query_type, treating as unknown");
        return QueryDescriptor::Unknown;
    };

    if !is_known_query_type(tag) {
        return QueryDescriptor::Unsupported {
            query_type: tag.to_string(),
        };
    }

    let tag = tag.to_string();
    match serde_json::from_value::<QueryDescriptor>(value) {
        Ok(descriptor) => descriptor,
        Err(e) => QueryDescriptor::Malformed {
            query_type: tag,
            reason: e.to_string(),
        },
    }
}
