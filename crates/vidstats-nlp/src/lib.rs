//! Natural-language capabilities: intent classification and ad-hoc SQL
//! synthesis, both backed by an OpenAI-compatible chat completions API.

pub mod classifier;
pub mod client;
pub mod error;
pub mod prompts;
pub mod schema;
pub mod synthesizer;

pub use classifier::{normalize_model_output, Classifier, LlmClassifier};
pub use client::OpenAiClient;
pub use error::NlpError;
pub use synthesizer::{strip_code_fences, LlmSynthesizer, Synthesizer};
