//! Sequences classification, dispatch and the synthesis fallback into one
//! user-facing answer.

use std::sync::Arc;

use tracing::{error, info, warn};
use vidstats_core::QueryDescriptor;
use vidstats_db::{ensure_read_only, DbError};
use vidstats_nlp::{Classifier, Synthesizer};

use crate::store::AnalyticsStore;

/// Reply when the inbound message carries no usable text.
pub const MSG_CANNOT_PARSE: &str = "could not parse the request";
/// Reply when a query failed against the store, at dispatch or fallback.
pub const MSG_DB_ERROR: &str = "database error";
/// Reply when no intent matched and synthesis produced nothing usable.
pub const MSG_CANNOT_UNDERSTAND: &str = "could not understand the request";
/// Reply when the synthesized statement failed the read-only gate.
pub const MSG_UNSAFE_QUERY: &str = "could not build a safe query for this question";

/// Turns one free-form question into one answer string.
///
/// `answer` never fails: every internal failure maps to one of the fixed
/// reply strings above, and everything else comes back as the scalar
/// rendered in decimal. The engine holds no per-request state, so one
/// instance serves concurrent messages.
pub struct AnswerEngine {
    classifier: Arc<dyn Classifier>,
    synthesizer: Arc<dyn Synthesizer>,
    store: Arc<dyn AnalyticsStore>,
}

impl AnswerEngine {
    #[must_use]
    pub fn new(
        classifier: Arc<dyn Classifier>,
        synthesizer: Arc<dyn Synthesizer>,
        store: Arc<dyn AnalyticsStore>,
    ) -> Self {
        Self {
            classifier,
            synthesizer,
            store,
        }
    }

    /// Answers one question.
    ///
    /// Known intents go through the fixed-query dispatch; the `unknown`
    /// sentinel takes the synthesis fallback. Descriptors with an
    /// unrecognized tag or a broken payload still go through dispatch,
    /// which owns their lenient-zero and parameter-error behavior.
    pub async fn answer(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return MSG_CANNOT_PARSE.to_string();
        }

        let descriptor = self.classifier.classify(trimmed).await;
        info!(query_type = descriptor.query_type(), "classified request");

        if descriptor == QueryDescriptor::Unknown {
            return self.answer_via_fallback(trimmed).await;
        }

        match self.store.run_descriptor(&descriptor).await {
            Ok(result) => result.to_string(),
            Err(e) => {
                error!(error = %e, descriptor = ?descriptor, input = %trimmed, "dispatch failed");
                MSG_DB_ERROR.to_string()
            }
        }
    }

    async fn answer_via_fallback(&self, text: &str) -> String {
        let statement = match self.synthesizer.synthesize(text).await {
            Ok(statement) => statement,
            Err(e) => {
                warn!(error = %e, input = %text, "fallback synthesis failed");
                return MSG_CANNOT_UNDERSTAND.to_string();
            }
        };

        if let Err(e) = ensure_read_only(&statement) {
            warn!(error = %e, statement = %statement, input = %text, "rejected fallback statement");
            return MSG_UNSAFE_QUERY.to_string();
        }

        info!(statement = %statement, "running fallback statement");

        match self.store.run_adhoc(&statement).await {
            Ok(result) => result.to_string(),
            // The store re-checks the statement before running it; a stray
            // rejection here still gets the safety reply, not a DB error.
            Err(DbError::UnsafeStatement { reason }) => {
                warn!(reason = %reason, statement = %statement, "store rejected fallback statement");
                MSG_UNSAFE_QUERY.to_string()
            }
            Err(e) => {
                error!(error = %e, statement = %statement, input = %text, "fallback execution failed");
                MSG_DB_ERROR.to_string()
            }
        }
    }
}
