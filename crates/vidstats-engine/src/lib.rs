//! The answer engine: classify a question, dispatch the matching fixed
//! query, or fall back to synthesized read-only SQL.

pub mod orchestrator;
pub mod store;

pub use orchestrator::{
    AnswerEngine, MSG_CANNOT_PARSE, MSG_CANNOT_UNDERSTAND, MSG_DB_ERROR, MSG_UNSAFE_QUERY,
};
pub use store::{AnalyticsStore, PgAnalyticsStore};
