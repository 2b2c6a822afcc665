//! Ad-hoc SQL synthesis backed by the same external model.

use async_trait::async_trait;
use tracing::debug;

use crate::client::OpenAiClient;
use crate::error::NlpError;
use crate::prompts::synthesizer_system_prompt;

/// Writes one statement for a question no fixed intent covers.
///
/// The returned text is cleaned of code fences but not validated; the
/// execution layer performs the read-only check immediately before
/// running it.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<String, NlpError>;
}

/// Production synthesizer calling an OpenAI-compatible API in plain-text
/// mode.
pub struct LlmSynthesizer {
    client: OpenAiClient,
    system_prompt: String,
}

impl LlmSynthesizer {
    #[must_use]
    pub fn new(client: OpenAiClient) -> Self {
        Self {
            client,
            system_prompt: synthesizer_system_prompt(),
        }
    }
}

#[async_trait]
impl Synthesizer for LlmSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<String, NlpError> {
        let raw = self.client.complete(&self.system_prompt, text, false).await?;
        debug!(raw = %raw, "synthesizer output");
        let statement = strip_code_fences(&raw);
        if statement.is_empty() {
            return Err(NlpError::EmptyOutput);
        }
        Ok(statement.to_string())
    }
}

/// Drops a wrapping triple-backtick fence pair and its language tag, if
/// present. Models fence their output now and then even when told not to.
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        Some(_) => rest,
        None => strip_leading_sql_tag(rest),
    };
    rest.trim()
}

// A one-line fence keeps the language tag on the same line as the
// statement, so only the literal `sql` tag can be dropped safely.
fn strip_leading_sql_tag(text: &str) -> &str {
    let trimmed = text.trim_start();
    match trimmed.get(..3) {
        Some(tag) if tag.eq_ignore_ascii_case("sql") => {
            let after = &trimmed[3..];
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                after
            } else {
                text
            }
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfenced_text_passes_through_trimmed() {
        assert_eq!(
            strip_code_fences("  SELECT COUNT(*) FROM videos\n"),
            "SELECT COUNT(*) FROM videos"
        );
    }

    #[test]
    fn strips_a_fence_with_language_tag() {
        assert_eq!(
            strip_code_fences("```sql\nSELECT COUNT(*) FROM videos\n```"),
            "SELECT COUNT(*) FROM videos"
        );
    }

    #[test]
    fn strips_a_bare_fence() {
        assert_eq!(
            strip_code_fences("```\nSELECT 1\n```"),
            "SELECT 1"
        );
    }

    #[test]
    fn strips_a_single_line_fence() {
        assert_eq!(strip_code_fences("```SELECT 1```"), "SELECT 1");
    }

    #[test]
    fn strips_a_single_line_fence_with_language_tag() {
        assert_eq!(strip_code_fences("```sql SELECT 1```"), "SELECT 1");
        assert_eq!(strip_code_fences("```SQL SELECT 1```"), "SELECT 1");
        // A word that merely starts with "sql" is not a tag.
        assert_eq!(strip_code_fences("```sqlite_master```"), "sqlite_master");
    }

    #[test]
    fn keeps_a_statement_spanning_lines() {
        let fenced = "```sql\nSELECT COUNT(*)\nFROM videos\nWHERE views_count > 10\n```";
        assert_eq!(
            strip_code_fences(fenced),
            "SELECT COUNT(*)\nFROM videos\nWHERE views_count > 10"
        );
    }

    #[test]
    fn empty_fence_collapses_to_empty() {
        assert_eq!(strip_code_fences("```sql\n```"), "");
        assert_eq!(strip_code_fences("```sql```"), "");
        assert_eq!(strip_code_fences(""), "");
    }
}
