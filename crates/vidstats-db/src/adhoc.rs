//! Validation and execution of synthesized ad-hoc statements.
//!
//! Statements arriving here were written by an external model, not by this
//! codebase, so nothing about them is trusted: every statement passes the
//! read-only check immediately before execution, and the scalar is decoded
//! leniently because the model controls the column type.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::DbError;

/// Validates a synthesized statement and returns the first column of the
/// first row as an integer. An empty result set or a NULL scalar is zero.
///
/// # Errors
///
/// Returns [`DbError::UnsafeStatement`] if the statement fails the
/// read-only check and [`DbError::Sqlx`] if execution fails.
pub async fn run_adhoc_count(pool: &PgPool, sql: &str) -> Result<i64, DbError> {
    ensure_read_only(sql)?;

    let row = sqlx::query(executable_text(sql)).fetch_optional(pool).await?;
    Ok(row.as_ref().map_or(0, decode_scalar))
}

/// Rejects anything that is not a single SELECT statement.
///
/// This is a lexical gate, not a parser: the text must begin with the
/// SELECT keyword after trimming, case-insensitively, and must not chain a
/// second statement behind a semicolon. A semicolon inside a string
/// literal trips the chain check too; the gate prefers false rejection.
/// [`run_adhoc_count`] applies the gate itself, but callers that want to
/// reject a statement without holding a pool can call it directly.
///
/// # Errors
///
/// Returns [`DbError::UnsafeStatement`] naming what was wrong.
pub fn ensure_read_only(sql: &str) -> Result<(), DbError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(DbError::UnsafeStatement {
            reason: "empty statement".to_string(),
        });
    }

    let keyword = trimmed.get(..6);
    let boundary = trimmed
        .chars()
        .nth(6)
        .is_none_or(|c| !c.is_alphanumeric() && c != '_');
    if keyword.is_none_or(|k| !k.eq_ignore_ascii_case("select")) || !boundary {
        return Err(DbError::UnsafeStatement {
            reason: "statement does not begin with SELECT".to_string(),
        });
    }

    if let Some(pos) = trimmed.find(';') {
        if !trimmed[pos + 1..].trim().is_empty() {
            return Err(DbError::UnsafeStatement {
                reason: "statement chains a second statement".to_string(),
            });
        }
    }

    Ok(())
}

/// Text actually sent to the server. The prepared-statement protocol does
/// not accept a trailing semicolon, so it is stripped here.
fn executable_text(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// Decodes the first column as an integer, whatever numeric type the
/// statement produced. Non-numeric scalars decode to zero.
#[allow(clippy::cast_possible_truncation)]
fn decode_scalar(row: &PgRow) -> i64 {
    if row.is_empty() {
        return 0;
    }
    if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(0) {
        return v;
    }
    if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(0) {
        return i64::from(v);
    }
    if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(0) {
        return i64::from(v);
    }
    if let Ok(Some(v)) = row.try_get::<Option<Decimal>, _>(0) {
        return v.round().to_i64().unwrap_or(0);
    }
    if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(0) {
        return v.round() as i64;
    }
    0
}
