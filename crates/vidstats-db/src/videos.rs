//! Count and sum queries over the `videos` table.
//!
//! Publication filters compare `video_created_at::date` so that the
//! time-of-day component never affects a date-range answer, and both
//! range endpoints are inclusive. View thresholds are strict
//! greater-than. Sums coalesce to zero so an empty match never yields
//! NULL.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::DbError;

const COUNT_ALL_SQL: &str = "SELECT COUNT(*) FROM videos";

const COUNT_BY_CREATOR_BETWEEN_SQL: &str = "SELECT COUNT(*) FROM videos \
     WHERE creator_id = $1 AND video_created_at::date BETWEEN $2 AND $3";

const COUNT_VIEWS_ABOVE_SQL: &str = "SELECT COUNT(*) FROM videos WHERE views_count > $1";

const COUNT_CREATOR_VIEWS_ABOVE_SQL: &str =
    "SELECT COUNT(*) FROM videos WHERE creator_id = $1 AND views_count > $2";

const SUM_VIEWS_BETWEEN_SQL: &str = "SELECT COALESCE(SUM(views_count), 0)::BIGINT FROM videos \
     WHERE video_created_at::date BETWEEN $1 AND $2";

/// Counts every video record.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_all(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(COUNT_ALL_SQL)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Counts one creator's videos published within the inclusive date range.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_by_creator_between(
    pool: &PgPool,
    creator_id: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(COUNT_BY_CREATOR_BETWEEN_SQL)
        .bind(creator_id)
        .bind(date_from)
        .bind(date_to)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Counts videos whose cumulative views strictly exceed the threshold.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_with_views_above(pool: &PgPool, threshold: i64) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(COUNT_VIEWS_ABOVE_SQL)
        .bind(threshold)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Counts one creator's videos whose cumulative views strictly exceed the
/// threshold.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_by_creator_with_views_above(
    pool: &PgPool,
    creator_id: &str,
    threshold: i64,
) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(COUNT_CREATOR_VIEWS_ABOVE_SQL)
        .bind(creator_id)
        .bind(threshold)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Sums cumulative views over videos published within the inclusive date
/// range. Zero when no videos match.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sum_views_between(
    pool: &PgPool,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<i64, DbError> {
    let sum = sqlx::query_scalar::<_, i64>(SUM_VIEWS_BETWEEN_SQL)
        .bind(date_from)
        .bind(date_to)
        .fetch_one(pool)
        .await?;
    Ok(sum)
}
