//! Count and sum queries over the `video_snapshots` table.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use crate::DbError;

const COUNT_NEW_VIEWS_ON_SQL: &str = "SELECT COUNT(DISTINCT video_id) FROM video_snapshots \
     WHERE delta_views_count > 0 AND created_at::date = $1";

const SUM_CREATOR_DELTA_IN_WINDOW_SQL: &str =
    "SELECT COALESCE(SUM(s.delta_views_count), 0)::BIGINT \
     FROM video_snapshots s \
     JOIN videos v ON v.id = s.video_id \
     WHERE v.creator_id = $1 AND s.created_at BETWEEN $2 AND $3";

const SUM_DELTA_ON_SQL: &str =
    "SELECT COALESCE(SUM(delta_views_count), 0)::BIGINT FROM video_snapshots \
     WHERE created_at::date = $1";

/// Snapshot delta columns an analytical question may target.
///
/// Metric names arrive as free text from the classifier. Only names that
/// resolve to a variant here ever reach a statement, which is what makes
/// the column identifier safe to splice into SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMetric {
    Views,
    Likes,
    Comments,
    Reports,
}

impl DeltaMetric {
    /// Resolves a metric name, tolerating case and surrounding whitespace.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "views" => Some(Self::Views),
            "likes" => Some(Self::Likes),
            "comments" => Some(Self::Comments),
            "reports" => Some(Self::Reports),
            _ => None,
        }
    }

    /// The delta column this metric inspects.
    #[must_use]
    pub fn delta_column(self) -> &'static str {
        match self {
            Self::Views => "delta_views_count",
            Self::Likes => "delta_likes_count",
            Self::Comments => "delta_comments_count",
            Self::Reports => "delta_reports_count",
        }
    }
}

/// Counts distinct videos that gained views on the date. A video with
/// several positive-delta snapshots that day counts once.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_videos_with_new_views_on(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(COUNT_NEW_VIEWS_ON_SQL)
        .bind(date)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Counts snapshots where the metric's delta is negative, optionally
/// restricted to snapshots captured on one date.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_negative_delta(
    pool: &PgPool,
    metric: DeltaMetric,
    date: Option<NaiveDate>,
) -> Result<i64, DbError> {
    let column = metric.delta_column();
    let count = match date {
        Some(date) => {
            let sql = format!(
                "SELECT COUNT(*) FROM video_snapshots WHERE {column} < 0 AND created_at::date = $1"
            );
            sqlx::query_scalar::<_, i64>(&sql)
                .bind(date)
                .fetch_one(pool)
                .await?
        }
        None => {
            let sql = format!("SELECT COUNT(*) FROM video_snapshots WHERE {column} < 0");
            sqlx::query_scalar::<_, i64>(&sql).fetch_one(pool).await?
        }
    };
    Ok(count)
}

/// Sums view deltas over one creator's snapshots captured within the
/// inclusive time-of-day window on the date. Zero when nothing matches.
///
/// This is the one query where time-of-day matters: the window bounds are
/// full timestamps, not truncated dates, so a snapshot captured exactly at
/// the upper boundary is included.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sum_creator_views_delta_in_window(
    pool: &PgPool,
    creator_id: &str,
    date: NaiveDate,
    time_from: NaiveTime,
    time_to: NaiveTime,
) -> Result<i64, DbError> {
    let (window_from, window_to) = window_bounds(date, time_from, time_to);
    let sum = sqlx::query_scalar::<_, i64>(SUM_CREATOR_DELTA_IN_WINDOW_SQL)
        .bind(creator_id)
        .bind(window_from)
        .bind(window_to)
        .fetch_one(pool)
        .await?;
    Ok(sum)
}

/// Sums view deltas over all snapshots captured on the date. Zero when
/// nothing matches.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn sum_views_delta_on(pool: &PgPool, date: NaiveDate) -> Result<i64, DbError> {
    let sum = sqlx::query_scalar::<_, i64>(SUM_DELTA_ON_SQL)
        .bind(date)
        .fetch_one(pool)
        .await?;
    Ok(sum)
}

/// Composes a date and two times of day into absolute UTC window bounds.
fn window_bounds(
    date: NaiveDate,
    time_from: NaiveTime,
    time_to: NaiveTime,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        date.and_time(time_from).and_utc(),
        date.and_time(time_to).and_utc(),
    )
}
