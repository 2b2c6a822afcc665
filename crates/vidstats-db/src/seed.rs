//! Bulk import of a statistics dataset from JSON.
//!
//! The dataset nests each video's snapshots under the video record. All
//! rows are written inside a single transaction; rows whose identifier
//! already exists are left untouched, so re-running a load is harmless.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use sqlx::PgPool;

use crate::DbError;

const INSERT_VIDEO_SQL: &str = "INSERT INTO videos \
       (id, creator_id, video_created_at, \
        views_count, likes_count, comments_count, reports_count, \
        created_at, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
     ON CONFLICT (id) DO NOTHING";

const INSERT_SNAPSHOT_SQL: &str = "INSERT INTO video_snapshots \
       (id, video_id, \
        views_count, likes_count, comments_count, reports_count, \
        delta_views_count, delta_likes_count, delta_comments_count, delta_reports_count, \
        created_at, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
     ON CONFLICT (id) DO NOTHING";

#[derive(Debug, Deserialize)]
pub struct Dataset {
    pub videos: Vec<VideoRecord>,
}

#[derive(Debug, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub creator_id: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub video_created_at: DateTime<Utc>,
    pub views_count: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub reports_count: i64,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub snapshots: Vec<SnapshotRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotRecord {
    pub id: String,
    pub video_id: String,
    pub views_count: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub reports_count: i64,
    pub delta_views_count: i64,
    pub delta_likes_count: i64,
    pub delta_comments_count: i64,
    pub delta_reports_count: i64,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Record counts from one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetStats {
    pub videos: usize,
    pub snapshots: usize,
}

impl Dataset {
    /// Parses a dataset from raw JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the text is not a valid dataset.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Inserts every video and snapshot in the dataset within one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; the whole batch is then
/// rolled back.
pub async fn load_dataset(pool: &PgPool, dataset: &Dataset) -> Result<DatasetStats, DbError> {
    let mut tx = pool.begin().await?;
    let mut stats = DatasetStats {
        videos: 0,
        snapshots: 0,
    };

    for video in &dataset.videos {
        sqlx::query(INSERT_VIDEO_SQL)
            .bind(&video.id)
            .bind(&video.creator_id)
            .bind(video.video_created_at)
            .bind(video.views_count)
            .bind(video.likes_count)
            .bind(video.comments_count)
            .bind(video.reports_count)
            .bind(video.created_at)
            .bind(video.updated_at)
            .execute(&mut *tx)
            .await?;
        stats.videos += 1;

        for snapshot in &video.snapshots {
            sqlx::query(INSERT_SNAPSHOT_SQL)
                .bind(&snapshot.id)
                .bind(&snapshot.video_id)
                .bind(snapshot.views_count)
                .bind(snapshot.likes_count)
                .bind(snapshot.comments_count)
                .bind(snapshot.reports_count)
                .bind(snapshot.delta_views_count)
                .bind(snapshot.delta_likes_count)
                .bind(snapshot.delta_comments_count)
                .bind(snapshot.delta_reports_count)
                .bind(snapshot.created_at)
                .bind(snapshot.updated_at)
                .execute(&mut *tx)
                .await?;
            stats.snapshots += 1;
        }
    }

    tx.commit().await?;
    Ok(stats)
}

/// Accepts RFC 3339 timestamps as well as naive `YYYY-MM-DDTHH:MM:SS`
/// variants, which are read as UTC.
fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).map_err(D::Error::custom)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!("unrecognized timestamp '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_nested_dataset() {
        let dataset = Dataset::from_json(
            r#"{
                "videos": [
                    {
                        "id": "v1",
                        "creator_id": "c1",
                        "video_created_at": "2025-11-01T10:00:00Z",
                        "views_count": 100,
                        "likes_count": 10,
                        "comments_count": 2,
                        "reports_count": 0,
                        "created_at": "2025-11-01T10:00:00Z",
                        "updated_at": "2025-11-01T12:00:00Z",
                        "snapshots": [
                            {
                                "id": "s1",
                                "video_id": "v1",
                                "views_count": 100,
                                "likes_count": 10,
                                "comments_count": 2,
                                "reports_count": 0,
                                "delta_views_count": 5,
                                "delta_likes_count": 1,
                                "delta_comments_count": 0,
                                "delta_reports_count": -1,
                                "created_at": "2025-11-01T11:00:00Z",
                                "updated_at": "2025-11-01T11:00:00Z"
                            }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(dataset.videos.len(), 1);
        let video = &dataset.videos[0];
        assert_eq!(video.creator_id, "c1");
        assert_eq!(video.snapshots.len(), 1);
        assert_eq!(video.snapshots[0].delta_reports_count, -1);
    }

    #[test]
    fn snapshots_default_to_empty() {
        let dataset = Dataset::from_json(
            r#"{
                "videos": [
                    {
                        "id": "v1",
                        "creator_id": "c1",
                        "video_created_at": "2025-11-01T10:00:00Z",
                        "views_count": 0,
                        "likes_count": 0,
                        "comments_count": 0,
                        "reports_count": 0,
                        "created_at": "2025-11-01T10:00:00Z",
                        "updated_at": "2025-11-01T10:00:00Z"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert!(dataset.videos[0].snapshots.is_empty());
    }

    #[test]
    fn timestamps_without_an_offset_are_read_as_utc() {
        let parsed = parse_timestamp("2025-11-01T10:30:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-11-01T10:30:00+00:00");

        let spaced = parse_timestamp("2025-11-01 10:30:00.250").unwrap();
        assert_eq!(spaced.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn offset_timestamps_normalize_to_utc() {
        let parsed = parse_timestamp("2025-11-01T12:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-11-01T10:00:00+00:00");
    }

    #[test]
    fn garbage_timestamps_fail_the_parse() {
        assert!(parse_timestamp("yesterday").is_err());

        let err = Dataset::from_json(
            r#"{"videos": [{"id": "v1", "creator_id": "c1", "video_created_at": "nope",
                "views_count": 0, "likes_count": 0, "comments_count": 0, "reports_count": 0,
                "created_at": "2025-11-01T10:00:00Z", "updated_at": "2025-11-01T10:00:00Z"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unrecognized timestamp"), "{err}");
    }

    #[test]
    fn inserts_skip_existing_identifiers() {
        assert!(INSERT_VIDEO_SQL.contains("ON CONFLICT (id) DO NOTHING"));
        assert!(INSERT_SNAPSHOT_SQL.contains("ON CONFLICT (id) DO NOTHING"));
    }
}
