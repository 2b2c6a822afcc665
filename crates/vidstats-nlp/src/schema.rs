//! Static description of the analytical schema.
//!
//! Both prompt builders splice these texts in, so the classifier and the
//! synthesizer always ground their output in the same field catalogue.

/// Bumped whenever the schema text below changes in substance.
pub const SCHEMA_VERSION: u32 = 1;

/// The `videos` relation as the model sees it.
pub const VIDEOS_SCHEMA: &str = "\
TABLE videos (
    id TEXT PRIMARY KEY,
    creator_id TEXT,
    video_created_at TIMESTAMPTZ,
    views_count BIGINT,
    likes_count BIGINT,
    comments_count BIGINT,
    reports_count BIGINT,
    created_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ
)";

/// The `video_snapshots` relation as the model sees it.
pub const SNAPSHOTS_SCHEMA: &str = "\
TABLE video_snapshots (
    id TEXT PRIMARY KEY,
    video_id TEXT REFERENCES videos(id),
    views_count BIGINT,
    likes_count BIGINT,
    comments_count BIGINT,
    reports_count BIGINT,
    delta_views_count BIGINT,
    delta_likes_count BIGINT,
    delta_comments_count BIGINT,
    delta_reports_count BIGINT,
    created_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ
)";

/// Reading guide for the two relations.
pub const SCHEMA_NOTES: &str = "\
videos holds one row per video with its lifetime totals: views_count, \
likes_count, comments_count and reports_count are cumulative over the \
video's life, and video_created_at is the publication timestamp. \
video_snapshots holds hourly measurements: each row repeats the \
cumulative counters at capture time plus signed delta_*_count columns \
with the change since the previous snapshot of the same video, and \
created_at is the capture timestamp. A negative delta is real data \
(views or likes were retracted), not an error. Questions about \"all \
time\" totals read videos; questions about growth, hourly dynamics or \
measurements read video_snapshots. A condition on a single calendar day \
compares the ::date part of the timestamp.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_relations_list_the_four_counters() {
        for table in [VIDEOS_SCHEMA, SNAPSHOTS_SCHEMA] {
            for column in ["views_count", "likes_count", "comments_count", "reports_count"] {
                assert!(table.contains(column), "{column} missing from:\n{table}");
            }
        }
    }

    #[test]
    fn snapshot_relation_lists_the_delta_columns() {
        for column in [
            "delta_views_count",
            "delta_likes_count",
            "delta_comments_count",
            "delta_reports_count",
        ] {
            assert!(SNAPSHOTS_SCHEMA.contains(column));
        }
        assert!(!VIDEOS_SCHEMA.contains("delta_"));
    }
}
