//! System prompts for the two model-backed capabilities.

use crate::schema::{SCHEMA_NOTES, SNAPSHOTS_SCHEMA, VIDEOS_SCHEMA};

const CLASSIFIER_HEADER: &str = "\
You parse analytics questions about video statistics.

The user asks one question in natural language, usually in Russian. \
Answer with exactly one JSON object in one of the formats below. \
No SQL, no prose, no markdown, only the JSON object.

The data lives in a PostgreSQL database:";

const CLASSIFIER_SHAPES: &str = r#"Output formats:

1) Total number of videos in the system:
{"query_type": "total_videos"}

2) How many videos one creator published within a date range
(publication date video_created_at, both endpoints inclusive):
{"query_type": "creator_videos_in_date_range", "creator_id": "<string, verbatim from the question>", "date_from": "YYYY-MM-DD", "date_to": "YYYY-MM-DD"}

3) How many videos collected more than a number of lifetime views
(videos.views_count):
{"query_type": "videos_with_min_views", "views_threshold": <integer>}

4) Total lifetime views over all videos published within a date range
(both endpoints inclusive):
{"query_type": "sum_views_for_videos_in_date_range", "date_from": "YYYY-MM-DD", "date_to": "YYYY-MM-DD"}

5) How many distinct videos gained new views on a date:
{"query_type": "videos_with_new_views_on_date", "date": "YYYY-MM-DD"}

6) How many videos of one creator collected more than a number of
lifetime views (videos.views_count):
{"query_type": "creator_videos_with_min_views", "creator_id": "<string, verbatim from the question>", "views_threshold": <integer>}

7) How many snapshots have a negative delta for a metric:
{"query_type": "snapshots_with_negative_delta", "metric": "views | likes | comments | reports", "date": "YYYY-MM-DD or null"}

8) By how many views one creator's videos grew within a time window on
one day (from video_snapshots):
{"query_type": "creator_views_delta_in_time_range", "creator_id": "<string, verbatim from the question>", "date": "YYYY-MM-DD", "time_from": "HH:MM", "time_to": "HH:MM"}
The window is inclusive on both ends: [date time_from; date time_to].

9) By how many views all videos grew on a date (sum of snapshot deltas):
{"query_type": "total_views_delta_on_date", "date": "YYYY-MM-DD"}

Rules:
- Always answer with ONLY the JSON object, nothing before or after it.
- If the question fits none of the formats, answer {"query_type": "unknown"}.
- Convert natural-language dates ("28 ноября 2025", "November 28, 2025") to YYYY-MM-DD.
- A range like "с 1 ноября 2025 по 5 ноября 2025" includes both endpoints: date_from 2025-11-01, date_to 2025-11-05."#;

const SYNTHESIZER_HEADER: &str = "\
You write SQL for a PostgreSQL database with these tables:";

const SYNTHESIZER_RULES: &str = "\
Requirements:
- Write exactly one SQL statement, with no explanation and no quoting around it.
- The statement must be safe: SELECT only, no INSERT/UPDATE/DELETE and no DDL.
- For counts use COUNT(*) or COUNT(DISTINCT ...).
- For totals use SUM(...).
- The statement must return a single scalar value.";

/// System prompt for intent classification: the schema, the closed set of
/// output shapes with examples, and the date-normalization rules.
#[must_use]
pub fn classifier_system_prompt() -> String {
    format!(
        "{CLASSIFIER_HEADER}\n\n{VIDEOS_SCHEMA}\n\n{SNAPSHOTS_SCHEMA}\n\n{SCHEMA_NOTES}\n\n{CLASSIFIER_SHAPES}"
    )
}

/// System prompt for ad-hoc SQL synthesis: the literal schema and the
/// read-only constraint.
#[must_use]
pub fn synthesizer_system_prompt() -> String {
    format!("{SYNTHESIZER_HEADER}\n\n{VIDEOS_SCHEMA};\n\n{SNAPSHOTS_SCHEMA};\n\n{SYNTHESIZER_RULES}")
}
