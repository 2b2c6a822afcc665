//! The query descriptor exchanged between the intent classifier and the
//! query dispatcher.
//!
//! The classifier builds exactly one descriptor per user question and the
//! dispatcher consumes it once; descriptors are never persisted. On the
//! wire a descriptor is a single JSON object tagged by `query_type`.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer};

/// Every tag the external model is allowed to emit, `unknown` included.
pub const KNOWN_QUERY_TYPES: [&str; 10] = [
    "total_videos",
    "creator_videos_in_date_range",
    "videos_with_min_views",
    "creator_videos_with_min_views",
    "sum_views_for_videos_in_date_range",
    "videos_with_new_views_on_date",
    "snapshots_with_negative_delta",
    "creator_views_delta_in_time_range",
    "total_views_delta_on_date",
    "unknown",
];

/// A structured analytical question.
///
/// `Unsupported` and `Malformed` never appear on the wire: the classifier
/// constructs them while normalizing model output, so that the dispatcher
/// can route a well-formed-but-unrecognized tag to its zero-result path
/// and a known tag with a broken payload to its missing-parameter error,
/// without either case being reclassified as `Unknown`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "query_type", rename_all = "snake_case")]
pub enum QueryDescriptor {
    /// Count of all video records.
    TotalVideos,

    /// Count of one creator's videos published within an inclusive date range.
    CreatorVideosInDateRange {
        creator_id: String,
        date_from: NaiveDate,
        date_to: NaiveDate,
    },

    /// Count of videos whose cumulative views strictly exceed the threshold.
    VideosWithMinViews {
        #[serde(deserialize_with = "de_lenient_i64")]
        views_threshold: i64,
    },

    /// Count of one creator's videos whose cumulative views strictly exceed
    /// the threshold.
    CreatorVideosWithMinViews {
        creator_id: String,
        #[serde(deserialize_with = "de_lenient_i64")]
        views_threshold: i64,
    },

    /// Sum of cumulative views over videos published within an inclusive
    /// date range.
    SumViewsForVideosInDateRange {
        date_from: NaiveDate,
        date_to: NaiveDate,
    },

    /// Count of distinct videos with at least one positive view delta on
    /// the date.
    VideosWithNewViewsOnDate { date: NaiveDate },

    /// Count of snapshots where the named metric's delta is negative,
    /// optionally restricted to one date.
    ///
    /// The metric stays a free string here: the dispatcher resolves it
    /// against its column whitelist, and an unrecognized name is a zero
    /// result rather than a parse failure.
    SnapshotsWithNegativeDelta {
        metric: String,
        #[serde(default)]
        date: Option<NaiveDate>,
    },

    /// Sum of view deltas over one creator's snapshots captured within an
    /// inclusive time-of-day window on the date.
    CreatorViewsDeltaInTimeRange {
        creator_id: String,
        date: NaiveDate,
        #[serde(deserialize_with = "de_hour_minute")]
        time_from: NaiveTime,
        #[serde(deserialize_with = "de_hour_minute")]
        time_to: NaiveTime,
    },

    /// Sum of view deltas over all snapshots captured on the date.
    TotalViewsDeltaOnDate { date: NaiveDate },

    /// Sentinel: no structured intent recognized.
    Unknown,

    /// Well-formed model output whose tag is outside the fixed set.
    #[serde(skip)]
    Unsupported { query_type: String },

    /// A known tag whose payload was missing or carried invalid parameters.
    #[serde(skip)]
    Malformed { query_type: String, reason: String },
}

impl QueryDescriptor {
    /// The wire tag, for logging. `Unsupported` and `Malformed` report the
    /// tag the model actually sent.
    #[must_use]
    pub fn query_type(&self) -> &str {
        match self {
            Self::TotalVideos => "total_videos",
            Self::CreatorVideosInDateRange { .. } => "creator_videos_in_date_range",
            Self::VideosWithMinViews { .. } => "videos_with_min_views",
            Self::CreatorVideosWithMinViews { .. } => "creator_videos_with_min_views",
            Self::SumViewsForVideosInDateRange { .. } => "sum_views_for_videos_in_date_range",
            Self::VideosWithNewViewsOnDate { .. } => "videos_with_new_views_on_date",
            Self::SnapshotsWithNegativeDelta { .. } => "snapshots_with_negative_delta",
            Self::CreatorViewsDeltaInTimeRange { .. } => "creator_views_delta_in_time_range",
            Self::TotalViewsDeltaOnDate { .. } => "total_views_delta_on_date",
            Self::Unknown => "unknown",
            Self::Unsupported { query_type } | Self::Malformed { query_type, .. } => query_type,
        }
    }
}

/// True for tags in the fixed set, `unknown` included.
#[must_use]
pub fn is_known_query_type(tag: &str) -> bool {
    KNOWN_QUERY_TYPES.contains(&tag)
}

/// Accepts a JSON integer or an integer-valued string.
///
/// The model is asked for a bare integer but occasionally quotes it.
fn de_lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(i64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| D::Error::custom(format!("invalid integer '{s}': {e}"))),
    }
}

/// Accepts `HH:MM`, tolerating `HH:MM:SS`.
fn de_hour_minute<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let s = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|e| D::Error::custom(format!("invalid time '{s}': {e}")))
}
