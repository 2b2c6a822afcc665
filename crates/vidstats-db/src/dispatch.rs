//! Routes a query descriptor to its single data-access operation.

use sqlx::PgPool;
use tracing::warn;
use vidstats_core::QueryDescriptor;

use crate::snapshots::{self, DeltaMetric};
use crate::videos;
use crate::DbError;

/// Executes the one query behind a descriptor and returns its scalar.
///
/// Descriptors with an unrecognized tag, an unrecognized metric name, or
/// the `unknown` sentinel resolve to zero with a logged warning instead of
/// failing. The only dispatch-time error of its own making is
/// [`DbError::MissingParameter`], raised when a known tag arrived with a
/// broken payload.
///
/// # Errors
///
/// Returns [`DbError::MissingParameter`] for a malformed descriptor and
/// [`DbError::Sqlx`] if the underlying query fails.
pub async fn dispatch_query(pool: &PgPool, descriptor: &QueryDescriptor) -> Result<i64, DbError> {
    match descriptor {
        QueryDescriptor::TotalVideos => videos::count_all(pool).await,
        QueryDescriptor::CreatorVideosInDateRange {
            creator_id,
            date_from,
            date_to,
        } => videos::count_by_creator_between(pool, creator_id, *date_from, *date_to).await,
        QueryDescriptor::VideosWithMinViews { views_threshold } => {
            videos::count_with_views_above(pool, *views_threshold).await
        }
        QueryDescriptor::CreatorVideosWithMinViews {
            creator_id,
            views_threshold,
        } => videos::count_by_creator_with_views_above(pool, creator_id, *views_threshold).await,
        QueryDescriptor::SumViewsForVideosInDateRange { date_from, date_to } => {
            videos::sum_views_between(pool, *date_from, *date_to).await
        }
        QueryDescriptor::VideosWithNewViewsOnDate { date } => {
            snapshots::count_videos_with_new_views_on(pool, *date).await
        }
        QueryDescriptor::SnapshotsWithNegativeDelta { metric, date } => {
            match DeltaMetric::parse(metric) {
                Some(resolved) => snapshots::count_negative_delta(pool, resolved, *date).await,
                None => {
                    warn!(metric = %metric, "unrecognized snapshot metric, answering zero");
                    Ok(0)
                }
            }
        }
        QueryDescriptor::CreatorViewsDeltaInTimeRange {
            creator_id,
            date,
            time_from,
            time_to,
        } => {
            snapshots::sum_creator_views_delta_in_window(
                pool, creator_id, *date, *time_from, *time_to,
            )
            .await
        }
        QueryDescriptor::TotalViewsDeltaOnDate { date } => {
            snapshots::sum_views_delta_on(pool, *date).await
        }
        QueryDescriptor::Unknown => {
            warn!("unknown descriptor reached dispatch, answering zero");
            Ok(0)
        }
        QueryDescriptor::Unsupported { query_type } => {
            warn!(query_type = %query_type, "unsupported query type, answering zero");
            Ok(0)
        }
        QueryDescriptor::Malformed { query_type, reason } => Err(DbError::MissingParameter {
            query_type: query_type.clone(),
            reason: reason.clone(),
        }),
    }
}
