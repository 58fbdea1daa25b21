//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{ErrorResponse, EventRecord, RangeQuery, SnapshotResponse};
use crate::drill::TimelineRow;

/// Status plus JSON body for a rejected request.
type ApiError = (StatusCode, Json<ErrorResponse>);

/// Returns the drill summary and final snapshot.
///
/// `GET /snapshot` → 200 + `SnapshotResponse` JSON
pub async fn get_snapshot(State(state): State<Arc<AppState>>) -> Json<SnapshotResponse> {
    let report = &state.report;
    Json(SnapshotResponse {
        drill: report.name.clone(),
        duration_secs: report.duration_secs,
        accepted_commands: report.accepted(),
        rejected_commands: report.rejected(),
        backfeed_violations: report.backfeed_violations.len(),
        snapshot: report.final_snapshot.clone(),
    })
}

/// Returns event-log entries oldest-first, optionally filtered by time.
///
/// `GET /events` → 200 + `Vec<EventRecord>` JSON
/// `GET /events?from=N&to=M` → entries with `N <= at_secs <= M`
/// `GET /events?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let (from, to) = bounds(&query)?;

    let records: Vec<EventRecord> = state
        .report
        .events
        .iter()
        .filter(|e| e.at_secs >= from && e.at_secs <= to)
        .map(EventRecord::from)
        .collect();

    Ok(Json(records))
}

/// Returns timeline rows, optionally filtered by second.
///
/// `GET /timeline` → 200 + `Vec<TimelineRow>` JSON
/// `GET /timeline?from=N&to=M` → filtered range (inclusive)
pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<TimelineRow>>, ApiError> {
    let (from, to) = bounds(&query)?;

    let rows: Vec<TimelineRow> = state
        .report
        .timeline
        .iter()
        .filter(|r| r.at_secs >= from && r.at_secs <= to)
        .cloned()
        .collect();

    Ok(Json(rows))
}

fn bounds(query: &RangeQuery) -> Result<(u64, u64), ApiError> {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(u64::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::DrillConfig;

    fn make_test_state() -> Arc<AppState> {
        let report = crate::drill::run(&DrillConfig::eb1_fail_and_restore()).unwrap();
        Arc::new(AppState { report })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(make_test_state());
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn snapshot_returns_200() {
        let (status, json) = get_json("/snapshot").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["drill"], "eb1_fail_and_restore");
        assert_eq!(json["backfeed_violations"], 0);
        assert!(json["snapshot"]["elements"].is_array());
        assert_eq!(json["snapshot"]["simulating"], false);
    }

    #[tokio::test]
    async fn timeline_returns_every_second() {
        let (status, json) = get_json("/timeline").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(41));
    }

    #[tokio::test]
    async fn timeline_range_query() {
        let (status, json) = get_json("/timeline?from=5&to=10").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["at_secs"], 5);
        assert_eq!(rows[0]["eb1"], "TRIPPED_OPEN");
        assert_eq!(rows[5]["at_secs"], 10);
    }

    #[tokio::test]
    async fn events_range_query() {
        let (status, json) = get_json("/events?from=10&to=12").await;
        assert_eq!(status, StatusCode::OK);
        let events = json.as_array().cloned().unwrap_or_default();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e["at_secs"] == 10 || e["at_secs"] == 12));
    }

    #[tokio::test]
    async fn events_invalid_range_returns_400() {
        let (status, json) = get_json("/events?from=10&to=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }
}
