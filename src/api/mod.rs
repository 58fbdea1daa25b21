//! Read-only REST API over a finished drill.
//!
//! Provides three GET endpoints:
//! - `/snapshot`: drill summary and final switchboard snapshot
//! - `/events`: event-log entries with optional `at_secs` range filtering
//! - `/timeline`: per-second switchboard timeline with optional range
//!
//! Nothing here drives a session; the report is fixed before serving.

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::drill::DrillReport;

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the drill completes and wrapped in `Arc`; no locks
/// needed since all data is read-only.
pub struct AppState {
    pub report: DrillReport,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/snapshot", get(handlers::get_snapshot))
        .route("/events", get(handlers::get_events))
        .route("/timeline", get(handlers::get_timeline))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
