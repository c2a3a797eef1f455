use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::errors::AppError;
use crate::handlers::session::resolve_session;
use crate::services::bookings::{PendingRequests, RecentBookings};
use crate::state::AppState;

// GET /api/bookings/requests
pub async fn booking_requests(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PendingRequests>, AppError> {
    let (user, feeds) = resolve_session(&state, &headers)?;
    let view = feeds.refresh_pending(Some(&user)).await;
    Ok(Json(view))
}

// GET /api/bookings/recent
pub async fn recent_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RecentBookings>, AppError> {
    let (user, feeds) = resolve_session(&state, &headers)?;
    let view = feeds.refresh_recent(Some(&user)).await;
    Ok(Json(view))
}
