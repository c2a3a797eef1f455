use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::AuthUser;
use crate::services::bookings::BookingFeeds;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> &str {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    auth.strip_prefix("Bearer ").unwrap_or("")
}

/// Resolves the bearer token to its session. Every authenticated route goes
/// through here; missing or unknown tokens get a 401.
pub fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(AuthUser, Arc<BookingFeeds>), AppError> {
    let token = bearer_token(headers);
    let sessions = state.sessions.lock().unwrap();
    match sessions.get(token) {
        Some(session) => Ok((session.user.clone(), Arc::clone(&session.feeds))),
        None => Err(AppError::Unauthorized),
    }
}

// POST /api/session
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
    user: AuthUser,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if body.password != state.config.gate_password {
        return Err(AppError::Unauthorized);
    }
    if body.uid.trim().is_empty() {
        return Err(AppError::BadRequest("uid must not be empty".to_string()));
    }

    let user = AuthUser {
        uid: body.uid,
        email: body.email,
    };
    let token = state.open_session(user.clone());
    tracing::info!(uid = %user.uid, "session opened");

    Ok(Json(LoginResponse { token, user }))
}

// GET /api/session
#[derive(Serialize)]
pub struct SessionResponse {
    user: AuthUser,
}

pub async fn current_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, AppError> {
    let (user, _) = resolve_session(&state, &headers)?;
    Ok(Json(SessionResponse { user }))
}

// DELETE /api/session
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers);
    let removed = state.sessions.lock().unwrap().remove(token);
    match removed {
        Some(session) => {
            tracing::info!(uid = %session.user.uid, "session closed");
            Ok(Json(serde_json::json!({"ok": true})))
        }
        None => Err(AppError::Unauthorized),
    }
}
