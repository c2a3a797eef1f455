use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::handlers::session::resolve_session;
use crate::services::validation::{FormValidator, Rule};
use crate::state::AppState;

/// The rule set of the booking request form.
pub fn booking_request_rules() -> FormValidator {
    FormValidator::new()
        .rule("serviceType", Rule::required_text("Service type"))
        .rule("description", Rule::required_text("Description"))
        .rule("date", Rule::required_text("Date"))
        .rule("time", Rule::required_text("Time"))
        .rule("budget", Rule::positive_number("Budget"))
        .rule("email", Rule::required_text("Email").and(Rule::email()))
}

// POST /api/bookings/validate
#[derive(Serialize)]
pub struct ValidateResponse {
    valid: bool,
    errors: BTreeMap<String, String>,
}

pub async fn validate_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ValidateResponse>, AppError> {
    resolve_session(&state, &headers)?;

    let mut validator = booking_request_rules();
    let valid = validator.validate_form(&body);

    Ok(Json(ValidateResponse {
        valid,
        errors: validator.errors().clone(),
    }))
}
