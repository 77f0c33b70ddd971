//! HTTP handlers.
//!
//! Thin translation layer between the wire format and the core services:
//! request parsing and field coercion happen here, everything else is
//! delegated.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use sensorgate_auth::{AuthError, BearerAuth, ProfileResponse};

use crate::server::AppState;

// =============================================================================
// Health and Info
// =============================================================================

/// Service banner.
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "sensorgate",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// Liveness probe.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// =============================================================================
// Login
// =============================================================================

/// Login request body.
///
/// `sensor_value` accepts a JSON number or a numeric string; devices in
/// the field send both.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub sensor_value: Option<Value>,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub sensor_value: f64,
}

/// `POST /auth/login`
///
/// Validates the request shape, then delegates to the login service.
/// Missing fields and non-numeric sensor values are 400s; authentication
/// failures are 401s with a fixed generic message.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let (Some(username), Some(password), Some(raw_value)) =
        (&request.username, &request.password, &request.sensor_value)
    else {
        return Err(AuthError::validation(
            "username, password, and sensor_value are required",
        ));
    };

    let sensor_value = coerce_sensor_value(raw_value)
        .ok_or_else(|| AuthError::validation("sensor_value must be a number"))?;

    let issued = state.login.login(username, password, sensor_value).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: issued.token,
        sensor_value: issued.claims.sensor_value,
    }))
}

/// Coerces a JSON number or numeric string to a finite f64.
fn coerce_sensor_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

// =============================================================================
// Protected Data
// =============================================================================

/// `GET /api/protected-data`
///
/// Requires a verified bearer credential; returns the subject's profile
/// with cache-source attribution.
pub async fn protected_data(
    State(state): State<AppState>,
    BearerAuth(session): BearerAuth,
) -> Result<Json<ProfileResponse>, AuthError> {
    let profile = state.profiles.resolve(&session.claims).await?;
    Ok(Json(profile))
}

// =============================================================================
// Tests
// =============================================================================
