//! HTTP response mapping for [`AuthError`].
//!
//! Every taxonomy variant maps to exactly one status code; bodies are
//! `{"message": ...}` JSON. 401 responses carry a `WWW-Authenticate`
//! header.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %message, "request failed");
        }

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(self.kind(), &message);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        // Server-side detail stays in the logs; the caller gets a stable
        // message per kind.
        let body = if status.is_server_error() {
            json!({ "message": "Server error" })
        } else {
            json!({ "message": message })
        };

        (status, headers, Json(body)).into_response()
    }
}

/// Maps an error to its HTTP status code.
fn status_code(error: &AuthError) -> StatusCode {
    match error {
        AuthError::Validation { .. } => StatusCode::BAD_REQUEST,
        AuthError::Unauthorized { .. }
        | AuthError::MissingCredential
        | AuthError::MalformedCredential => StatusCode::UNAUTHORIZED,
        AuthError::InvalidToken { .. }
        | AuthError::SessionNotFound
        | AuthError::CorruptSession { .. }
        | AuthError::SessionMismatch => StatusCode::FORBIDDEN,
        AuthError::ProfileNotFound => StatusCode::NOT_FOUND,
        AuthError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the `WWW-Authenticate` header value for 401 responses.
///
/// Format: `Bearer realm="sensorgate", error="...", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!(
        "Bearer realm=\"sensorgate\", error=\"{}\", error_description=\"{}\"",
        error, escaped_desc
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_validation_is_400() {
        let response = AuthError::validation("sensor_value must be a number").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(
            json["message"],
            "Validation error: sensor_value must be a number"
        );
    }

    #[tokio::test]
    async fn test_bad_credentials_is_401_with_www_authenticate() {
        let response = AuthError::bad_credentials().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let www_auth = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(www_auth.contains("realm=\"sensorgate\""));
        assert!(www_auth.contains("error=\"unauthorized\""));

        let json = body_json(response).await;
        assert_eq!(json["message"], "Invalid username or password");
    }

    #[tokio::test]
    async fn test_credential_failures_map_to_401_and_403() {
        assert_eq!(
            AuthError::MissingCredential.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::MalformedCredential.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::invalid_token("expired").into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::SessionNotFound.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::corrupt_session("bad json")
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::SessionMismatch.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_profile_not_found_is_404() {
        let response = AuthError::ProfileNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upstream_is_500_with_opaque_body() {
        let response = AuthError::upstream("connection refused to 10.0.0.5").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // Internal detail must not leak to the caller.
        let json = body_json(response).await;
        assert_eq!(json["message"], "Server error");
    }

    #[test]
    fn test_www_authenticate_header_escaping() {
        let header = build_www_authenticate_header("invalid_token", "token has \"quotes\"");
        assert!(header.contains("\\\"quotes\\\""));
    }
}
