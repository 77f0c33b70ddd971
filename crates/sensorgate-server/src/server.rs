//! Router construction and server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use sensorgate_auth::{AuthState, LoginService, ProfileResolver};

use crate::handlers;

// =============================================================================
// App State
// =============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Verification state for the bearer extractor.
    pub auth: AuthState,
    /// Credential issuer.
    pub login: Arc<LoginService>,
    /// Cache-aside profile reads.
    pub profiles: Arc<ProfileResolver>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

// =============================================================================
// Router
// =============================================================================

/// Builds the application router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/auth/login", post(handlers::login))
        .route("/api/protected-data", get(handlers::protected_data))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http.request",
                    http.method = %req.method(),
                    http.target = %req.uri(),
                )
            }),
        )
        .with_state(state)
}

// =============================================================================
// Server
// =============================================================================

/// A bound-and-ready HTTP server.
pub struct SensorgateServer {
    addr: SocketAddr,
    app: Router,
}

impl SensorgateServer {
    /// Creates a server from an address and state.
    #[must_use]
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self {
            addr,
            app: build_app(state),
        }
    }

    /// Runs the server until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if binding or serving fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
