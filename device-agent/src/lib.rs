//! HTTP API for the local device agent.
//!
//! Serves device identity and tokens to a companion application running on
//! the same machine. Every route sits behind the loopback guard and the CORS
//! layer in [`guard`].

pub mod guard;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::InvalidHeaderValue, HeaderValue, StatusCode},
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use device_identity::{DeviceIdentity, TokenManager, Validation, ValidationRequest};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::debug;

/// Version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default TCP port on the loopback interface.
pub const DEFAULT_PORT: u16 = 8181;

/// Default origin allowed by CORS.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3001";

/// State shared by all handlers.
#[derive(Debug)]
pub struct AppState {
    pub identity: DeviceIdentity,
    pub tokens: TokenManager,
    allowed_origin: HeaderValue,
}

impl AppState {
    /// Creates the shared state.
    ///
    /// # Errors
    ///
    /// Fails if `allowed_origin` is not a valid header value.
    pub fn new(
        identity: DeviceIdentity,
        tokens: TokenManager,
        allowed_origin: &str,
    ) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            identity,
            tokens,
            allowed_origin: HeaderValue::from_str(allowed_origin)?,
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TokenResponse {
    pub token: String,
    pub device_id: String,
    pub expires_at: DateTime<Utc>,
    pub valid: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidationResponse {
    pub valid: bool,
    pub device_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DeviceInfoResponse {
    #[serde(flatten)]
    pub identity: DeviceIdentity,
    pub token: String,
    pub last_seen: DateTime<Utc>,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        device_id: state.identity.device_id.clone(),
        timestamp: Utc::now(),
    })
}

async fn device_token_handler(State(state): State<Arc<AppState>>) -> Json<TokenResponse> {
    let current = state.tokens.current_token().await;
    Json(TokenResponse {
        token: current.token,
        device_id: state.identity.device_id.clone(),
        expires_at: current.expires_at,
        valid: true,
    })
}

async fn validate_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<ValidationResponse>) {
    let (status, outcome) = match serde_json::from_slice::<ValidationRequest>(&body) {
        Ok(request) => (StatusCode::OK, state.tokens.validate(&request).await),
        Err(e) => {
            debug!("Rejected validation body: {}", e);
            (StatusCode::BAD_REQUEST, Validation::invalid_request())
        }
    };

    (
        status,
        Json(ValidationResponse {
            valid: outcome.valid,
            device_id: state.identity.device_id.clone(),
            message: outcome.message.to_string(),
            timestamp: Utc::now(),
        }),
    )
}

async fn device_info_handler(State(state): State<Arc<AppState>>) -> Json<DeviceInfoResponse> {
    let token = state
        .tokens
        .peek()
        .await
        .map(|issued| issued.token)
        .unwrap_or_default();

    Json(DeviceInfoResponse {
        identity: state.identity.clone(),
        token,
        last_seen: Utc::now(),
    })
}

/// Build the HTTP API router with the given state.
///
/// Peer addresses are read from `ConnectInfo<SocketAddr>`; serve the router
/// with [`serve`] or `into_make_service_with_connect_info`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/device-token", get(device_token_handler))
        .route("/validate", post(validate_handler))
        .route("/device-info", get(device_info_handler))
        .layer(middleware::from_fn_with_state(state.clone(), guard::cors))
        .layer(middleware::from_fn(guard::require_loopback))
        .with_state(state)
}

/// Serves the API on `listener` until the server fails.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
