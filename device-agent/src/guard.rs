//! Request guards applied ahead of every route.

use crate::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tracing::warn;

/// Body returned to rejected peers.
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied. Only localhost connections allowed.";

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// True for `127.0.0.0/8`, `::1` and IPv4-mapped loopback addresses.
#[must_use]
pub fn is_loopback(ip: IpAddr) -> bool {
    ip.to_canonical().is_loopback()
}

/// Rejects any request whose peer address is not loopback.
///
/// Requests arriving without connection info are rejected too.
pub async fn require_loopback(request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    match peer {
        Some(addr) if is_loopback(addr.ip()) => next.run(request).await,
        other => {
            match other {
                Some(addr) => warn!("Unauthorized access attempt from: {}", addr.ip()),
                None => warn!("Rejected request without peer address"),
            }
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": ACCESS_DENIED_MESSAGE })),
            )
                .into_response()
        }
    }
}

/// Stamps CORS headers on every response and answers preflight requests
/// with an empty 204.
pub async fn cors(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, state.allowed_origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}
