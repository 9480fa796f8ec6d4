//! Shared helpers for agent API tests.

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::ConnectInfo,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use device_agent::{build_router, AppState, DEFAULT_ALLOWED_ORIGIN};
use device_identity::{Clock, DeviceIdentity, HostSignals, TokenManager};
use http_body_util::BodyExt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const LOCAL_PEER: ([u8; 4], u16) = ([127, 0, 0, 1], 52000);
pub const REMOTE_PEER: ([u8; 4], u16) = ([192, 168, 1, 50], 52000);

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn fixed() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn test_identity() -> DeviceIdentity {
    DeviceIdentity::from_signals(HostSignals {
        hostname: "pos-terminal-3".to_string(),
        mac_address: "3c:22:fb:10:aa:01".to_string(),
        os_family: "linux".to_string(),
        architecture: "x86_64".to_string(),
        host_unique_id: "4c4c4544-0042-3510-8052-b4c04f4e3732".to_string(),
    })
}

/// State with a freshly minted token and a controllable clock.
pub async fn test_state() -> (Arc<ManualClock>, Arc<AppState>) {
    let clock = Arc::new(ManualClock::fixed());
    let identity = test_identity();
    let tokens = TokenManager::new(identity.device_id.clone(), clock.clone());
    tokens.mint().await;
    let state = AppState::new(identity, tokens, DEFAULT_ALLOWED_ORIGIN).unwrap();
    (clock, Arc::new(state))
}

pub fn request(method: &str, uri: &str, peer: impl Into<SocketAddr>, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .extension(ConnectInfo(peer.into()))
        .body(body)
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = send(app, request("GET", uri, LOCAL_PEER, Body::empty())).await;
    (status, serde_json::from_slice(&body).unwrap())
}

pub fn router(state: &Arc<AppState>) -> Router {
    build_router(state.clone())
}
