//! Device token lifecycle.
//!
//! A single current token lives behind one mutex. Reads through
//! [`TokenManager::current_token`] rotate it once it has expired; validity
//! checks never rotate. Rotation happens while the lock is held, so callers
//! racing across the expiry instant see exactly one new token.

use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Token lifetime in seconds (15 minutes).
pub const TOKEN_TTL_SECS: i64 = 15 * 60;

/// Message for a successful validation.
pub const VALIDATION_OK_MESSAGE: &str = "Device validation successful";

/// Message when the current token has expired.
pub const VALIDATION_FAILED_MESSAGE: &str = "Device token expired or invalid";

/// Message for a validation request that could not be parsed.
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request format";

/// A token as issued to the companion application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Opaque random token string.
    pub token: String,
    /// Device the token was issued for.
    pub device_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Returns true if the token is still live at `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Body of a validation request.
///
/// The identity fields are recorded in the log but play no part in the
/// decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub session_id: String,
    pub user_id: String,
    pub role: String,
}

/// Outcome of a validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: &'static str,
}

impl Validation {
    /// Outcome for a request body that could not be parsed.
    #[must_use]
    pub const fn invalid_request() -> Self {
        Self {
            valid: false,
            message: INVALID_REQUEST_MESSAGE,
        }
    }

    fn from_validity(valid: bool) -> Self {
        Self {
            valid,
            message: if valid {
                VALIDATION_OK_MESSAGE
            } else {
                VALIDATION_FAILED_MESSAGE
            },
        }
    }
}

/// Owner of the current device token.
pub struct TokenManager {
    device_id: String,
    clock: Arc<dyn Clock>,
    state: Mutex<Option<IssuedToken>>,
}

impl TokenManager {
    /// Creates a manager with no token minted yet.
    pub fn new(device_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            device_id: device_id.into(),
            clock,
            state: Mutex::new(None),
        }
    }

    /// Creates a manager driven by the system clock.
    pub fn with_system_clock(device_id: impl Into<String>) -> Self {
        Self::new(device_id, Arc::new(SystemClock))
    }

    /// Returns the device ID stamped onto issued tokens.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Mints a new token, replacing any current one.
    pub async fn mint(&self) -> IssuedToken {
        let mut state = self.state.lock().await;
        self.mint_locked(&mut state)
    }

    /// Returns the current token, minting a replacement first if it has
    /// expired or none was ever minted.
    pub async fn current_token(&self) -> IssuedToken {
        let mut state = self.state.lock().await;
        let now = self.clock.now();
        match state.as_ref() {
            Some(token) if token.is_live_at(now) => token.clone(),
            _ => self.mint_locked(&mut state),
        }
    }

    /// Returns the stored token without rotating it, even if expired.
    pub async fn peek(&self) -> Option<IssuedToken> {
        self.state.lock().await.clone()
    }

    /// Returns true if a token exists and has not expired.
    pub async fn is_valid(&self) -> bool {
        let now = self.clock.now();
        self.state
            .lock()
            .await
            .as_ref()
            .is_some_and(|token| token.is_live_at(now))
    }

    /// Judges a validation request against current token freshness.
    pub async fn validate(&self, request: &ValidationRequest) -> Validation {
        let valid = self.is_valid().await;
        info!(
            "Validation request - User: {}, Role: {}, Session: {}, Valid: {}",
            request.user_id, request.role, request.session_id, valid
        );
        Validation::from_validity(valid)
    }

    fn mint_locked(&self, state: &mut Option<IssuedToken>) -> IssuedToken {
        let issued_at = self.clock.now();
        let token = IssuedToken {
            token: Uuid::new_v4().to_string(),
            device_id: self.device_id.clone(),
            issued_at,
            expires_at: issued_at + Duration::seconds(TOKEN_TTL_SECS),
        };
        info!("Generated new token, expires at: {}", token.expires_at.to_rfc3339());
        *state = Some(token.clone());
        token
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}
