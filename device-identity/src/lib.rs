//! Device identity and token lifecycle for the local device agent.
//!
//! This crate handles:
//! - Reading host signals (hostname, primary MAC address, OS, architecture,
//!   platform machine ID)
//! - Deriving a deterministic fingerprint and a short device ID from them
//! - Minting and rotating short-lived opaque device tokens
//! - Judging validation requests against the current token
//!
//! # Design Principles
//!
//! - **Deterministic identity**: the same host signals always produce the same
//!   device ID, so restarts keep the ID without persisting anything
//! - **In-memory tokens**: tokens live only for the process lifetime and are
//!   rotated lazily on read once expired
//! - **Opaque tokens**: a token is a random UUID with no binding to the
//!   fingerprint; holding a live token string is the whole credential

mod clock;
mod device;
mod error;
mod host;
mod token;

pub use clock::{Clock, SystemClock};
pub use device::{device_id_from, fingerprint, DeviceIdentity, DEVICE_ID_LEN};
pub use error::{EnvironmentError, EnvironmentResult};
pub use host::{select_mac_address, HostEnvironment, HostSignals, NetworkInterface, SystemHost};
pub use token::{
    IssuedToken, TokenManager, Validation, ValidationRequest, INVALID_REQUEST_MESSAGE,
    TOKEN_TTL_SECS, VALIDATION_FAILED_MESSAGE, VALIDATION_OK_MESSAGE,
};
