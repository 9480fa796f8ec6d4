//! Device fingerprinting.
//!
//! Combines host signals into a SHA-256 fingerprint and a short device ID.
//! Derivation is a pure function of the signals: the same machine yields the
//! same device ID on every start without anything being persisted.

use crate::error::{EnvironmentError, EnvironmentResult};
use crate::host::{select_mac_address, HostEnvironment, HostSignals, SystemHost};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Number of fingerprint characters kept for the device ID.
pub const DEVICE_ID_LEN: usize = 16;

/// Identity of the device this agent runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Short identifier shown to the companion application.
    pub device_id: String,
    /// Hex SHA-256 over all host signals.
    pub fingerprint: String,
    pub mac_address: String,
    pub hostname: String,
    /// OS family.
    pub os: String,
    /// CPU architecture.
    pub arch: String,
}

impl DeviceIdentity {
    /// Derives the identity of the current machine.
    ///
    /// # Errors
    ///
    /// Fails if the hostname cannot be resolved or no interface supplies a
    /// usable MAC address.
    pub fn derive() -> EnvironmentResult<Self> {
        Self::derive_from(&SystemHost)
    }

    /// Derives an identity from the given host environment.
    ///
    /// # Errors
    ///
    /// See [`DeviceIdentity::derive`].
    pub fn derive_from<H: HostEnvironment + ?Sized>(host: &H) -> EnvironmentResult<Self> {
        let hostname = host.hostname()?;

        let interfaces = host.interfaces()?;
        let mac_address = select_mac_address(&interfaces)
            .ok_or(EnvironmentError::NoMacAddress)?
            .to_string();

        let host_unique_id = host.host_unique_id().unwrap_or_else(|e| {
            debug!("Host ID unavailable, fingerprinting without it: {}", e);
            String::new()
        });

        Ok(Self::from_signals(HostSignals {
            hostname,
            mac_address,
            os_family: host.os_family(),
            architecture: host.architecture(),
            host_unique_id,
        }))
    }

    /// Builds an identity from already-collected signals.
    #[must_use]
    pub fn from_signals(signals: HostSignals) -> Self {
        let fingerprint = fingerprint(&signals);
        let device_id = device_id_from(&fingerprint);

        Self {
            device_id,
            fingerprint,
            mac_address: signals.mac_address,
            hostname: signals.hostname,
            os: signals.os_family,
            arch: signals.architecture,
        }
    }
}

/// Hex-encoded SHA-256 of `hostname:mac:os:arch:host_id`.
#[must_use]
pub fn fingerprint(signals: &HostSignals) -> String {
    let data = format!(
        "{}:{}:{}:{}:{}",
        signals.hostname,
        signals.mac_address,
        signals.os_family,
        signals.architecture,
        signals.host_unique_id,
    );

    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Shortens a fingerprint to its first [`DEVICE_ID_LEN`] characters.
#[must_use]
pub fn device_id_from(fingerprint: &str) -> String {
    fingerprint.chars().take(DEVICE_ID_LEN).collect()
}
