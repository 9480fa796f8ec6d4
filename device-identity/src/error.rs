//! Error types for reading the host environment.

use thiserror::Error;

/// Failures while reading host signals.
///
/// `Hostname`, `Interfaces` and `NoMacAddress` are fatal to identity
/// derivation. `HostId` is only ever produced by the platform machine-ID
/// lookup, which the deriver downgrades to an empty value.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The local hostname could not be resolved.
    #[error("failed to get hostname: {0}")]
    Hostname(String),

    /// Network interfaces could not be enumerated.
    #[error("failed to enumerate network interfaces: {0}")]
    Interfaces(String),

    /// No interface is up, non-loopback and carries a real hardware address.
    #[error("no valid MAC address found")]
    NoMacAddress,

    /// The platform machine ID is unavailable.
    #[error("failed to read host ID: {0}")]
    HostId(String),
}

/// Result type for environment reads.
pub type EnvironmentResult<T> = Result<T, EnvironmentError>;
