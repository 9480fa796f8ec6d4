//! Host signal collection.
//!
//! [`HostEnvironment`] is the boundary between identity derivation and the
//! machine it runs on. [`SystemHost`] reads the real host; tests supply fixed
//! signals through their own implementation.

use crate::error::{EnvironmentError, EnvironmentResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Hardware address reported by interfaces that have none assigned.
const ZERO_MAC: &str = "00:00:00:00:00:00";

/// One enumerated network interface, reduced to what selection needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Interface name (e.g. `eth0`, `en0`).
    pub name: String,
    /// Whether this is a loopback interface.
    pub is_loopback: bool,
    /// Whether the interface is administratively up.
    pub is_up: bool,
    /// Colon-separated lowercase hardware address, if any.
    pub mac_address: Option<String>,
}

impl NetworkInterface {
    /// True if this interface may supply the device's MAC address.
    #[must_use]
    pub fn qualifies(&self) -> bool {
        !self.is_loopback
            && self.is_up
            && self
                .mac_address
                .as_deref()
                .is_some_and(|mac| !mac.is_empty() && mac != ZERO_MAC)
    }
}

/// Returns the MAC address of the first qualifying interface.
///
/// Enumeration order decides ties. That order comes from the OS and can change
/// across reboots, but changing the rule would change every device ID.
#[must_use]
pub fn select_mac_address(interfaces: &[NetworkInterface]) -> Option<&str> {
    interfaces
        .iter()
        .find(|iface| iface.qualifies())
        .and_then(|iface| iface.mac_address.as_deref())
}

/// Raw inputs to the device fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSignals {
    pub hostname: String,
    pub mac_address: String,
    pub os_family: String,
    pub architecture: String,
    /// Platform machine ID; empty when the platform could not supply one.
    pub host_unique_id: String,
}

/// Read access to the facts identity derivation depends on.
pub trait HostEnvironment {
    /// The local hostname.
    fn hostname(&self) -> EnvironmentResult<String>;

    /// All network interfaces, in OS enumeration order.
    fn interfaces(&self) -> EnvironmentResult<Vec<NetworkInterface>>;

    /// A platform-supplied identifier unique to this host.
    fn host_unique_id(&self) -> EnvironmentResult<String>;

    /// OS family name.
    fn os_family(&self) -> String {
        env::consts::OS.to_string()
    }

    /// CPU architecture name.
    fn architecture(&self) -> String {
        env::consts::ARCH.to_string()
    }
}

/// The machine this process runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn hostname(&self) -> EnvironmentResult<String> {
        let name = hostname::get().map_err(|e| EnvironmentError::Hostname(e.to_string()))?;
        let name = name
            .into_string()
            .map_err(|raw| EnvironmentError::Hostname(format!("not valid UTF-8: {raw:?}")))?;
        if name.is_empty() {
            return Err(EnvironmentError::Hostname("empty hostname".to_string()));
        }
        Ok(name)
    }

    fn interfaces(&self) -> EnvironmentResult<Vec<NetworkInterface>> {
        Ok(netdev::get_interfaces()
            .into_iter()
            .map(|iface| NetworkInterface {
                is_loopback: iface.is_loopback(),
                is_up: iface.is_up(),
                mac_address: iface.mac_addr.map(|mac| mac.to_string().to_lowercase()),
                name: iface.name,
            })
            .collect())
    }

    fn host_unique_id(&self) -> EnvironmentResult<String> {
        machine_uid::get()
            .map(|id| id.trim().to_string())
            .map_err(|e| EnvironmentError::HostId(e.to_string()))
    }
}
