//! Shared test helpers for identity and token tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use device_identity::{
    Clock, EnvironmentError, EnvironmentResult, HostEnvironment, HostSignals, NetworkInterface,
};
use std::sync::Mutex;

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Starts at a fixed, arbitrary instant.
    pub fn fixed() -> Self {
        Self::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
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

/// A host with scripted signals.
#[derive(Clone)]
pub struct FakeHost {
    pub hostname: Option<String>,
    pub interfaces: Vec<NetworkInterface>,
    pub host_id: Option<String>,
    pub os: String,
    pub arch: String,
}

impl FakeHost {
    /// A workstation with a loopback and one wired interface.
    pub fn workstation() -> Self {
        Self {
            hostname: Some("workstation-01".to_string()),
            interfaces: vec![
                iface("lo", true, true, Some("00:00:00:00:00:00")),
                iface("eth0", false, true, Some("3c:22:fb:10:aa:01")),
            ],
            host_id: Some("4c4c4544-0042-3510-8052-b4c04f4e3732".to_string()),
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
        }
    }
}

impl HostEnvironment for FakeHost {
    fn hostname(&self) -> EnvironmentResult<String> {
        self.hostname
            .clone()
            .ok_or_else(|| EnvironmentError::Hostname("no hostname configured".to_string()))
    }

    fn interfaces(&self) -> EnvironmentResult<Vec<NetworkInterface>> {
        Ok(self.interfaces.clone())
    }

    fn host_unique_id(&self) -> EnvironmentResult<String> {
        self.host_id
            .clone()
            .ok_or_else(|| EnvironmentError::HostId("no machine id".to_string()))
    }

    fn os_family(&self) -> String {
        self.os.clone()
    }

    fn architecture(&self) -> String {
        self.arch.clone()
    }
}

pub fn iface(name: &str, is_loopback: bool, is_up: bool, mac: Option<&str>) -> NetworkInterface {
    NetworkInterface {
        name: name.to_string(),
        is_loopback,
        is_up,
        mac_address: mac.map(String::from),
    }
}

pub fn signals() -> HostSignals {
    HostSignals {
        hostname: "workstation-01".to_string(),
        mac_address: "3c:22:fb:10:aa:01".to_string(),
        os_family: "linux".to_string(),
        architecture: "x86_64".to_string(),
        host_unique_id: "4c4c4544-0042-3510-8052-b4c04f4e3732".to_string(),
    }
}
