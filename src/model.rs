use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;

/// One entry per known address in the device registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Immutable key; a record is always looked up by address
    pub address: IpAddr,
    /// Reverse-DNS name, empty when resolution failed
    pub hostname: String,
    /// ARP-resolved MAC, empty when resolution failed
    pub mac_address: String,
    pub open_ports: BTreeSet<u16>,
    pub services: BTreeMap<u16, ServiceInfo>,
    pub os_guess: String,
    pub device_type: DeviceType,
    pub status: DeviceStatus,
    pub last_seen: DateTime<Utc>,
}

impl DeviceRecord {
    /// A bare record for an address nothing is known about yet.
    /// Fingerprinting fills the rest in, each step best-effort.
    pub fn new(address: IpAddr) -> Self {
        Self {
            address,
            hostname: String::new(),
            mac_address: String::new(),
            open_ports: BTreeSet::new(),
            services: BTreeMap::new(),
            os_guess: String::new(),
            device_type: DeviceType::Unknown,
            status: DeviceStatus::Online,
            last_seen: Utc::now(),
        }
    }
}

/// Service identity gathered for one open port
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub product: String,
    pub version: String,
}

/// Classification of device types based on open ports and services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Router,
    Server,
    Printer,
    IotDevice,
    Computer,
    Unknown,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceType::Router => "router",
            DeviceType::Server => "server",
            DeviceType::Printer => "printer",
            DeviceType::IotDevice => "iot_device",
            DeviceType::Computer => "computer",
            DeviceType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
        })
    }
}

/// Outcome of a single reachability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

/// Best-effort identity resolution result; fields are empty on failure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub hostname: String,
    pub mac: String,
}
