use crate::errors::DiscoveryError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Candidate ports probed during fingerprinting. The set covers the
/// classification-relevant services: SSH, web, IPP, RDP, alt-HTTP, JetDirect.
pub const DEFAULT_PROBE_PORTS: &[u16] = &[22, 80, 443, 631, 3389, 8080, 9100];

/// Configuration settings for discovery and monitoring operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Subnet swept by default, CIDR notation
    pub default_subnet: String,

    /// Timeout in milliseconds for reachability probes (ICMP/ARP)
    pub scan_timeout_ms: u64,

    /// Timeout in milliseconds for TCP connection attempts
    pub tcp_connect_timeout_ms: u64,

    /// Timeout in milliseconds for banner grabbing operations
    pub banner_read_timeout_ms: u64,

    /// Seconds between monitoring loop iterations
    pub monitoring_interval_secs: u64,

    /// Maximum number of concurrent probes in flight
    pub max_threads: usize,

    /// Ports probed during fingerprinting
    pub probe_ports: Vec<u16>,

    /// Per-address credentials, consumed by the remote-control layer
    pub admin_credentials: HashMap<String, Credentials>,

    pub security_settings: SecuritySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub alert_on_new_devices: bool,
    /// Parsed but not acted upon; enforcement is out of scope
    pub block_unknown_devices: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            alert_on_new_devices: true,
            block_unknown_devices: false,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_subnet: "192.168.1.0/24".to_string(),
            scan_timeout_ms: 1000,
            tcp_connect_timeout_ms: 300,
            banner_read_timeout_ms: 500,
            monitoring_interval_secs: 60,
            max_threads: 50,
            probe_ports: DEFAULT_PROBE_PORTS.to_vec(),
            admin_credentials: HashMap::new(),
            security_settings: SecuritySettings::default(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file is not an error: defaults are written to the path and
    /// returned. A malformed file is fatal and surfaced to the operator.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DiscoveryError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let mut config: ControllerConfig = serde_json::from_str(&raw).map_err(|e| {
                    DiscoveryError::ConfigLoad(format!("{}: {}", path.display(), e))
                })?;
                config.max_threads = config.max_threads.max(1);
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = ControllerConfig::default();
                config.save(path)?;
                tracing::info!(path = %path.display(), "Wrote default configuration");
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DiscoveryError> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| DiscoveryError::ConfigLoad(e.to_string()))?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}
