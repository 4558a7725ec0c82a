use std::time::Duration;
use thiserror::Error;

/// Failure of a single reachability or identity probe.
///
/// Callers treat any error as "unreachable": probing is best-effort and a
/// dead host is indistinguishable from a dropped packet.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("probe transport error: {0}")]
    Transport(String),
}

/// Error types for discovery and monitoring operations
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("hostname/MAC resolution failed: {0}")]
    Resolution(String),

    #[error("scan failed for {address}: {reason}")]
    ScanFailure { address: String, reason: String },

    #[error("configuration error: {0}")]
    ConfigLoad(String),

    #[error("invalid subnet: {0}")]
    InvalidSubnet(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network interface error: {0}")]
    NetworkInterfaceWrapped(#[from] network_interface::Error),

    #[error("network interface error: {0}")]
    NetworkInterfaceCustom(String),

    #[error("error: {0}")]
    Other(String),
}
