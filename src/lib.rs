//! lanwarden - LAN device discovery, fingerprinting, and monitoring
//!
//! This library provides the engine behind a local-network controller:
//! - Concurrent subnet sweeping with a bounded probe pool
//! - Per-host fingerprinting (hostname, MAC, services, device classification)
//! - A device registry with online/offline transitions and change events
//! - A background monitoring loop reconciling registry state with the network

pub mod config;
pub mod control;
pub mod errors;
pub mod fingerprint;
pub mod model;
pub mod monitor;
pub mod net;
pub mod persist;
pub mod probe;
pub mod registry;
pub mod sweep;

// Re-export commonly used types for convenience
pub use config::ControllerConfig;
pub use errors::{DiscoveryError, ProbeError};
pub use fingerprint::{classify_device, guess_os, Fingerprinter};
pub use model::{DeviceRecord, DeviceStatus, DeviceType, Reachability, Resolution, ServiceInfo};
pub use monitor::{Monitor, MonitorState};
pub use probe::{Prober, SystemProber};
pub use registry::{ApplyOutcome, Registry, RegistryEvent};
pub use sweep::Sweeper;
