use crate::model::{DeviceRecord, DeviceStatus, DeviceType, ServiceInfo};
use crate::probe::Prober;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::sync::Arc;

/// Gathers identity and service attributes for one reachable address.
/// Every step is best-effort: a failed lookup leaves its field empty and the
/// remaining steps still run.
pub struct Fingerprinter {
    prober: Arc<dyn Prober>,
    probe_ports: Vec<u16>,
    max_concurrent: usize,
}

impl Fingerprinter {
    pub fn new(prober: Arc<dyn Prober>, probe_ports: Vec<u16>, max_concurrent: usize) -> Self {
        Self {
            prober,
            probe_ports,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Build a full device record: hostname, MAC, open ports with service
    /// info, OS guess, and device-type classification. The result is always
    /// online with `last_seen` set to now.
    pub async fn fingerprint(&self, address: IpAddr) -> DeviceRecord {
        let resolution = self.prober.resolve(address).await;

        let port_results: Vec<(u16, ServiceInfo)> = stream::iter(self.probe_ports.iter().copied())
            .map(|port| {
                let prober = self.prober.clone();
                async move { prober.probe_port(address, port).await.map(|info| (port, info)) }
            })
            .buffer_unordered(self.max_concurrent)
            .filter_map(|result| async move { result })
            .collect()
            .await;

        let mut open_ports = BTreeSet::new();
        let mut services = BTreeMap::new();
        for (port, info) in port_results {
            open_ports.insert(port);
            services.insert(port, info);
        }

        let device_type = classify_device(&open_ports, &services);
        let os_guess = guess_os(&open_ports, &services);

        tracing::debug!(%address, ports = open_ports.len(), %device_type, "Fingerprinted device");

        DeviceRecord {
            address,
            hostname: resolution.hostname,
            mac_address: resolution.mac,
            open_ports,
            services,
            os_guess,
            device_type,
            status: DeviceStatus::Online,
            last_seen: Utc::now(),
        }
    }
}

/// Classify a device from its open ports and service strings.
///
/// Pure function, first match wins:
/// router-like service on a web port, then SSH/RDP hosts, then printers,
/// then small web-only footprints, then plain computers.
pub fn classify_device(
    open_ports: &BTreeSet<u16>,
    services: &BTreeMap<u16, ServiceInfo>,
) -> DeviceType {
    let has_any = |candidates: &[u16]| candidates.iter().any(|p| open_ports.contains(p));

    if has_any(&[80, 443, 8080]) {
        let router_like = services.values().any(|info| {
            [&info.name, &info.product, &info.version].iter().any(|field| {
                let lower = field.to_lowercase();
                lower.contains("router") || lower.contains("gateway")
            })
        });
        if router_like {
            return DeviceType::Router;
        }
    }

    if has_any(&[22, 3389]) {
        return DeviceType::Server;
    }

    if has_any(&[631, 9100]) {
        return DeviceType::Printer;
    }

    if open_ports.len() <= 3 && has_any(&[80, 443]) {
        return DeviceType::IotDevice;
    }

    DeviceType::Computer
}

/// Best-available OS heuristic from banners and port patterns.
/// Returns an empty string when nothing matches.
pub fn guess_os(open_ports: &BTreeSet<u16>, services: &BTreeMap<u16, ServiceInfo>) -> String {
    // Banner-derived signatures are the strongest signal
    for info in services.values() {
        let text = format!("{} {}", info.name, info.product).to_lowercase();
        if text.contains("microsoft") || text.contains("iis") {
            return "Windows".to_string();
        }
        if text.contains("dropbear") {
            return "Linux (embedded)".to_string();
        }
        if text.contains("openssh") || text.contains("nginx") || text.contains("apache") {
            return "Linux".to_string();
        }
    }

    // Fall back to port patterns
    let has_web = open_ports.contains(&80) || open_ports.contains(&443);
    if open_ports.contains(&3389) && !open_ports.contains(&22) {
        return "Windows".to_string();
    }
    if open_ports.contains(&22) && has_web {
        return "Linux".to_string();
    }
    if open_ports.contains(&22) && open_ports.len() <= 2 {
        return "Linux (embedded)".to_string();
    }
    if has_web && open_ports.len() <= 3 {
        return "Embedded firmware".to_string();
    }

    String::new()
}
