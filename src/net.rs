use crate::errors::DiscoveryError;
use ipnet::Ipv4Net;
use network_interface::{NetworkInterface, NetworkInterfaceConfig};
use std::net::{IpAddr, Ipv4Addr};

/// Parse a CIDR subnet and enumerate its host addresses (network and
/// broadcast excluded).
pub fn subnet_hosts(subnet: &str) -> Result<Vec<IpAddr>, DiscoveryError> {
    let net: Ipv4Net = subnet
        .parse()
        .map_err(|e| DiscoveryError::InvalidSubnet(format!("{}: {}", subnet, e)))?;
    Ok(net.hosts().map(IpAddr::V4).collect())
}

/// Network interface detection and management utilities
pub mod interface {
    use super::*;

    /// Find the network interface that has an IP address in the target subnet,
    /// falling back to the first non-virtual interface with a usable address.
    /// Used to pick the interface for ARP operations.
    pub fn find_network_interface(
        target_subnet: &str,
    ) -> Result<Option<String>, DiscoveryError> {
        let net: Ipv4Net = target_subnet
            .parse()
            .map_err(|e| DiscoveryError::InvalidSubnet(format!("{}: {}", target_subnet, e)))?;

        let interfaces = NetworkInterface::show()?;
        for interface in &interfaces {
            for addr in &interface.addr {
                if let IpAddr::V4(ipv4) = addr.ip() {
                    if net.contains(&ipv4) {
                        tracing::debug!(interface = %interface.name, ip = %ipv4, "Selected interface");
                        return Ok(Some(interface.name.clone()));
                    }
                }
            }
        }

        for interface in &interfaces {
            if interface.name.starts_with("lo")
                || interface.name.starts_with("docker")
                || interface.name.starts_with("veth")
            {
                continue;
            }
            for addr in &interface.addr {
                if let IpAddr::V4(ipv4) = addr.ip() {
                    if !ipv4.is_loopback() && !ipv4.is_unspecified() {
                        tracing::debug!(interface = %interface.name, ip = %ipv4, "Using fallback interface");
                        return Ok(Some(interface.name.clone()));
                    }
                }
            }
        }

        tracing::warn!("No suitable network interface found for ARP operations");
        Ok(None)
    }

    /// Calculate the /24 network CIDR containing an IP address
    pub fn calculate_network_cidr(ip: Ipv4Addr) -> String {
        let [a, b, c, _] = ip.octets();
        format!("{}.{}.{}.0/24", a, b, c)
    }

    /// List all available network interfaces and their networks
    pub fn list_network_interfaces() -> Result<(), DiscoveryError> {
        let interfaces = NetworkInterface::show()?;
        println!("Available network interfaces:");
        for interface in interfaces {
            println!("  Interface: {}", interface.name);
            for addr in &interface.addr {
                if let IpAddr::V4(ipv4) = addr.ip() {
                    if !ipv4.is_loopback() && !ipv4.is_unspecified() {
                        println!("    IPv4: {} -> Network: {}", ipv4, calculate_network_cidr(ipv4));
                    }
                }
            }
        }
        Ok(())
    }

    /// Get the network CIDR for a specific interface name
    pub fn get_network_from_interface(interface_name: &str) -> Result<String, DiscoveryError> {
        let interfaces = NetworkInterface::show()?;
        for interface in interfaces {
            if interface.name == interface_name {
                for addr in &interface.addr {
                    if let IpAddr::V4(ipv4) = addr.ip() {
                        if !ipv4.is_loopback() && !ipv4.is_unspecified() {
                            return Ok(calculate_network_cidr(ipv4));
                        }
                    }
                }
            }
        }
        Err(DiscoveryError::NetworkInterfaceCustom(format!(
            "Interface '{}' not found or has no valid IPv4 address",
            interface_name
        )))
    }
}
