use crate::config::ControllerConfig;
use crate::errors::ProbeError;
use crate::model::{Reachability, Resolution, ServiceInfo};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::ping;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Single-address probing capability.
///
/// Every method is bounded by a configured timeout and best-effort: a timeout
/// or transport failure degrades the result (unreachable, empty resolution,
/// closed port) instead of aborting the caller. The `Err` arm of `probe`
/// exists so the fallback contract is testable; callers treat it the same as
/// `Unreachable`.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Test whether the address answers any probe at all
    async fn probe(&self, address: IpAddr) -> Result<Reachability, ProbeError>;

    /// Best-effort hostname and MAC lookup; fields are empty on failure
    async fn resolve(&self, address: IpAddr) -> Resolution;

    /// Probe a single TCP port; `None` means closed or filtered
    async fn probe_port(&self, address: IpAddr, port: u16) -> Option<ServiceInfo>;
}

/// Production prober: ICMP echo with an ARP fallback for reachability,
/// reverse DNS plus ARP for identity, TCP connect with banner grabbing for
/// service detection.
pub struct SystemProber {
    scan_timeout: Duration,
    tcp_connect_timeout: Duration,
    banner_read_timeout: Duration,
    /// Interface used for ARP requests; `None` disables MAC resolution
    arp_interface: Option<String>,
}

impl SystemProber {
    pub fn new(config: &ControllerConfig, arp_interface: Option<String>) -> Self {
        Self {
            scan_timeout: Duration::from_millis(config.scan_timeout_ms),
            tcp_connect_timeout: Duration::from_millis(config.tcp_connect_timeout_ms),
            banner_read_timeout: Duration::from_millis(config.banner_read_timeout_ms),
            arp_interface,
        }
    }

    /// Resolve a MAC address via an ARP request on the configured interface
    async fn arp_lookup(&self, address: IpAddr) -> Option<String> {
        let IpAddr::V4(ipv4) = address else {
            return None;
        };
        let iface = self.arp_interface.as_deref()?;
        let mut client = libarp::client::ArpClient::new_with_iface_name(iface).ok()?;
        match client.ip_to_mac(ipv4, Some(self.scan_timeout)).await {
            Ok(mac) => Some(mac.to_string().to_uppercase()),
            Err(_) => None,
        }
    }

    /// Reverse-DNS lookup, pushed onto the blocking pool since dns-lookup
    /// performs a synchronous getnameinfo call
    async fn reverse_dns(address: IpAddr) -> Option<String> {
        tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&address).ok())
            .await
            .ok()
            .flatten()
    }

    /// Service names for well-known ports
    fn service_name(port: u16) -> &'static str {
        match port {
            21 => "FTP",
            22 => "SSH",
            23 => "Telnet",
            25 => "SMTP",
            53 => "DNS",
            80 => "HTTP",
            443 => "HTTPS",
            445 => "SMB",
            631 => "IPP",
            3306 => "MySQL",
            3389 => "RDP",
            5900 => "VNC",
            8000 => "HTTP-Alt",
            8080 => "HTTP-Proxy",
            8443 => "HTTPS-Alt",
            9100 => "JetDirect",
            _ => "",
        }
    }

    /// Read whatever the service says first, sending a service-specific
    /// probe where the protocol expects the client to speak first
    async fn grab_banner(&self, address: IpAddr, port: u16, stream: &mut TcpStream) -> Option<String> {
        let probe: Option<&[u8]> = match port {
            80 | 8000 | 8080 => Some(b"HEAD / HTTP/1.1\r\nHost: scanner\r\nConnection: close\r\n\r\n"),
            443 | 8443 => Some(b"GET / HTTP/1.1\r\nHost: scanner\r\nConnection: close\r\n\r\n"),
            21 => Some(b"HELP\r\n"),
            25 => Some(b"EHLO scanner.local\r\n"),
            22 => None, // SSH sends its banner immediately
            _ => None,
        };

        if let Some(probe_data) = probe {
            let _ = timeout(self.tcp_connect_timeout, stream.write_all(probe_data)).await;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut buf = vec![0; 2048];
        match timeout(self.banner_read_timeout, stream.read(&mut buf)).await {
            Ok(Ok(count)) if count > 0 => {
                let banner = String::from_utf8_lossy(&buf[..count]);
                let cleaned = banner
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .take(5)
                    .map(|l| l.trim().to_string())
                    .collect::<Vec<String>>()
                    .join(" | ");
                tracing::trace!(%address, port, "Captured banner");
                Some(cleaned)
            }
            _ => None,
        }
    }
}

/// Extract product and version strings from a service banner
pub fn parse_banner(banner: &str) -> (String, String) {
    let banner_lower = banner.to_lowercase();
    let patterns = [
        ("openssh_", "OpenSSH"),
        ("apache/", "Apache httpd"),
        ("nginx/", "nginx"),
        ("microsoft-iis/", "Microsoft IIS"),
        ("lighttpd/", "lighttpd"),
        ("vsftpd ", "vsftpd"),
        ("dropbear_", "Dropbear sshd"),
        ("postfix", "Postfix smtpd"),
    ];

    for (prefix, product) in &patterns {
        if let Some(start) = banner_lower.find(prefix) {
            let rest = &banner_lower[start + prefix.len()..];
            let version: String = rest
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == 'p')
                .collect();
            return (product.to_string(), version);
        }
    }
    (String::new(), String::new())
}

#[async_trait]
impl Prober for SystemProber {
    async fn probe(&self, address: IpAddr) -> Result<Reachability, ProbeError> {
        let payload = [0u8; 56];
        match timeout(self.scan_timeout, ping(address, &payload)).await {
            Ok(Ok(_)) => return Ok(Reachability::Reachable),
            // ICMP failures fall through to the ARP check: plenty of hosts
            // drop echo requests but still answer on the link layer
            Ok(Err(_)) | Err(_) => {}
        }

        if self.arp_lookup(address).await.is_some() {
            return Ok(Reachability::Reachable);
        }

        Ok(Reachability::Unreachable)
    }

    async fn resolve(&self, address: IpAddr) -> Resolution {
        let hostname = Self::reverse_dns(address).await.unwrap_or_default();
        let mac = self.arp_lookup(address).await.unwrap_or_default();
        Resolution { hostname, mac }
    }

    async fn probe_port(&self, address: IpAddr, port: u16) -> Option<ServiceInfo> {
        let connect = timeout(self.tcp_connect_timeout, TcpStream::connect((address, port))).await;
        let mut stream = match connect {
            Ok(Ok(stream)) => stream,
            _ => return None,
        };

        let mut info = ServiceInfo {
            name: Self::service_name(port).to_string(),
            ..Default::default()
        };

        if let Some(banner) = self.grab_banner(address, port, &mut stream).await {
            let (product, version) = parse_banner(&banner);
            info.product = product;
            info.version = version;
        }

        Some(info)
    }
}
