use crate::errors::DiscoveryError;
use tokio::net::UdpSocket;

/// Wake a device by broadcasting a Wake-on-LAN magic packet to UDP port 9
pub async fn wake_device(mac: &str) -> Result<(), DiscoveryError> {
    let packet = build_magic_packet(mac)?;
    let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
    socket.set_broadcast(true)?;
    socket.send_to(&packet, ("255.255.255.255", 9)).await?;
    tracing::info!(%mac, "Wake-on-LAN packet sent");
    Ok(())
}

/// Build a WoL magic packet: six 0xFF bytes followed by the target MAC
/// repeated sixteen times
pub fn build_magic_packet(mac: &str) -> Result<Vec<u8>, DiscoveryError> {
    let octets = parse_mac(mac)?;
    let mut packet = Vec::with_capacity(102);
    packet.extend_from_slice(&[0xFF; 6]);
    for _ in 0..16 {
        packet.extend_from_slice(&octets);
    }
    Ok(packet)
}

fn parse_mac(mac: &str) -> Result<[u8; 6], DiscoveryError> {
    let clean = mac.replace('-', ":");
    let parts: Vec<&str> = clean.split(':').collect();
    if parts.len() != 6 {
        return Err(DiscoveryError::Other(format!("invalid MAC address: {}", mac)));
    }
    let mut octets = [0u8; 6];
    for (i, part) in parts.iter().enumerate() {
        octets[i] = u8::from_str_radix(part, 16)
            .map_err(|_| DiscoveryError::Other(format!("invalid MAC address: {}", mac)))?;
    }
    Ok(octets)
}
