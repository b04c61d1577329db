//! Local network helpers.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Guess the IP address other machines on the LAN can reach us at.
///
/// Connecting a UDP socket only asks the OS which interface would route to
/// the target; no packet is sent. Falls back to loopback.
pub fn guess_local_ip() -> IpAddr {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guessed_ip_is_ipv4_and_not_unspecified() {
        let ip = guess_local_ip();
        assert!(ip.is_ipv4());
        assert!(!ip.is_unspecified());
    }
}
