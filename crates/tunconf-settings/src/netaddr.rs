//! Network address values carried by WireGuard settings.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

/// A CIDR network as held in a settings list.
///
/// Both parts are optional so that an incompletely built entry survives
/// until validation, which reports exactly which part is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IpNetwork {
    pub ip: Option<IpAddr>,
    pub prefix_len: Option<u8>,
}

impl IpNetwork {
    pub fn new(ip: IpAddr, prefix_len: u8) -> Self {
        Self {
            ip: Some(ip),
            prefix_len: Some(prefix_len),
        }
    }

    /// `0.0.0.0/0`
    pub fn all_ipv4() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
    }

    /// `::/0`
    pub fn all_ipv6() -> Self {
        Self::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0)
    }

    /// Whether the IP is a genuine IPv6 address. IPv4-mapped addresses count
    /// as IPv4.
    pub fn is_ipv6(&self) -> bool {
        match self.ip {
            Some(IpAddr::V6(v6)) => v6.to_ipv4_mapped().is_none(),
            _ => false,
        }
    }
}

impl fmt::Display for IpNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ip, self.prefix_len) {
            (None, _) => write!(f, "<nil>"),
            (Some(ip), None) => write!(f, "{}", ip),
            (Some(ip), Some(prefix_len)) => write!(f, "{}/{}", ip, prefix_len),
        }
    }
}

/// Error parsing a CIDR network string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid CIDR address: {input}")]
pub struct ParseNetworkError {
    pub input: String,
}

impl FromStr for IpNetwork {
    type Err = ParseNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseNetworkError {
            input: s.to_string(),
        };

        let (ip, prefix_len) = s.split_once('/').ok_or_else(err)?;
        let ip: IpAddr = ip.parse().map_err(|_| err())?;
        let prefix_len: u8 = prefix_len.parse().map_err(|_| err())?;

        let max = if ip.is_ipv4() { 32 } else { 128 };
        if prefix_len > max {
            return Err(err());
        }

        Ok(Self::new(ip, prefix_len))
    }
}

/// A WireGuard peer endpoint. A zero port means no port was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Endpoint {
    pub ip: Option<IpAddr>,
    pub port: u16,
}

impl Endpoint {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip: Some(ip), port }
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            Some(ip) => write!(f, "{}", SocketAddr::new(ip, self.port)),
            None => write!(f, ":{}", self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_network() {
        let network: IpNetwork = "10.38.22.35/32".parse().unwrap();
        assert_eq!(network.ip, Some(IpAddr::V4(Ipv4Addr::new(10, 38, 22, 35))));
        assert_eq!(network.prefix_len, Some(32));
        assert_eq!(network.to_string(), "10.38.22.35/32");
    }

    #[test]
    fn test_parse_network_keeps_host_bits() {
        let network: IpNetwork = "1.1.1.1/24".parse().unwrap();
        assert_eq!(network.to_string(), "1.1.1.1/24");
    }

    #[test]
    fn test_parse_network_errors() {
        for input in ["x", "1.2.3.4", "1.2.3.4/33", "::/129", "1.2.3/8"] {
            let err = input.parse::<IpNetwork>().unwrap_err();
            assert_eq!(err.to_string(), format!("invalid CIDR address: {}", input));
        }
    }

    #[test]
    fn test_is_ipv6() {
        assert!(IpNetwork::all_ipv6().is_ipv6());
        assert!(!IpNetwork::all_ipv4().is_ipv6());
        assert!(!"::ffff:1.2.3.4/128".parse::<IpNetwork>().unwrap().is_ipv6());
        assert!(!IpNetwork::default().is_ipv6());
    }

    #[test]
    fn test_display_incomplete_network() {
        assert_eq!(IpNetwork::default().to_string(), "<nil>");
        let no_mask = IpNetwork {
            ip: Some(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))),
            prefix_len: None,
        };
        assert_eq!(no_mask.to_string(), "1.2.3.4");
        assert_eq!(IpNetwork::all_ipv6().to_string(), "::/0");
    }

    #[test]
    fn test_endpoint_display() {
        let v4 = Endpoint::new(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)), 51820);
        assert_eq!(v4.to_string(), "1.2.3.4:51820");
        let v6 = Endpoint::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 51820);
        assert_eq!(v6.to_string(), "[::1]:51820");
        let no_ip = Endpoint { ip: None, port: 7 };
        assert_eq!(no_ip.to_string(), ":7");
    }
}
