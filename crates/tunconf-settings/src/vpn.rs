//! VPN selection: which protocol runs and for which provider.

use std::fmt;
use std::str::FromStr;

use crate::error::SettingsError;
use crate::openvpn::Openvpn;
use crate::optional;
use crate::provider::Provider;
use crate::tree::{LineStyle, Node};
use crate::wireguard::Wireguard;

pub const DEFAULT_PROVIDER: Provider = Provider::PrivateInternetAccess;

/// Tunnel protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VpnType {
    #[default]
    Openvpn,
    Wireguard,
}

impl fmt::Display for VpnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VpnType::Openvpn => write!(f, "openvpn"),
            VpnType::Wireguard => write!(f, "wireguard"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("VPN type is not valid: {0}")]
pub struct UnknownVpnType(pub String);

impl FromStr for VpnType {
    type Err = UnknownVpnType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openvpn" => Ok(VpnType::Openvpn),
            "wireguard" => Ok(VpnType::Wireguard),
            _ => Err(UnknownVpnType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vpn {
    pub vpn_type: Option<VpnType>,
    pub provider: Option<Provider>,
    pub openvpn: Openvpn,
    pub wireguard: Wireguard,
}

impl Vpn {
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn merge_with(&mut self, other: &Vpn) {
        optional::merge(&mut self.vpn_type, &other.vpn_type);
        optional::merge(&mut self.provider, &other.provider);
        self.openvpn.merge_with(&other.openvpn);
        self.wireguard.merge_with(&other.wireguard);
    }

    pub fn override_with(&mut self, other: &Vpn) {
        optional::override_with(&mut self.vpn_type, &other.vpn_type);
        optional::override_with(&mut self.provider, &other.provider);
        self.openvpn.override_with(&other.openvpn);
        self.wireguard.override_with(&other.wireguard);
    }

    /// The provider, or the default one while it is undecided.
    pub fn provider(&self) -> Provider {
        self.provider.unwrap_or(DEFAULT_PROVIDER)
    }

    pub fn vpn_type(&self) -> VpnType {
        self.vpn_type.unwrap_or_default()
    }

    pub(crate) fn set_defaults(&mut self) {
        optional::default(&mut self.vpn_type, VpnType::default());
        optional::default(&mut self.provider, DEFAULT_PROVIDER);
        self.openvpn.set_defaults(self.provider());
        self.wireguard.set_defaults();
    }

    /// Check the provider supports the protocol, then validate only the
    /// selected protocol's settings.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let provider = self.provider();
        match self.vpn_type() {
            VpnType::Wireguard => {
                if !provider.rules().wireguard {
                    return Err(SettingsError::WireguardNotSupported { provider });
                }
                self.wireguard.validate()
            }
            VpnType::Openvpn => self.openvpn.validate(provider),
        }
    }

    pub fn to_node(&self) -> Node {
        let mut node = Node::new("VPN settings:");
        node.child(format!("VPN type: {}", self.vpn_type()));
        node.child(format!("VPN service provider: {}", self.provider()));
        match self.vpn_type() {
            VpnType::Openvpn => node.push(self.openvpn.to_node()),
            VpnType::Wireguard => node.push(self.wireguard.to_node()),
        }
        node
    }

    /// The section header followed by its field lines.
    pub fn to_lines(&self, style: &LineStyle) -> Vec<String> {
        self.to_node().lines(style)
    }
}

impl fmt::Display for Vpn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines(&LineStyle::default()).join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_vpn_type() {
        assert_eq!("WireGuard".parse::<VpnType>(), Ok(VpnType::Wireguard));
        assert_eq!(
            "ipsec".parse::<VpnType>().unwrap_err().to_string(),
            "VPN type is not valid: ipsec"
        );
    }

    #[test]
    fn test_set_defaults_passes_provider_down() {
        let mut vpn = Vpn {
            provider: Some(Provider::Mullvad),
            ..Vpn::default()
        };
        vpn.set_defaults();
        assert_eq!(vpn.vpn_type, Some(VpnType::Openvpn));
        assert_eq!(vpn.openvpn.password.as_deref(), Some("m"));
        assert_eq!(vpn.wireguard.interface_name, "wg0");
    }

    #[test]
    fn test_set_defaults_provider() {
        let mut vpn = Vpn::default();
        vpn.set_defaults();
        assert_eq!(vpn.provider, Some(Provider::PrivateInternetAccess));
        assert_eq!(vpn.openvpn.encryption_preset.as_deref(), Some("strong"));
    }

    #[test]
    fn test_wireguard_not_supported() {
        let mut vpn = Vpn {
            vpn_type: Some(VpnType::Wireguard),
            provider: Some(Provider::Cyberghost),
            ..Vpn::default()
        };
        vpn.set_defaults();
        let err = vpn.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WireguardNotSupported);
        assert_eq!(
            err.to_string(),
            "Wireguard is not supported: for VPN service provider cyberghost"
        );
    }

    #[test]
    fn test_only_selected_protocol_validated() {
        // Invalid OpenVPN settings are ignored when WireGuard is selected.
        let mut vpn = Vpn {
            vpn_type: Some(VpnType::Wireguard),
            provider: Some(Provider::Mullvad),
            ..Vpn::default()
        };
        vpn.openvpn.version = "1.0".to_string();
        vpn.set_defaults();
        let err = vpn.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PrivateKeyMissing);
    }

    #[test]
    fn test_render_selected_protocol_only() {
        let mut vpn = Vpn {
            vpn_type: Some(VpnType::Wireguard),
            provider: Some(Provider::Mullvad),
            ..Vpn::default()
        };
        vpn.set_defaults();
        let lines = vpn.to_lines(&LineStyle::default());
        assert_eq!(lines[0], "VPN settings:");
        assert_eq!(lines[1], "├── VPN type: wireguard");
        assert_eq!(lines[2], "├── VPN service provider: mullvad");
        assert_eq!(lines[3], "└── Wireguard settings:");
        assert_eq!(lines[4], "    ├── Interface name: wg0");
        assert!(!lines.iter().any(|line| line.contains("OpenVPN")));
    }
}
