//! WireGuard tunnel settings.
//!
//! Covers the local interface, the key material, the single peer endpoint
//! and the CIDR lists routed through the tunnel.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Position, SettingsError};
use crate::interface::is_valid_interface_name;
use crate::netaddr::{Endpoint, IpNetwork};
use crate::optional;
use crate::tree::{enabled_or_not, set_or_not, LineStyle, Node};

pub const DEFAULT_INTERFACE_NAME: &str = "wg0";
pub const DEFAULT_FIREWALL_MARK: u32 = 51820;
pub const DEFAULT_ENDPOINT_PORT: u16 = 51820;
pub const DEFAULT_IMPLEMENTATION: &str = "auto";

/// Accepted values for [`Wireguard::implementation`].
pub const IMPLEMENTATIONS: &[&str] = &["auto", "kernelspace", "userspace"];

/// Size in bytes of a decoded WireGuard key.
pub const KEY_LEN: usize = 32;

/// Error parsing a WireGuard key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("failed to parse base64-encoded key: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("incorrect key size: {0}")]
    Size(usize),
}

/// Decode a base64 WireGuard key, checking it holds exactly 32 bytes.
pub fn parse_wireguard_key(encoded: &str) -> Result<[u8; KEY_LEN], KeyError> {
    let bytes = STANDARD.decode(encoded)?;
    <[u8; KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| KeyError::Size(bytes.len()))
}

/// WireGuard settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wireguard {
    /// Network interface name. Empty until decided.
    pub interface_name: String,
    /// Base64 private key. Never rendered or echoed.
    pub private_key: Option<String>,
    /// Base64 public key of the peer.
    pub public_key: Option<String>,
    /// Optional base64 pre-shared key. Never rendered or echoed.
    pub pre_shared_key: Option<String>,
    pub endpoint: Option<Endpoint>,
    /// Networks routed through the tunnel. `None` entries are kept so
    /// validation can report their position.
    pub allowed_ips: Option<Vec<Option<IpNetwork>>>,
    /// Addresses assigned to the interface.
    pub addresses: Option<Vec<Option<IpNetwork>>>,
    pub ipv6: Option<bool>,
    /// Firewall mark. Zero until decided.
    pub firewall_mark: u32,
    /// Routing rule priority. Zero means unset and it has no default.
    pub rule_priority: u32,
    /// One of [`IMPLEMENTATIONS`]. Empty until decided.
    pub implementation: String,
}

impl Wireguard {
    /// Independent deep copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Fill every undecided field from `other`.
    pub fn merge_with(&mut self, other: &Wireguard) {
        optional::merge_scalar(&mut self.interface_name, &other.interface_name);
        optional::merge(&mut self.private_key, &other.private_key);
        optional::merge(&mut self.public_key, &other.public_key);
        optional::merge(&mut self.pre_shared_key, &other.pre_shared_key);
        optional::merge(&mut self.endpoint, &other.endpoint);
        optional::merge(&mut self.allowed_ips, &other.allowed_ips);
        optional::merge(&mut self.addresses, &other.addresses);
        optional::merge(&mut self.ipv6, &other.ipv6);
        optional::merge_scalar(&mut self.firewall_mark, &other.firewall_mark);
        optional::merge_scalar(&mut self.rule_priority, &other.rule_priority);
        optional::merge_scalar(&mut self.implementation, &other.implementation);
    }

    /// Replace every field `other` has decided.
    pub fn override_with(&mut self, other: &Wireguard) {
        optional::override_scalar(&mut self.interface_name, &other.interface_name);
        optional::override_with(&mut self.private_key, &other.private_key);
        optional::override_with(&mut self.public_key, &other.public_key);
        optional::override_with(&mut self.pre_shared_key, &other.pre_shared_key);
        optional::override_with(&mut self.endpoint, &other.endpoint);
        optional::override_with(&mut self.allowed_ips, &other.allowed_ips);
        optional::override_with(&mut self.addresses, &other.addresses);
        optional::override_with(&mut self.ipv6, &other.ipv6);
        optional::override_scalar(&mut self.firewall_mark, &other.firewall_mark);
        optional::override_scalar(&mut self.rule_priority, &other.rule_priority);
        optional::override_scalar(&mut self.implementation, &other.implementation);
    }

    pub(crate) fn set_defaults(&mut self) {
        optional::default_scalar(&mut self.interface_name, DEFAULT_INTERFACE_NAME.to_string());
        optional::default(&mut self.private_key, String::new());
        optional::default(&mut self.public_key, String::new());
        optional::default(&mut self.pre_shared_key, String::new());
        if let Some(endpoint) = self.endpoint.as_mut() {
            if endpoint.port == 0 {
                endpoint.port = DEFAULT_ENDPOINT_PORT;
            }
        }

        // IPv6 first: the allowed IPs default depends on it.
        optional::default(&mut self.ipv6, false);
        if self.allowed_ips.is_none() {
            let mut allowed_ips = vec![Some(IpNetwork::all_ipv4())];
            if self.ipv6 == Some(true) {
                allowed_ips.push(Some(IpNetwork::all_ipv6()));
            }
            self.allowed_ips = Some(allowed_ips);
        }

        optional::default(&mut self.addresses, Vec::new());
        optional::default_scalar(&mut self.firewall_mark, DEFAULT_FIREWALL_MARK);
        optional::default_scalar(&mut self.implementation, DEFAULT_IMPLEMENTATION.to_string());
    }

    /// Check the settings, failing on the first violated invariant.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !is_valid_interface_name(&self.interface_name) {
            return Err(SettingsError::InterfaceNameInvalid {
                name: self.interface_name.clone(),
            });
        }

        match non_empty(&self.private_key) {
            None => return Err(SettingsError::PrivateKeyMissing),
            Some(key) if parse_wireguard_key(key).is_err() => {
                return Err(SettingsError::PrivateKeyInvalid)
            }
            Some(_) => {}
        }

        match non_empty(&self.public_key) {
            None => return Err(SettingsError::PublicKeyMissing),
            Some(key) if parse_wireguard_key(key).is_err() => {
                return Err(SettingsError::PublicKeyInvalid {
                    key: key.to_string(),
                })
            }
            Some(_) => {}
        }

        if let Some(key) = non_empty(&self.pre_shared_key) {
            if parse_wireguard_key(key).is_err() {
                return Err(SettingsError::PreSharedKeyInvalid);
            }
        }

        let endpoint = self.endpoint.ok_or(SettingsError::EndpointMissing)?;
        if endpoint.ip.is_none() {
            return Err(SettingsError::EndpointIpMissing);
        }
        if endpoint.port == 0 {
            return Err(SettingsError::EndpointPortMissing);
        }

        let ipv6 = self.ipv6.unwrap_or(false);

        let allowed_ips = self.allowed_ips.as_deref().unwrap_or_default();
        if allowed_ips.is_empty() {
            return Err(SettingsError::AllowedIpsMissing);
        }
        for (offset, entry) in allowed_ips.iter().enumerate() {
            let position = Position::of(offset, allowed_ips.len());
            let network = entry.ok_or(SettingsError::AllowedIpNil { position })?;
            if network.ip.is_none() {
                return Err(SettingsError::AllowedIpIpNil { position });
            }
            if network.prefix_len.is_none() {
                return Err(SettingsError::AllowedIpMaskNil { position });
            }
            if !ipv6 && network.is_ipv6() {
                return Err(SettingsError::AllowedIpv6NotSupported {
                    network: network.to_string(),
                });
            }
        }

        let addresses = self.addresses.as_deref().unwrap_or_default();
        if addresses.is_empty() {
            return Err(SettingsError::AddressMissing);
        }
        for (offset, entry) in addresses.iter().enumerate() {
            let position = Position::of(offset, addresses.len());
            let address = entry.ok_or(SettingsError::AddressNil { position })?;
            if address.ip.is_none() {
                return Err(SettingsError::AddressIpMissing { position });
            }
            if address.prefix_len.is_none() {
                return Err(SettingsError::AddressMaskMissing { position });
            }
            if !ipv6 && address.is_ipv6() {
                return Err(SettingsError::AddressIpv6NotSupported {
                    address: address.to_string(),
                });
            }
        }

        if self.firewall_mark == 0 {
            return Err(SettingsError::FirewallMarkMissing);
        }

        if !IMPLEMENTATIONS.contains(&self.implementation.as_str()) {
            return Err(SettingsError::ImplementationInvalid {
                implementation: self.implementation.clone(),
            });
        }

        Ok(())
    }

    pub fn to_node(&self) -> Node {
        let mut node = Node::new("Wireguard settings:");
        node.child(format!("Interface name: {}", self.interface_name));
        node.child(format!("Private key: {}", set_or_not(self.private_key.as_deref())));
        if let Some(public_key) = non_empty(&self.public_key) {
            node.child(format!("PublicKey: {}", public_key));
        }
        node.child(format!(
            "Pre shared key: {}",
            set_or_not(self.pre_shared_key.as_deref())
        ));

        match &self.endpoint {
            Some(endpoint) => node.child(format!("Endpoint: {}", endpoint)),
            None => node.child("Endpoint: not set"),
        };

        node.child(format!("IPv6: {}", enabled_or_not(self.ipv6)));

        if self.firewall_mark != 0 {
            node.child(format!("Firewall mark: {}", self.firewall_mark));
        }
        if self.rule_priority != 0 {
            node.child(format!("Rule priority: {}", self.rule_priority));
        }

        node.child(format!("Implementation: {}", self.implementation));

        match self.addresses.as_deref() {
            Some(addresses) if !addresses.is_empty() => {
                let list = node.child("Addresses:");
                for address in addresses {
                    match address {
                        Some(address) => list.child(address.to_string()),
                        None => list.child("<nil>"),
                    };
                }
            }
            _ => {
                node.child("Addresses: not set");
            }
        }

        node
    }

    /// Field lines without the section header.
    pub fn to_lines(&self, style: &LineStyle) -> Vec<String> {
        self.to_node().child_lines(style)
    }
}

impl fmt::Display for Wireguard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines(&LineStyle::default()).join("\n"))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
