//! tunconf settings
//!
//! VPN tunnel settings (WireGuard, OpenVPN), the algebra that combines
//! partial fragments of them, per-provider validation and redacted tree
//! rendering.

pub mod control_server;
pub mod error;
pub mod interface;
pub mod netaddr;
pub mod openvpn;
mod optional;
pub mod provider;
pub mod settings;
pub mod tree;
pub mod updater;
pub mod vpn;
pub mod wireguard;

pub use control_server::ControlServer;
pub use error::{BlobField, ErrorKind, Position, SettingsError};
pub use netaddr::{Endpoint, IpNetwork, ParseNetworkError};
pub use openvpn::{ExtractError, Openvpn};
pub use provider::{Provider, ProviderRules, UnknownProvider};
pub use settings::{Layer, Precedence, Resolution, Resolved, Resolver, Settings};
pub use tree::{LineStyle, Node};
pub use updater::Updater;
pub use vpn::{UnknownVpnType, Vpn, VpnType};
pub use wireguard::{parse_wireguard_key, KeyError, Wireguard};
