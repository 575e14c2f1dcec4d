//! Validation error types.
//!
//! Every invariant the validator enforces has exactly one [`SettingsError`]
//! variant. [`SettingsError::kind`] maps a variant to its [`ErrorKind`], the
//! stable identity callers match on; `Display` renders the human message.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::openvpn::ExtractError;
use crate::provider::Provider;

/// Stable identity of a validation failure.
///
/// These codes are stable and used for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InterfaceNameInvalid,
    PrivateKeyMissing,
    PrivateKeyInvalid,
    PublicKeyMissing,
    PublicKeyInvalid,
    PreSharedKeyInvalid,
    EndpointMissing,
    EndpointIpMissing,
    EndpointPortMissing,
    AllowedIpsMissing,
    AllowedIpNil,
    AllowedIpIpNil,
    AllowedIpMaskNil,
    AllowedIpv6NotSupported,
    AddressMissing,
    AddressNil,
    AddressIpMissing,
    AddressMaskMissing,
    AddressIpv6NotSupported,
    FirewallMarkMissing,
    ImplementationInvalid,
    OpenvpnVersionInvalid,
    OpenvpnUserEmpty,
    OpenvpnPasswordEmpty,
    FilepathMissing,
    FileNotFound,
    CustomConfigUnreadable,
    MissingValue,
    Base64Invalid,
    KeyPassphraseEmpty,
    EncryptionPresetInvalid,
    MssFixTooHigh,
    OpenvpnInterfaceInvalid,
    VerbosityOutOfBounds,
    WireguardNotSupported,
    ControlServerAddressInvalid,
    UpdaterPeriodTooSmall,
    UpdaterDnsAddressInvalid,
    UpdaterProviderInvalid,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::InterfaceNameInvalid => "INTERFACE_NAME_INVALID",
            Self::PrivateKeyMissing => "PRIVATE_KEY_MISSING",
            Self::PrivateKeyInvalid => "PRIVATE_KEY_INVALID",
            Self::PublicKeyMissing => "PUBLIC_KEY_MISSING",
            Self::PublicKeyInvalid => "PUBLIC_KEY_INVALID",
            Self::PreSharedKeyInvalid => "PRE_SHARED_KEY_INVALID",
            Self::EndpointMissing => "ENDPOINT_MISSING",
            Self::EndpointIpMissing => "ENDPOINT_IP_MISSING",
            Self::EndpointPortMissing => "ENDPOINT_PORT_MISSING",
            Self::AllowedIpsMissing => "ALLOWED_IPS_MISSING",
            Self::AllowedIpNil => "ALLOWED_IP_NIL",
            Self::AllowedIpIpNil => "ALLOWED_IP_IP_NIL",
            Self::AllowedIpMaskNil => "ALLOWED_IP_MASK_NIL",
            Self::AllowedIpv6NotSupported => "ALLOWED_IPV6_NOT_SUPPORTED",
            Self::AddressMissing => "ADDRESS_MISSING",
            Self::AddressNil => "ADDRESS_NIL",
            Self::AddressIpMissing => "ADDRESS_IP_MISSING",
            Self::AddressMaskMissing => "ADDRESS_MASK_MISSING",
            Self::AddressIpv6NotSupported => "ADDRESS_IPV6_NOT_SUPPORTED",
            Self::FirewallMarkMissing => "FIREWALL_MARK_MISSING",
            Self::ImplementationInvalid => "IMPLEMENTATION_INVALID",
            Self::OpenvpnVersionInvalid => "OPENVPN_VERSION_INVALID",
            Self::OpenvpnUserEmpty => "OPENVPN_USER_EMPTY",
            Self::OpenvpnPasswordEmpty => "OPENVPN_PASSWORD_EMPTY",
            Self::FilepathMissing => "FILEPATH_MISSING",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::CustomConfigUnreadable => "CUSTOM_CONFIG_UNREADABLE",
            Self::MissingValue => "MISSING_VALUE",
            Self::Base64Invalid => "BASE64_INVALID",
            Self::KeyPassphraseEmpty => "KEY_PASSPHRASE_EMPTY",
            Self::EncryptionPresetInvalid => "ENCRYPTION_PRESET_INVALID",
            Self::MssFixTooHigh => "MSSFIX_TOO_HIGH",
            Self::OpenvpnInterfaceInvalid => "OPENVPN_INTERFACE_INVALID",
            Self::VerbosityOutOfBounds => "VERBOSITY_OUT_OF_BOUNDS",
            Self::WireguardNotSupported => "WIREGUARD_NOT_SUPPORTED",
            Self::ControlServerAddressInvalid => "CONTROL_SERVER_ADDRESS_INVALID",
            Self::UpdaterPeriodTooSmall => "UPDATER_PERIOD_TOO_SMALL",
            Self::UpdaterDnsAddressInvalid => "UPDATER_DNS_ADDRESS_INVALID",
            Self::UpdaterProviderInvalid => "UPDATER_PROVIDER_INVALID",
        };
        f.write_str(code)
    }
}

/// 1-based position of an entry within a list, rendered as `i of n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub len: usize,
}

impl Position {
    /// Position of the zero-based `offset` in a list of `len` entries.
    pub fn of(offset: usize, len: usize) -> Self {
        Self {
            index: offset + 1,
            len,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.index, self.len)
    }
}

/// OpenVPN base64 blob fields subject to provider requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobField {
    ClientCertificate,
    ClientKey,
    EncryptedKey,
}

impl fmt::Display for BlobField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientCertificate => write!(f, "client certificate"),
            Self::ClientKey => write!(f, "client key"),
            Self::EncryptedKey => write!(f, "encrypted key"),
        }
    }
}

/// A settings invariant violation.
///
/// Secret values (private key, pre-shared key, passwords) are never part of
/// the message.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid interface name: {name}")]
    InterfaceNameInvalid { name: String },

    #[error("private key is missing")]
    PrivateKeyMissing,

    #[error("cannot parse private key")]
    PrivateKeyInvalid,

    #[error("public key is missing")]
    PublicKeyMissing,

    #[error("cannot parse public key: {key}")]
    PublicKeyInvalid { key: String },

    #[error("cannot parse pre-shared key")]
    PreSharedKeyInvalid,

    #[error("endpoint is missing")]
    EndpointMissing,

    #[error("endpoint IP is missing")]
    EndpointIpMissing,

    #[error("endpoint port is missing")]
    EndpointPortMissing,

    #[error("allowed IPs are missing")]
    AllowedIpsMissing,

    #[error("allowed IP is nil: for allowed IP {position}")]
    AllowedIpNil { position: Position },

    #[error("allowed IP IP field is nil: for allowed IP {position}")]
    AllowedIpIpNil { position: Position },

    #[error("allowed IP mask field is nil: for allowed IP {position}")]
    AllowedIpMaskNil { position: Position },

    #[error("allowed IPv6 address not supported: for allowed IP {network}")]
    AllowedIpv6NotSupported { network: String },

    #[error("interface address is missing")]
    AddressMissing,

    #[error("interface address is nil: for address {position}")]
    AddressNil { position: Position },

    #[error("interface address IP is missing: for address {position}")]
    AddressIpMissing { position: Position },

    #[error("interface address mask is missing: for address {position}")]
    AddressMaskMissing { position: Position },

    #[error("interface address IPv6 is not supported: for address {address}")]
    AddressIpv6NotSupported { address: String },

    #[error("firewall mark is missing")]
    FirewallMarkMissing,

    #[error("invalid implementation: {implementation}")]
    ImplementationInvalid { implementation: String },

    #[error("OpenVPN version is not valid: {version} must be one of {}", .allowed.join(", "))]
    OpenvpnVersionInvalid {
        version: String,
        allowed: &'static [&'static str],
    },

    #[error("OpenVPN user cannot be empty")]
    OpenvpnUserEmpty,

    #[error("OpenVPN password cannot be empty")]
    OpenvpnPasswordEmpty,

    #[error("custom configuration file: filepath is missing")]
    FilepathMissing,

    #[error("custom configuration file: file does not exist: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("custom configuration file: extracting information from {}: {source}", .path.display())]
    CustomConfigUnreadable {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("{field}: missing value")]
    MissingValue { field: BlobField },

    #[error("{field}: {source}")]
    Base64Invalid {
        field: BlobField,
        #[source]
        source: base64::DecodeError,
    },

    #[error("key passphrase cannot be empty")]
    KeyPassphraseEmpty,

    #[error("encryption preset is not valid: {preset} must be one of {}", .allowed.join(", "))]
    EncryptionPresetInvalid {
        preset: String,
        allowed: &'static [&'static str],
    },

    #[error("mssfix option value is too high: {value} is over the maximum value of {max}")]
    MssFixTooHigh { value: u16, max: u16 },

    #[error("interface name is not valid: '{name}' does not match regex '{pattern}'")]
    OpenvpnInterfaceInvalid { name: String, pattern: &'static str },

    #[error("verbosity value is out of bounds: {value} can only be between {min} and {max}")]
    VerbosityOutOfBounds { value: i32, min: i32, max: i32 },

    #[error("Wireguard is not supported: for VPN service provider {provider}")]
    WireguardNotSupported { provider: Provider },

    #[error("control server listening address is not valid: {address}: {reason}")]
    ControlServerAddressInvalid { address: String, reason: String },

    #[error("updater period is too small: {} must be at least {}", humantime::format_duration(*.period), humantime::format_duration(*.min))]
    UpdaterPeriodTooSmall { period: Duration, min: Duration },

    #[error("updater DNS address is not valid: {address}")]
    UpdaterDnsAddressInvalid { address: String },

    #[error("updater cannot update servers for VPN service provider {provider}")]
    UpdaterProviderInvalid { provider: Provider },
}

impl SettingsError {
    /// The stable sentinel identity of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InterfaceNameInvalid { .. } => ErrorKind::InterfaceNameInvalid,
            Self::PrivateKeyMissing => ErrorKind::PrivateKeyMissing,
            Self::PrivateKeyInvalid => ErrorKind::PrivateKeyInvalid,
            Self::PublicKeyMissing => ErrorKind::PublicKeyMissing,
            Self::PublicKeyInvalid { .. } => ErrorKind::PublicKeyInvalid,
            Self::PreSharedKeyInvalid => ErrorKind::PreSharedKeyInvalid,
            Self::EndpointMissing => ErrorKind::EndpointMissing,
            Self::EndpointIpMissing => ErrorKind::EndpointIpMissing,
            Self::EndpointPortMissing => ErrorKind::EndpointPortMissing,
            Self::AllowedIpsMissing => ErrorKind::AllowedIpsMissing,
            Self::AllowedIpNil { .. } => ErrorKind::AllowedIpNil,
            Self::AllowedIpIpNil { .. } => ErrorKind::AllowedIpIpNil,
            Self::AllowedIpMaskNil { .. } => ErrorKind::AllowedIpMaskNil,
            Self::AllowedIpv6NotSupported { .. } => ErrorKind::AllowedIpv6NotSupported,
            Self::AddressMissing => ErrorKind::AddressMissing,
            Self::AddressNil { .. } => ErrorKind::AddressNil,
            Self::AddressIpMissing { .. } => ErrorKind::AddressIpMissing,
            Self::AddressMaskMissing { .. } => ErrorKind::AddressMaskMissing,
            Self::AddressIpv6NotSupported { .. } => ErrorKind::AddressIpv6NotSupported,
            Self::FirewallMarkMissing => ErrorKind::FirewallMarkMissing,
            Self::ImplementationInvalid { .. } => ErrorKind::ImplementationInvalid,
            Self::OpenvpnVersionInvalid { .. } => ErrorKind::OpenvpnVersionInvalid,
            Self::OpenvpnUserEmpty => ErrorKind::OpenvpnUserEmpty,
            Self::OpenvpnPasswordEmpty => ErrorKind::OpenvpnPasswordEmpty,
            Self::FilepathMissing => ErrorKind::FilepathMissing,
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::CustomConfigUnreadable { .. } => ErrorKind::CustomConfigUnreadable,
            Self::MissingValue { .. } => ErrorKind::MissingValue,
            Self::Base64Invalid { .. } => ErrorKind::Base64Invalid,
            Self::KeyPassphraseEmpty => ErrorKind::KeyPassphraseEmpty,
            Self::EncryptionPresetInvalid { .. } => ErrorKind::EncryptionPresetInvalid,
            Self::MssFixTooHigh { .. } => ErrorKind::MssFixTooHigh,
            Self::OpenvpnInterfaceInvalid { .. } => ErrorKind::OpenvpnInterfaceInvalid,
            Self::VerbosityOutOfBounds { .. } => ErrorKind::VerbosityOutOfBounds,
            Self::WireguardNotSupported { .. } => ErrorKind::WireguardNotSupported,
            Self::ControlServerAddressInvalid { .. } => ErrorKind::ControlServerAddressInvalid,
            Self::UpdaterPeriodTooSmall { .. } => ErrorKind::UpdaterPeriodTooSmall,
            Self::UpdaterDnsAddressInvalid { .. } => ErrorKind::UpdaterDnsAddressInvalid,
            Self::UpdaterProviderInvalid { .. } => ErrorKind::UpdaterProviderInvalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::of(0, 2).to_string(), "1 of 2");
        assert_eq!(Position::of(1, 2).to_string(), "2 of 2");
    }

    #[test]
    fn test_kind_is_independent_of_message() {
        let a = SettingsError::InterfaceNameInvalid {
            name: "a$".to_string(),
        };
        let b = SettingsError::InterfaceNameInvalid {
            name: "b$".to_string(),
        };
        assert_ne!(a.to_string(), b.to_string());
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.kind().to_string(), "INTERFACE_NAME_INVALID");
    }

    #[test]
    fn test_blob_field_message() {
        let err = SettingsError::MissingValue {
            field: BlobField::ClientCertificate,
        };
        assert_eq!(err.to_string(), "client certificate: missing value");
    }

    #[test]
    fn test_updater_period_message() {
        let err = SettingsError::UpdaterPeriodTooSmall {
            period: Duration::from_secs(30),
            min: Duration::from_secs(60),
        };
        assert_eq!(
            err.to_string(),
            "updater period is too small: 30s must be at least 1m"
        );
    }
}
