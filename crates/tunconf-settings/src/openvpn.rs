//! OpenVPN client settings.
//!
//! Which credentials and client blobs are mandatory depends on the VPN
//! service provider, so defaulting and validation both take the resolved
//! [`Provider`] and consult its [`ProviderRules`](crate::provider::ProviderRules).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{BlobField, SettingsError};
use crate::interface::{is_valid_interface_name, INTERFACE_NAME_PATTERN};
use crate::optional;
use crate::provider::{Provider, Requirement, ENCRYPTION_PRESETS};
use crate::tree::{redact, LineStyle, Node};

pub const OPENVPN_2_5: &str = "2.5";
pub const OPENVPN_2_6: &str = "2.6";

/// Supported OpenVPN program versions.
pub const OPENVPN_VERSIONS: &[&str] = &[OPENVPN_2_5, OPENVPN_2_6];

pub const DEFAULT_INTERFACE: &str = "tun0";
pub const DEFAULT_PROCESS_USER: &str = "root";
pub const DEFAULT_VERBOSITY: i32 = 1;

pub const MAX_MSS_FIX: u16 = 10000;
pub const MIN_VERBOSITY: i32 = 0;
pub const MAX_VERBOSITY: i32 = 6;

/// OpenVPN settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Openvpn {
    /// One of [`OPENVPN_VERSIONS`]. Empty until decided.
    pub version: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Path to a user-supplied OpenVPN configuration file.
    pub conf_file: Option<String>,
    /// Ciphers replacing the provider's own.
    pub ciphers: Option<Vec<String>>,
    pub auth: Option<String>,
    /// Base64 DER body of the client certificate.
    pub cert: Option<String>,
    /// Base64 DER body of the client key.
    pub key: Option<String>,
    /// Base64 DER body of an encrypted client key.
    pub encrypted_key: Option<String>,
    /// Passphrase for [`Openvpn::encrypted_key`].
    pub key_passphrase: Option<String>,
    /// Private Internet Access encryption preset.
    pub encryption_preset: Option<String>,
    /// `mssfix` value; zero leaves it to OpenVPN.
    pub mss_fix: Option<u16>,
    /// Tunnel device name. Empty until decided.
    pub interface: String,
    /// OS user running the OpenVPN process. Empty until decided.
    pub process_user: String,
    pub verbosity: Option<i32>,
    /// Extra command line flags.
    pub flags: Option<Vec<String>>,
}

impl Openvpn {
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn merge_with(&mut self, other: &Openvpn) {
        optional::merge_scalar(&mut self.version, &other.version);
        optional::merge(&mut self.user, &other.user);
        optional::merge(&mut self.password, &other.password);
        optional::merge(&mut self.conf_file, &other.conf_file);
        optional::merge(&mut self.ciphers, &other.ciphers);
        optional::merge(&mut self.auth, &other.auth);
        optional::merge(&mut self.cert, &other.cert);
        optional::merge(&mut self.key, &other.key);
        optional::merge(&mut self.encrypted_key, &other.encrypted_key);
        optional::merge(&mut self.key_passphrase, &other.key_passphrase);
        optional::merge(&mut self.encryption_preset, &other.encryption_preset);
        optional::merge(&mut self.mss_fix, &other.mss_fix);
        optional::merge_scalar(&mut self.interface, &other.interface);
        optional::merge_scalar(&mut self.process_user, &other.process_user);
        optional::merge(&mut self.verbosity, &other.verbosity);
        optional::merge(&mut self.flags, &other.flags);
    }

    pub fn override_with(&mut self, other: &Openvpn) {
        optional::override_scalar(&mut self.version, &other.version);
        optional::override_with(&mut self.user, &other.user);
        optional::override_with(&mut self.password, &other.password);
        optional::override_with(&mut self.conf_file, &other.conf_file);
        optional::override_with(&mut self.ciphers, &other.ciphers);
        optional::override_with(&mut self.auth, &other.auth);
        optional::override_with(&mut self.cert, &other.cert);
        optional::override_with(&mut self.key, &other.key);
        optional::override_with(&mut self.encrypted_key, &other.encrypted_key);
        optional::override_with(&mut self.key_passphrase, &other.key_passphrase);
        optional::override_with(&mut self.encryption_preset, &other.encryption_preset);
        optional::override_with(&mut self.mss_fix, &other.mss_fix);
        optional::override_scalar(&mut self.interface, &other.interface);
        optional::override_scalar(&mut self.process_user, &other.process_user);
        optional::override_with(&mut self.verbosity, &other.verbosity);
        optional::override_with(&mut self.flags, &other.flags);
    }

    pub(crate) fn set_defaults(&mut self, provider: Provider) {
        let rules = provider.rules();

        optional::default_scalar(&mut self.version, OPENVPN_2_5.to_string());
        optional::default(&mut self.user, String::new());
        optional::default(
            &mut self.password,
            rules.default_password.unwrap_or_default().to_string(),
        );
        optional::default(&mut self.conf_file, String::new());
        optional::default(&mut self.ciphers, Vec::new());
        optional::default(&mut self.auth, String::new());
        optional::default(&mut self.cert, String::new());
        optional::default(&mut self.key, String::new());
        optional::default(&mut self.encrypted_key, String::new());
        optional::default(&mut self.key_passphrase, String::new());
        optional::default(
            &mut self.encryption_preset,
            rules.default_encryption_preset.unwrap_or_default().to_string(),
        );
        optional::default(&mut self.mss_fix, 0);
        optional::default_scalar(&mut self.interface, DEFAULT_INTERFACE.to_string());
        optional::default_scalar(&mut self.process_user, DEFAULT_PROCESS_USER.to_string());
        optional::default(&mut self.verbosity, DEFAULT_VERBOSITY);
        optional::default(&mut self.flags, Vec::new());
    }

    /// Check the settings for `provider`, failing on the first violated
    /// invariant.
    pub fn validate(&self, provider: Provider) -> Result<(), SettingsError> {
        let rules = provider.rules();

        if !OPENVPN_VERSIONS.contains(&self.version.as_str()) {
            return Err(SettingsError::OpenvpnVersionInvalid {
                version: self.version.clone(),
                allowed: OPENVPN_VERSIONS,
            });
        }

        let user = self.user.as_deref().unwrap_or_default();
        if rules.credentials.user_required() && user.is_empty() {
            return Err(SettingsError::OpenvpnUserEmpty);
        }

        let password = self.password.as_deref().unwrap_or_default();
        if rules.credentials.password_required(user) && password.is_empty() {
            return Err(SettingsError::OpenvpnPasswordEmpty);
        }

        if rules.custom_config {
            validate_custom_config(self.conf_file.as_deref().unwrap_or_default())?;
        }

        let blobs = [
            (BlobField::ClientCertificate, &self.cert, rules.client_certificate),
            (BlobField::ClientKey, &self.key, rules.client_key),
            (BlobField::EncryptedKey, &self.encrypted_key, rules.encrypted_key),
        ];
        for (field, value, requirement) in blobs {
            validate_blob(field, value.as_deref().unwrap_or_default(), requirement)?;
        }

        let encrypted_key = self.encrypted_key.as_deref().unwrap_or_default();
        let passphrase = self.key_passphrase.as_deref().unwrap_or_default();
        if !encrypted_key.is_empty() && passphrase.is_empty() {
            return Err(SettingsError::KeyPassphraseEmpty);
        }

        if rules.default_encryption_preset.is_some() {
            let preset = self.encryption_preset.as_deref().unwrap_or_default();
            if !ENCRYPTION_PRESETS.contains(&preset) {
                return Err(SettingsError::EncryptionPresetInvalid {
                    preset: preset.to_string(),
                    allowed: ENCRYPTION_PRESETS,
                });
            }
        }

        if let Some(mss_fix) = self.mss_fix {
            if mss_fix > MAX_MSS_FIX {
                return Err(SettingsError::MssFixTooHigh {
                    value: mss_fix,
                    max: MAX_MSS_FIX,
                });
            }
        }

        if !is_valid_interface_name(&self.interface) {
            return Err(SettingsError::OpenvpnInterfaceInvalid {
                name: self.interface.clone(),
                pattern: INTERFACE_NAME_PATTERN,
            });
        }

        if let Some(verbosity) = self.verbosity {
            if !(MIN_VERBOSITY..=MAX_VERBOSITY).contains(&verbosity) {
                return Err(SettingsError::VerbosityOutOfBounds {
                    value: verbosity,
                    min: MIN_VERBOSITY,
                    max: MAX_VERBOSITY,
                });
            }
        }

        Ok(())
    }

    pub fn to_node(&self) -> Node {
        let mut node = Node::new("OpenVPN settings:");
        node.child(format!("OpenVPN version: {}", self.version));
        node.child(format!("User: {}", redact(self.user.as_deref())));
        node.child(format!("Password: {}", redact(self.password.as_deref())));

        if let Some(conf_file) = non_empty(&self.conf_file) {
            node.child(format!("Custom configuration file: {}", conf_file));
        }
        if let Some(ciphers) = self.ciphers.as_deref().filter(|c| !c.is_empty()) {
            node.child(format!("Ciphers: [{}]", ciphers.join(" ")));
        }
        if let Some(auth) = non_empty(&self.auth) {
            node.child(format!("Auth: {}", auth));
        }
        if non_empty(&self.cert).is_some() {
            node.child(format!("Client crt: {}", redact(self.cert.as_deref())));
        }
        if non_empty(&self.key).is_some() {
            node.child(format!("Client key: {}", redact(self.key.as_deref())));
        }
        if non_empty(&self.encrypted_key).is_some() {
            node.child(format!(
                "Encrypted key: {} (key passphrase {})",
                redact(self.encrypted_key.as_deref()),
                redact(self.key_passphrase.as_deref())
            ));
        }
        if let Some(preset) = non_empty(&self.encryption_preset) {
            node.child(format!(
                "Private Internet Access encryption preset: {}",
                preset
            ));
        }
        if let Some(mss_fix) = self.mss_fix.filter(|m| *m > 0) {
            node.child(format!("MSS Fix: {}", mss_fix));
        }
        if !self.interface.is_empty() {
            node.child(format!("Network interface: {}", self.interface));
        }
        node.child(format!("Run OpenVPN as: {}", self.process_user));
        match self.verbosity {
            Some(verbosity) => node.child(format!("Verbosity level: {}", verbosity)),
            None => node.child("Verbosity level: not set"),
        };
        if let Some(flags) = self.flags.as_deref().filter(|f| !f.is_empty()) {
            node.child(format!("Flags: {}", flags.join(" ")));
        }

        node
    }

    /// The section header followed by its field lines.
    pub fn to_lines(&self, style: &LineStyle) -> Vec<String> {
        self.to_node().lines(style)
    }
}

impl fmt::Display for Openvpn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines(&LineStyle::default()).join("\n"))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn validate_custom_config(conf_file: &str) -> Result<(), SettingsError> {
    if conf_file.is_empty() {
        return Err(SettingsError::FilepathMissing);
    }

    let path = PathBuf::from(conf_file);
    if !path.exists() {
        return Err(SettingsError::FileNotFound { path });
    }

    extract_connection(&path)
        .map(|_| ())
        .map_err(|source| SettingsError::CustomConfigUnreadable { path, source })
}

fn validate_blob(
    field: BlobField,
    value: &str,
    requirement: Requirement,
) -> Result<(), SettingsError> {
    if value.is_empty() {
        return match requirement {
            Requirement::Required => Err(SettingsError::MissingValue { field }),
            Requirement::Optional => Ok(()),
        };
    }

    STANDARD
        .decode(value)
        .map(|_| ())
        .map_err(|source| SettingsError::Base64Invalid { field, source })
}

// ============================================================================
// Custom configuration file
// ============================================================================

/// Transport protocol of an OpenVPN connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

impl Protocol {
    fn default_port(self) -> u16 {
        match self {
            Protocol::Udp => 1194,
            Protocol::Tcp => 443,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udp => write!(f, "udp"),
            Protocol::Tcp => write!(f, "tcp"),
        }
    }
}

/// The connection described by a custom OpenVPN configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomConnection {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
}

/// Error extracting the connection from a custom OpenVPN configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("reading file: {0}")]
    Io(#[from] io::Error),

    #[error("remote line not found")]
    RemoteNotFound,

    #[error("remote port is not valid: {port}")]
    PortInvalid { port: String },

    #[error("network protocol not supported: {protocol}")]
    ProtocolInvalid { protocol: String },
}

/// Read `path` and extract the first `remote` connection from it.
///
/// The protocol comes from the `remote` line itself, then from a `proto`
/// line, then defaults to UDP. A missing port defaults to the protocol's
/// usual port.
pub fn extract_connection(path: &Path) -> Result<CustomConnection, ExtractError> {
    let content = fs::read_to_string(path)?;
    parse_connection(&content)
}

fn parse_connection(content: &str) -> Result<CustomConnection, ExtractError> {
    let mut remote: Option<(String, Option<String>, Option<String>)> = None;
    let mut proto: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("remote") if remote.is_none() => {
                if let Some(host) = fields.next() {
                    remote = Some((
                        host.to_string(),
                        fields.next().map(str::to_string),
                        fields.next().map(str::to_string),
                    ));
                }
            }
            Some("proto") if proto.is_none() => {
                proto = fields.next().map(str::to_string);
            }
            _ => {}
        }
    }

    let (host, port, remote_proto) = remote.ok_or(ExtractError::RemoteNotFound)?;

    let protocol = match remote_proto.or(proto) {
        Some(name) => parse_protocol(&name)?,
        None => Protocol::Udp,
    };

    let port = match port {
        Some(port) => match port.parse::<u16>() {
            Ok(value) if value != 0 => value,
            _ => return Err(ExtractError::PortInvalid { port }),
        },
        None => protocol.default_port(),
    };

    Ok(CustomConnection {
        host,
        port,
        protocol,
    })
}

fn parse_protocol(name: &str) -> Result<Protocol, ExtractError> {
    match name.to_lowercase().as_str() {
        "udp" | "udp4" | "udp6" => Ok(Protocol::Udp),
        "tcp" | "tcp4" | "tcp6" | "tcp-client" => Ok(Protocol::Tcp),
        _ => Err(ExtractError::ProtocolInvalid {
            protocol: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const CERT: &str = "MIIBszCCAVmgAwIBAgIUQ2Vy";

    fn defaulted(provider: Provider) -> Openvpn {
        let mut settings = Openvpn::default();
        settings.set_defaults(provider);
        settings
    }

    fn with_credentials(provider: Provider) -> Openvpn {
        Openvpn {
            user: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..defaulted(provider)
        }
    }

    fn kind_of(settings: &Openvpn, provider: Provider) -> ErrorKind {
        settings.validate(provider).unwrap_err().kind()
    }

    #[test]
    fn test_set_defaults() {
        let settings = defaulted(Provider::Nordvpn);
        assert_eq!(settings.version, "2.5");
        assert_eq!(settings.user.as_deref(), Some(""));
        assert_eq!(settings.password.as_deref(), Some(""));
        assert_eq!(settings.encryption_preset.as_deref(), Some(""));
        assert_eq!(settings.interface, "tun0");
        assert_eq!(settings.process_user, "root");
        assert_eq!(settings.verbosity, Some(1));
        assert_eq!(settings.mss_fix, Some(0));
        assert_eq!(settings.ciphers, Some(vec![]));
    }

    #[test]
    fn test_set_defaults_per_provider() {
        assert_eq!(
            defaulted(Provider::Mullvad).password.as_deref(),
            Some("m")
        );
        assert_eq!(
            defaulted(Provider::PrivateInternetAccess)
                .encryption_preset
                .as_deref(),
            Some("strong")
        );
    }

    #[test]
    fn test_set_defaults_keeps_present_empty() {
        let mut settings = Openvpn {
            password: Some(String::new()),
            ..Openvpn::default()
        };
        settings.set_defaults(Provider::Mullvad);
        assert_eq!(settings.password.as_deref(), Some(""));
    }

    #[test]
    fn test_validate_valid() {
        with_credentials(Provider::Nordvpn)
            .validate(Provider::Nordvpn)
            .unwrap();
    }

    #[test]
    fn test_validate_version() {
        let settings = Openvpn {
            version: "2.4".to_string(),
            ..with_credentials(Provider::Nordvpn)
        };
        let err = settings.validate(Provider::Nordvpn).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OpenvpnVersionInvalid);
        assert_eq!(
            err.to_string(),
            "OpenVPN version is not valid: 2.4 must be one of 2.5, 2.6"
        );
    }

    #[test]
    fn test_validate_credentials() {
        let settings = defaulted(Provider::Nordvpn);
        assert_eq!(
            kind_of(&settings, Provider::Nordvpn),
            ErrorKind::OpenvpnUserEmpty
        );

        let settings = Openvpn {
            user: Some("user".to_string()),
            ..defaulted(Provider::Nordvpn)
        };
        assert_eq!(
            kind_of(&settings, Provider::Nordvpn),
            ErrorKind::OpenvpnPasswordEmpty
        );

        // Mullvad's default password satisfies the requirement.
        let settings = Openvpn {
            user: Some("1234".to_string()),
            ..defaulted(Provider::Mullvad)
        };
        settings.validate(Provider::Mullvad).unwrap();
    }

    #[test]
    fn test_validate_ivpn_account_id_waives_password() {
        let settings = Openvpn {
            user: Some("i-AbC1-2345-zzzz".to_string()),
            ..defaulted(Provider::Ivpn)
        };
        settings.validate(Provider::Ivpn).unwrap();

        let settings = Openvpn {
            user: Some("someone".to_string()),
            ..defaulted(Provider::Ivpn)
        };
        assert_eq!(
            kind_of(&settings, Provider::Ivpn),
            ErrorKind::OpenvpnPasswordEmpty
        );
    }

    #[test]
    fn test_validate_certificate_required() {
        let settings = with_credentials(Provider::Cyberghost);
        let err = settings.validate(Provider::Cyberghost).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingValue);
        assert_eq!(err.to_string(), "client certificate: missing value");
    }

    #[test]
    fn test_validate_key_required() {
        let settings = Openvpn {
            cert: Some(CERT.to_string()),
            ..with_credentials(Provider::Cyberghost)
        };
        let err = settings.validate(Provider::Cyberghost).unwrap_err();
        assert_eq!(err.to_string(), "client key: missing value");

        let settings = Openvpn {
            cert: Some(CERT.to_string()),
            key: Some(CERT.to_string()),
            ..with_credentials(Provider::Cyberghost)
        };
        settings.validate(Provider::Cyberghost).unwrap();
    }

    #[test]
    fn test_validate_vpnsecure_encrypted_key() {
        let settings = Openvpn {
            cert: Some(CERT.to_string()),
            ..defaulted(Provider::VpnSecure)
        };
        let err = settings.validate(Provider::VpnSecure).unwrap_err();
        assert_eq!(err.to_string(), "encrypted key: missing value");

        let settings = Openvpn {
            cert: Some(CERT.to_string()),
            encrypted_key: Some(CERT.to_string()),
            ..defaulted(Provider::VpnSecure)
        };
        let err = settings.validate(Provider::VpnSecure).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyPassphraseEmpty);
        assert_eq!(err.to_string(), "key passphrase cannot be empty");
    }

    #[test]
    fn test_validate_optional_blob_must_be_base64() {
        let settings = Openvpn {
            key: Some("not base64!".to_string()),
            ..with_credentials(Provider::Nordvpn)
        };
        let err = settings.validate(Provider::Nordvpn).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Base64Invalid);
        assert!(err.to_string().starts_with("client key: "));
    }

    #[test]
    fn test_validate_required_blob_must_be_base64() {
        let settings = Openvpn {
            cert: Some("not base64!".to_string()),
            key: Some(CERT.to_string()),
            ..with_credentials(Provider::Cyberghost)
        };
        let err = settings.validate(Provider::Cyberghost).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Base64Invalid);
        assert!(err.to_string().starts_with("client certificate: "));
    }

    #[test]
    fn test_validate_encryption_preset() {
        let settings = Openvpn {
            encryption_preset: Some("weak".to_string()),
            ..with_credentials(Provider::PrivateInternetAccess)
        };
        let err = settings
            .validate(Provider::PrivateInternetAccess)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "encryption preset is not valid: weak must be one of none, normal, strong"
        );

        // Other providers ignore the preset.
        let settings = Openvpn {
            encryption_preset: Some("weak".to_string()),
            ..with_credentials(Provider::Nordvpn)
        };
        settings.validate(Provider::Nordvpn).unwrap();
    }

    #[test]
    fn test_validate_mss_fix() {
        let settings = Openvpn {
            mss_fix: Some(10001),
            ..with_credentials(Provider::Nordvpn)
        };
        let err = settings.validate(Provider::Nordvpn).unwrap_err();
        assert_eq!(
            err.to_string(),
            "mssfix option value is too high: 10001 is over the maximum value of 10000"
        );

        let settings = Openvpn {
            mss_fix: Some(10000),
            ..with_credentials(Provider::Nordvpn)
        };
        settings.validate(Provider::Nordvpn).unwrap();
    }

    #[test]
    fn test_validate_interface() {
        let settings = Openvpn {
            interface: "tun-0".to_string(),
            ..with_credentials(Provider::Nordvpn)
        };
        let err = settings.validate(Provider::Nordvpn).unwrap_err();
        assert_eq!(
            err.to_string(),
            "interface name is not valid: 'tun-0' does not match regex '^[a-zA-Z0-9_]+$'"
        );
    }

    #[test]
    fn test_validate_verbosity_bounds() {
        for verbosity in [0, 6] {
            let settings = Openvpn {
                verbosity: Some(verbosity),
                ..with_credentials(Provider::Nordvpn)
            };
            settings.validate(Provider::Nordvpn).unwrap();
        }

        let settings = Openvpn {
            verbosity: Some(7),
            ..with_credentials(Provider::Nordvpn)
        };
        let err = settings.validate(Provider::Nordvpn).unwrap_err();
        assert_eq!(
            err.to_string(),
            "verbosity value is out of bounds: 7 can only be between 0 and 6"
        );
    }

    #[test]
    fn test_validate_custom_config_missing_path() {
        let settings = defaulted(Provider::Custom);
        let err = settings.validate(Provider::Custom).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FilepathMissing);
        assert_eq!(
            err.to_string(),
            "custom configuration file: filepath is missing"
        );
    }

    #[test]
    fn test_validate_custom_config_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ovpn");
        let settings = Openvpn {
            conf_file: Some(path.display().to_string()),
            ..defaulted(Provider::Custom)
        };
        assert_eq!(
            kind_of(&settings, Provider::Custom),
            ErrorKind::FileNotFound
        );
    }

    #[test]
    fn test_validate_custom_config_without_remote() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "client\ndev tun").unwrap();
        let settings = Openvpn {
            conf_file: Some(file.path().display().to_string()),
            ..defaulted(Provider::Custom)
        };
        let err = settings.validate(Provider::Custom).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CustomConfigUnreadable);
        assert!(err.to_string().ends_with(": remote line not found"));
    }

    #[test]
    fn test_validate_custom_config_valid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "client\nproto tcp\nremote vpn.example.com 1443").unwrap();
        let settings = Openvpn {
            conf_file: Some(file.path().display().to_string()),
            ..defaulted(Provider::Custom)
        };
        settings.validate(Provider::Custom).unwrap();
    }

    #[test]
    fn test_parse_connection() {
        let connection = parse_connection("remote 1.2.3.4 1194 udp\n").unwrap();
        assert_eq!(
            connection,
            CustomConnection {
                host: "1.2.3.4".to_string(),
                port: 1194,
                protocol: Protocol::Udp,
            }
        );

        let connection = parse_connection("proto tcp-client\nremote host\n").unwrap();
        assert_eq!(connection.port, 443);
        assert_eq!(connection.protocol, Protocol::Tcp);

        let connection =
            parse_connection("# remote commented 1\nremote first 1\nremote second 2\n").unwrap();
        assert_eq!(connection.host, "first");
    }

    #[test]
    fn test_parse_connection_errors() {
        assert!(matches!(
            parse_connection("remote host 0"),
            Err(ExtractError::PortInvalid { .. })
        ));
        assert_eq!(
            parse_connection("remote host 1194 sctp")
                .unwrap_err()
                .to_string(),
            "network protocol not supported: sctp"
        );
    }

    #[test]
    fn test_lines_redact_secrets() {
        let settings = Openvpn {
            cert: Some(CERT.to_string()),
            encrypted_key: Some(CERT.to_string()),
            ciphers: Some(vec!["aes-256-gcm".to_string(), "aes-128-gcm".to_string()]),
            ..with_credentials(Provider::Nordvpn)
        };
        assert_eq!(
            settings.to_lines(&LineStyle::default()),
            vec![
                "OpenVPN settings:",
                "├── OpenVPN version: 2.5",
                "├── User: [set]",
                "├── Password: [set]",
                "├── Ciphers: [aes-256-gcm aes-128-gcm]",
                "├── Client crt: [set]",
                "├── Encrypted key: [set] (key passphrase [not set])",
                "├── Network interface: tun0",
                "├── Run OpenVPN as: root",
                "└── Verbosity level: 1",
            ]
        );
        let rendered = settings.to_string();
        assert!(!rendered.contains("user"));
        assert!(!rendered.contains(CERT));
    }
}
