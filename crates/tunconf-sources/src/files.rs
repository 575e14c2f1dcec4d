//! Settings from files on disk.
//!
//! Reads the WireGuard INI configuration file and the OpenVPN client
//! certificate, client key and encrypted key PEM files. A missing file
//! contributes nothing.

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tracing::debug;
use tunconf_settings::{parse_wireguard_key, Endpoint, IpNetwork, Openvpn, Settings, Wireguard};

use crate::error::{SourceError, ValueError};
use crate::ini::{Ini, Section};
use crate::Source;

pub const DEFAULT_WIREGUARD_CONF: &str = "/gluetun/wireguard/wg0.conf";
pub const DEFAULT_CLIENT_CERT: &str = "/gluetun/client.crt";
pub const DEFAULT_CLIENT_KEY: &str = "/gluetun/client.key";
pub const DEFAULT_ENCRYPTED_KEY: &str = "/gluetun/openvpn_encrypted_key";

/// Reads settings from well-known file paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesSource {
    pub wireguard_conf: PathBuf,
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
    pub encrypted_key: PathBuf,
}

impl Default for FilesSource {
    fn default() -> Self {
        Self {
            wireguard_conf: PathBuf::from(DEFAULT_WIREGUARD_CONF),
            client_cert: PathBuf::from(DEFAULT_CLIENT_CERT),
            client_key: PathBuf::from(DEFAULT_CLIENT_KEY),
            encrypted_key: PathBuf::from(DEFAULT_ENCRYPTED_KEY),
        }
    }
}

impl FilesSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default layout rooted at `dir` instead of `/gluetun`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            wireguard_conf: dir.join("wireguard").join("wg0.conf"),
            client_cert: dir.join("client.crt"),
            client_key: dir.join("client.key"),
            encrypted_key: dir.join("openvpn_encrypted_key"),
        }
    }

    pub fn with_wireguard_conf(mut self, path: impl Into<PathBuf>) -> Self {
        self.wireguard_conf = path.into();
        self
    }

    /// Every file this source may read, in reading order.
    pub fn paths(&self) -> [&Path; 4] {
        [
            &self.wireguard_conf,
            &self.client_cert,
            &self.client_key,
            &self.encrypted_key,
        ]
    }

    fn read_wireguard(&self) -> Result<Wireguard, SourceError> {
        let path = &self.wireguard_conf;
        let Some(content) = read_optional(path)? else {
            return Ok(Wireguard::default());
        };

        let ini = Ini::parse(&content).map_err(|source| SourceError::Ini {
            path: path.clone(),
            source,
        })?;

        let mut wireguard = Wireguard::default();
        if let Some(section) = ini.section("Interface") {
            let field = FieldReader { path, section };
            wireguard.private_key = field.key("PrivateKey")?;
            wireguard.pre_shared_key = field.key("PreSharedKey")?;
            wireguard.addresses = field.networks("Address")?;
        }
        if let Some(section) = ini.section("Peer") {
            let field = FieldReader { path, section };
            wireguard.public_key = field.key("PublicKey")?;
            wireguard.endpoint = field.endpoint("Endpoint")?;
            wireguard.allowed_ips = field.networks("AllowedIPs")?;
        }

        debug!(path = %path.display(), "read wireguard configuration file");
        Ok(wireguard)
    }

    fn read_openvpn(&self) -> Result<Openvpn, SourceError> {
        Ok(Openvpn {
            cert: read_pem(&self.client_cert)?,
            key: read_pem(&self.client_key)?,
            encrypted_key: read_pem(&self.encrypted_key)?,
            ..Openvpn::default()
        })
    }
}

impl Source for FilesSource {
    fn name(&self) -> &str {
        "files"
    }

    fn read(&self) -> Result<Settings, SourceError> {
        let mut settings = Settings::default();
        settings.vpn.wireguard = self.read_wireguard()?;
        settings.vpn.openvpn = self.read_openvpn()?;
        Ok(settings)
    }
}

/// Reads typed values out of one INI section, attaching file context to
/// errors.
struct FieldReader<'a> {
    path: &'a Path,
    section: &'a Section,
}

impl FieldReader<'_> {
    fn error(&self, key: &str, source: ValueError) -> SourceError {
        SourceError::File {
            path: self.path.to_path_buf(),
            section: self.section.name().to_string(),
            key: key.to_string(),
            source,
        }
    }

    fn key(&self, key: &str) -> Result<Option<String>, SourceError> {
        let Some(value) = self.section.get(key) else {
            return Ok(None);
        };
        parse_wireguard_key(value).map_err(|e| self.error(key, e.into()))?;
        Ok(Some(value.to_string()))
    }

    fn networks(&self, key: &str) -> Result<Option<Vec<Option<IpNetwork>>>, SourceError> {
        let Some(value) = self.section.get(key) else {
            return Ok(None);
        };
        value
            .split(',')
            .map(|network| {
                network
                    .trim()
                    .parse::<IpNetwork>()
                    .map(Some)
                    .map_err(|e| self.error(key, e.into()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn endpoint(&self, key: &str) -> Result<Option<Endpoint>, SourceError> {
        let Some(value) = self.section.get(key) else {
            return Ok(None);
        };
        value
            .parse::<SocketAddr>()
            .map(|addr| Some(Endpoint::from(addr)))
            .map_err(|_| self.error(key, ValueError::Endpoint(value.to_string())))
    }
}

/// File content, or `None` if the file does not exist.
fn read_optional(path: &Path) -> Result<Option<String>, SourceError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SourceError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// The base64 body of the first PEM block in `path`.
fn read_pem(path: &Path) -> Result<Option<String>, SourceError> {
    let Some(content) = read_optional(path)? else {
        return Ok(None);
    };
    extract_pem_body(&content)
        .map(Some)
        .ok_or_else(|| SourceError::Pem {
            path: path.to_path_buf(),
        })
}

fn extract_pem_body(content: &str) -> Option<String> {
    let mut lines = content.lines().map(str::trim);
    lines.find(|line| line.starts_with("-----BEGIN "))?;

    let mut body = String::new();
    for line in lines {
        if line.starts_with("-----END ") {
            return (!body.is_empty()).then_some(body);
        }
        // Encapsulated headers such as `Proc-Type: 4,ENCRYPTED`.
        if line.contains(':') || line.is_empty() {
            continue;
        }
        body.push_str(line);
    }
    None
}
