//! Settings from environment variables.
//!
//! Empty variables count as unset. Deprecated ("retro") variable names are
//! still read when the current name is unset, with a warning naming the
//! replacement.

use std::collections::HashMap;
use std::net::IpAddr;
use std::str::FromStr;

use tracing::warn;
use tunconf_settings::{
    ControlServer, Endpoint, IpNetwork, Openvpn, Provider, Settings, Updater, Vpn, VpnType,
    Wireguard,
};

use crate::error::{SourceError, ValueError};
use crate::Source;

/// Reads settings from a snapshot of environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self::new(std::env::vars())
    }

    /// The value of `key` with surrounding spaces and quotes removed, if
    /// non-empty.
    fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|value| value.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|value| !value.is_empty())
    }

    /// The first set variable among `key` and then its `retro` names.
    fn get_with_retro<'a>(
        &'a self,
        key: &'static str,
        retro: &[&'static str],
    ) -> Option<(&'static str, &'a str)> {
        if let Some(value) = self.get(key) {
            return Some((key, value));
        }
        for &old in retro {
            if let Some(value) = self.get(old) {
                warn!(
                    "You are using the old environment variable {}, please consider changing it to {}",
                    old, key
                );
                return Some((old, value));
            }
        }
        None
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>, SourceError>
    where
        T: FromStr,
        T::Err: Into<ValueError>,
    {
        self.get(key)
            .map(|value| value.parse::<T>().map_err(|e| env_error(key, e.into())))
            .transpose()
    }

    fn integer<T>(&self, key: &str) -> Result<Option<T>, SourceError>
    where
        T: FromStr<Err = std::num::ParseIntError>,
    {
        self.get(key)
            .map(|value| {
                value.parse::<T>().map_err(|source| {
                    env_error(
                        key,
                        ValueError::Integer {
                            value: value.to_string(),
                            source,
                        },
                    )
                })
            })
            .transpose()
    }

    fn boolean(&self, key: &str) -> Result<Option<bool>, SourceError> {
        self.get(key)
            .map(|value| parse_bool(value).map_err(|e| env_error(key, e)))
            .transpose()
    }

    fn csv(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(split_csv)
    }

    fn networks(&self, key: &str, value: &str) -> Result<Vec<Option<IpNetwork>>, SourceError> {
        split_csv(value)
            .iter()
            .map(|network| {
                network
                    .parse::<IpNetwork>()
                    .map(Some)
                    .map_err(|e| env_error(key, e.into()))
            })
            .collect()
    }

    fn read_vpn(&self) -> Result<Vpn, SourceError> {
        let provider = match self.get_with_retro("VPN_SERVICE_PROVIDER", &["VPNSP"]) {
            Some((key, value)) => Some(
                value
                    .parse::<Provider>()
                    .map_err(|e| env_error(key, e.into()))?,
            ),
            None => None,
        };

        Ok(Vpn {
            vpn_type: self.parse::<VpnType>("VPN_TYPE")?,
            provider,
            openvpn: self.read_openvpn()?,
            wireguard: self.read_wireguard()?,
        })
    }

    fn read_wireguard(&self) -> Result<Wireguard, SourceError> {
        let interface_name = self
            .get_with_retro("VPN_INTERFACE", &["WIREGUARD_INTERFACE"])
            .map(|(_, value)| value.to_string())
            .unwrap_or_default();

        let allowed_ips = match self.get("WIREGUARD_ALLOWED_IPS") {
            Some(value) => Some(self.networks("WIREGUARD_ALLOWED_IPS", value)?),
            None => None,
        };

        let addresses = match self.get_with_retro("WIREGUARD_ADDRESSES", &["WIREGUARD_ADDRESS"]) {
            Some((key, value)) => Some(self.networks(key, value)?),
            None => None,
        };

        let endpoint_ip = self
            .get("WIREGUARD_ENDPOINT_IP")
            .map(|value| {
                value.parse::<IpAddr>().map_err(|_| {
                    env_error(
                        "WIREGUARD_ENDPOINT_IP",
                        ValueError::IpAddress(value.to_string()),
                    )
                })
            })
            .transpose()?;
        let endpoint_port = self.integer::<u16>("WIREGUARD_ENDPOINT_PORT")?;
        let endpoint = match (endpoint_ip, endpoint_port) {
            (None, None) => None,
            (ip, port) => Some(Endpoint {
                ip,
                port: port.unwrap_or(0),
            }),
        };

        Ok(Wireguard {
            interface_name,
            private_key: self.string("WIREGUARD_PRIVATE_KEY"),
            public_key: self.string("WIREGUARD_PUBLIC_KEY"),
            pre_shared_key: self.string("WIREGUARD_PRESHARED_KEY"),
            endpoint,
            allowed_ips,
            addresses,
            ipv6: None,
            firewall_mark: 0,
            rule_priority: 0,
            implementation: self.string("WIREGUARD_IMPLEMENTATION").unwrap_or_default(),
        })
    }

    fn read_openvpn(&self) -> Result<Openvpn, SourceError> {
        let retro = |key: &'static str, old: &'static str| {
            self.get_with_retro(key, &[old])
                .map(|(_, value)| value.to_string())
        };

        Ok(Openvpn {
            version: self.string("OPENVPN_VERSION").unwrap_or_default(),
            user: retro("OPENVPN_USER", "USER"),
            password: retro("OPENVPN_PASSWORD", "PASSWORD"),
            conf_file: self.string("OPENVPN_CUSTOM_CONFIG"),
            ciphers: self.csv("OPENVPN_CIPHERS"),
            auth: self.string("OPENVPN_AUTH"),
            cert: self.string("OPENVPN_CERT"),
            key: self.string("OPENVPN_KEY"),
            encrypted_key: self.string("OPENVPN_ENCRYPTED_KEY"),
            key_passphrase: self.string("OPENVPN_KEY_PASSPHRASE"),
            encryption_preset: self.string("PRIVATE_INTERNET_ACCESS_OPENVPN_ENCRYPTION_PRESET"),
            mss_fix: self.integer::<u16>("OPENVPN_MSSFIX")?,
            interface: self.string("OPENVPN_INTERFACE").unwrap_or_default(),
            process_user: self.string("OPENVPN_PROCESS_USER").unwrap_or_default(),
            verbosity: self.integer::<i32>("OPENVPN_VERBOSITY")?,
            flags: self
                .get("OPENVPN_FLAGS")
                .map(|value| value.split_whitespace().map(str::to_string).collect()),
        })
    }

    fn read_control_server(&self) -> Result<ControlServer, SourceError> {
        let address = self
            .get_with_retro("HTTP_CONTROL_SERVER_ADDRESS", &["CONTROL_SERVER_ADDRESS"])
            .map(|(key, value)| match key {
                // The old variable only held a port.
                "CONTROL_SERVER_ADDRESS" => format!(":{}", value),
                _ => value.to_string(),
            });

        Ok(ControlServer {
            address,
            log: self.boolean("HTTP_CONTROL_SERVER_LOG")?,
        })
    }

    fn read_updater(&self) -> Result<Updater, SourceError> {
        let period = self
            .get("UPDATER_PERIOD")
            .map(|value| {
                humantime::parse_duration(value).map_err(|e| env_error("UPDATER_PERIOD", e.into()))
            })
            .transpose()?;

        let providers = match self.csv("UPDATER_VPN_SERVICE_PROVIDERS") {
            Some(names) => Some(
                names
                    .iter()
                    .map(|name| {
                        name.parse::<Provider>()
                            .map_err(|e| env_error("UPDATER_VPN_SERVICE_PROVIDERS", e.into()))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        Ok(Updater {
            period,
            dns_address: self.string("UPDATER_DNS_ADDRESS"),
            providers,
        })
    }
}

impl Source for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn read(&self) -> Result<Settings, SourceError> {
        Ok(Settings {
            vpn: self.read_vpn()?,
            control_server: self.read_control_server()?,
            updater: self.read_updater()?,
        })
    }
}

fn env_error(key: &str, source: ValueError) -> SourceError {
    SourceError::Env {
        key: key.to_string(),
        source,
    }
}

fn split_csv(value: &str) -> Vec<String> {
    value.split(',').map(|part| part.trim().to_string()).collect()
}

fn parse_bool(value: &str) -> Result<bool, ValueError> {
    match value.to_lowercase().as_str() {
        "yes" | "on" | "true" | "enabled" => Ok(true),
        "no" | "off" | "false" | "disabled" => Ok(false),
        _ => Err(ValueError::Boolean(value.to_string())),
    }
}
