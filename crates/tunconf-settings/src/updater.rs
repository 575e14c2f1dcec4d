//! Server data updater settings.
//!
//! The updater periodically refreshes the server lists of the enabled
//! providers. A zero period disables it.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::error::SettingsError;
use crate::optional;
use crate::provider::Provider;
use crate::tree::{LineStyle, Node};

pub const DEFAULT_DNS_ADDRESS: &str = "1.1.1.1:53";

/// Shortest non-zero update period.
pub const MIN_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Updater {
    /// Time between updates; zero disables the updater.
    pub period: Option<Duration>,
    /// Plaintext DNS resolver as `ip` or `ip:port`.
    pub dns_address: Option<String>,
    /// Providers whose server data gets updated.
    pub providers: Option<Vec<Provider>>,
}

impl Updater {
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn merge_with(&mut self, other: &Updater) {
        optional::merge(&mut self.period, &other.period);
        optional::merge(&mut self.dns_address, &other.dns_address);
        optional::merge(&mut self.providers, &other.providers);
    }

    pub fn override_with(&mut self, other: &Updater) {
        optional::override_with(&mut self.period, &other.period);
        optional::override_with(&mut self.dns_address, &other.dns_address);
        optional::override_with(&mut self.providers, &other.providers);
    }

    pub(crate) fn set_defaults(&mut self) {
        optional::default(&mut self.period, Duration::ZERO);
        optional::default(&mut self.dns_address, DEFAULT_DNS_ADDRESS.to_string());
        optional::default(
            &mut self.providers,
            Provider::ALL
                .into_iter()
                .filter(|provider| *provider != Provider::Custom)
                .collect(),
        );
    }

    pub fn enabled(&self) -> bool {
        self.period.is_some_and(|period| !period.is_zero())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(period) = self.period {
            if !period.is_zero() && period < MIN_PERIOD {
                return Err(SettingsError::UpdaterPeriodTooSmall {
                    period,
                    min: MIN_PERIOD,
                });
            }
        }

        let dns_address = self.dns_address.as_deref().unwrap_or_default();
        if dns_address.parse::<IpAddr>().is_err() && dns_address.parse::<SocketAddr>().is_err() {
            return Err(SettingsError::UpdaterDnsAddressInvalid {
                address: dns_address.to_string(),
            });
        }

        for provider in self.providers.iter().flatten() {
            if *provider == Provider::Custom {
                return Err(SettingsError::UpdaterProviderInvalid {
                    provider: *provider,
                });
            }
        }

        Ok(())
    }

    pub fn to_node(&self) -> Node {
        let period = match self.period {
            Some(period) if !period.is_zero() => period,
            _ => return Node::new("Server data updater settings: disabled"),
        };

        let mut node = Node::new("Server data updater settings:");
        node.child(format!(
            "Update period: every {}",
            humantime::format_duration(period)
        ));
        node.child(format!(
            "DNS address: {}",
            self.dns_address.as_deref().unwrap_or("not set")
        ));
        let providers: Vec<&str> = self
            .providers
            .iter()
            .flatten()
            .map(|provider| provider.name())
            .collect();
        if providers.is_empty() {
            node.child("Providers to update: none");
        } else {
            node.child(format!("Providers to update: {}", providers.join(", ")));
        }
        node
    }

    /// The section header followed by its field lines.
    pub fn to_lines(&self, style: &LineStyle) -> Vec<String> {
        self.to_node().lines(style)
    }
}

impl fmt::Display for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines(&LineStyle::default()).join("\n"))
    }
}
