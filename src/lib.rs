//! tunconf - layered VPN tunnel settings
//!
//! This crate reads tunnel settings from command-line overrides, files on
//! disk and environment variables, resolves them into one validated
//! settings value and reports where each layer came from.

pub mod config;

pub use config::{ConfigError, EffectiveSettings, Loader, SourceOrigin, SourceRecord};
pub use tunconf_settings::{ErrorKind, Provider, Resolved, Settings, SettingsError, VpnType};
