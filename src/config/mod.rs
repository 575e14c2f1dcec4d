//! Settings loading
//!
//! Drives one resolution over three layers, highest priority first:
//! 1. Command-line overrides (provider, VPN type)
//! 2. Files on disk (WireGuard config, OpenVPN PEM files)
//! 3. Environment variables

mod effective;

pub use effective::{EffectiveSettings, FileDigest, SourceOrigin, SourceRecord, SCHEMA_ID, SCHEMA_VERSION};

use tracing::{debug, info};
use tunconf_settings::{
    Provider, Resolution, Resolved, Resolver, Settings, SettingsError, VpnType,
};
use tunconf_sources::{EnvSource, FilesSource, Source, SourceError};

/// Label of the command-line override layer.
pub const CLI_LAYER: &str = "cli";

/// Errors loading settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("computing digest of {path}: {source}")]
    Digest {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serializing report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The sources of one settings resolution.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    overrides: Settings,
    files: FilesSource,
    env: EnvSource,
}

impl Loader {
    pub fn new(files: FilesSource, env: EnvSource) -> Self {
        Self {
            overrides: Settings::default(),
            files,
            env,
        }
    }

    /// Force the VPN service provider regardless of files and environment.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.overrides.vpn.provider = Some(provider);
        self
    }

    /// Force the VPN protocol regardless of files and environment.
    pub fn with_vpn_type(mut self, vpn_type: VpnType) -> Self {
        self.overrides.vpn.vpn_type = Some(vpn_type);
        self
    }

    pub fn files(&self) -> &FilesSource {
        &self.files
    }

    fn has_overrides(&self) -> bool {
        self.overrides != Settings::default()
    }

    /// Read every source into a resolver, in priority order.
    pub fn resolver(&self) -> Result<Resolver, ConfigError> {
        let mut resolver = Resolver::new();
        if self.has_overrides() {
            resolver = resolver.override_with(CLI_LAYER, self.overrides.copy());
        }

        let sources: [&dyn Source; 2] = [&self.files, &self.env];
        for source in sources {
            let fragment = source.read()?;
            debug!(source = source.name(), "read settings fragment");
            resolver = resolver.fill(source.name(), fragment);
        }
        Ok(resolver)
    }

    /// Combined and defaulted settings, not yet validated.
    pub fn resolve(&self) -> Result<Resolution, ConfigError> {
        let resolution = self.resolver()?.resolve();
        info!(layers = resolution.layers().len(), "settings resolved");
        Ok(resolution)
    }

    /// Resolved settings that passed validation.
    pub fn load(&self) -> Result<Resolved, ConfigError> {
        Ok(self.resolve()?.validate()?)
    }

    /// A provenance report of the resolution, valid or not.
    pub fn effective(&self) -> Result<EffectiveSettings, ConfigError> {
        let resolution = self.resolve()?;
        EffectiveSettings::build(&resolution, &self.files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tunconf_settings::Precedence;

    fn empty_files() -> (TempDir, FilesSource) {
        let dir = TempDir::new().unwrap();
        let files = FilesSource::in_dir(dir.path());
        (dir, files)
    }

    #[test]
    fn test_layers_in_priority_order() {
        let (_dir, files) = empty_files();
        let loader = Loader::new(files, EnvSource::default()).with_provider(Provider::Mullvad);

        let resolver = loader.resolver().unwrap();
        let layers: Vec<(&str, Precedence)> = resolver
            .layers()
            .iter()
            .map(|layer| (layer.label.as_str(), layer.precedence))
            .collect();
        assert_eq!(
            layers,
            vec![
                (CLI_LAYER, Precedence::Override),
                ("files", Precedence::Fill),
                ("environment", Precedence::Fill),
            ]
        );
    }

    #[test]
    fn test_no_cli_layer_without_overrides() {
        let (_dir, files) = empty_files();
        let resolver = Loader::new(files, EnvSource::default()).resolver().unwrap();
        assert_eq!(resolver.layers().len(), 2);
    }

    #[test]
    fn test_cli_override_beats_environment() {
        let (_dir, files) = empty_files();
        let env = EnvSource::new([("VPN_SERVICE_PROVIDER", "nordvpn"), ("VPN_TYPE", "openvpn")]);
        let loader = Loader::new(files, env)
            .with_provider(Provider::Mullvad)
            .with_vpn_type(VpnType::Wireguard);

        let resolution = loader.resolve().unwrap();
        assert_eq!(resolution.settings().vpn.provider(), Provider::Mullvad);
        assert_eq!(resolution.settings().vpn.vpn_type(), VpnType::Wireguard);
    }

    #[test]
    fn test_files_beat_environment() {
        let (dir, files) = empty_files();
        fs::create_dir_all(dir.path().join("wireguard")).unwrap();
        fs::write(&files.wireguard_conf, "[Interface]\nAddress = 10.0.0.1/32\n").unwrap();
        let env = EnvSource::new([("WIREGUARD_ADDRESSES", "10.0.0.2/32")]);

        let resolution = Loader::new(files, env).resolve().unwrap();
        assert_eq!(
            resolution.settings().vpn.wireguard.addresses,
            Some(vec![Some("10.0.0.1/32".parse().unwrap())])
        );
    }

    #[test]
    fn test_load_reports_validation_error() {
        let (_dir, files) = empty_files();
        let err = Loader::new(files, EnvSource::default()).load().unwrap_err();
        assert!(matches!(err, ConfigError::Settings(_)));
    }

    #[test]
    fn test_source_error_propagates() {
        let (_dir, files) = empty_files();
        let env = EnvSource::new([("VPN_TYPE", "ipsec")]);
        let err = Loader::new(files, env).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Source(_)));
        assert_eq!(
            err.to_string(),
            "environment variable VPN_TYPE: VPN type is not valid: ipsec"
        );
    }
}
