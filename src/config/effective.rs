//! Effective settings with provenance
//!
//! The effective settings report captures the rendered resolution plus
//! where each layer came from and whether the result is valid. Secret
//! values only ever appear redacted, through the settings tree.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use tunconf_settings::{LineStyle, Precedence, Resolution};
use tunconf_sources::FilesSource;

use super::{ConfigError, CLI_LAYER};

/// Schema version for effective settings reports
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "tunconf/effective_settings@1";

/// Origin of a settings layer
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    Cli,
    Files,
    Env,
}

impl SourceOrigin {
    fn of_label(label: &str) -> Self {
        match label {
            CLI_LAYER => Self::Cli,
            "files" => Self::Files,
            _ => Self::Env,
        }
    }
}

/// A file that contributed to the `files` layer
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileDigest {
    pub path: String,

    /// SHA-256 digest of the raw file bytes
    pub digest: String,
}

/// A contributing layer with provenance
#[derive(Debug, Clone, Serialize)]
pub struct SourceRecord {
    pub origin: SourceOrigin,

    /// Layer label as given to the resolver
    pub label: String,

    /// `fill` or `override`
    pub precedence: String,

    /// Files read, for the files layer
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileDigest>,
}

/// Effective settings with full provenance
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveSettings {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this report was computed
    pub created_at: DateTime<Utc>,

    /// Contributing layers in declared order
    pub sources: Vec<SourceRecord>,

    /// The rendered settings tree, secrets redacted
    pub settings: Vec<String>,

    pub valid: bool,

    /// First validation failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Sentinel code of the validation failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl EffectiveSettings {
    /// Build the report for a resolution read from `files`.
    pub fn build(resolution: &Resolution, files: &FilesSource) -> Result<Self, ConfigError> {
        let mut sources = Vec::new();
        for layer in resolution.layers() {
            let origin = SourceOrigin::of_label(&layer.label);
            let digests = match origin {
                SourceOrigin::Files => Self::digest_files(files)?,
                _ => Vec::new(),
            };
            sources.push(SourceRecord {
                origin,
                label: layer.label.clone(),
                precedence: layer.precedence.to_string(),
                files: digests,
            });
        }

        let settings = resolution.settings();
        let (error, error_kind) = match settings.validate() {
            Ok(()) => (None, None),
            Err(e) => (Some(e.to_string()), Some(e.kind().to_string())),
        };

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            sources,
            settings: settings.to_lines(&LineStyle::default()),
            valid: error.is_none(),
            error,
            error_kind,
        })
    }

    /// Digests of every file the source could read, skipping missing ones.
    fn digest_files(files: &FilesSource) -> Result<Vec<FileDigest>, ConfigError> {
        let mut digests = Vec::new();
        for path in files.paths() {
            if let Some(digest) = Self::digest_file(path)? {
                digests.push(FileDigest {
                    path: path.to_string_lossy().to_string(),
                    digest,
                });
            }
        }
        Ok(digests)
    }

    fn digest_file(path: &Path) -> Result<Option<String>, ConfigError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Digest {
                    path: path.to_string_lossy().to_string(),
                    source,
                })
            }
        };

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(Some(hex::encode(hasher.finalize())))
    }

    /// Whether any layer was an explicit override.
    pub fn has_overrides(&self) -> bool {
        self.sources
            .iter()
            .any(|source| source.precedence == Precedence::Override.to_string())
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
