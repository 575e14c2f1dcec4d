//! Source errors.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use tunconf_settings::{KeyError, ParseNetworkError, UnknownProvider, UnknownVpnType};

use crate::ini::IniError;

/// A single value that could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error(transparent)]
    Provider(#[from] UnknownProvider),

    #[error(transparent)]
    VpnType(#[from] UnknownVpnType),

    #[error(transparent)]
    Network(#[from] ParseNetworkError),

    /// The key value itself is never part of the message.
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("invalid IP address: {0}")]
    IpAddress(String),

    #[error("invalid endpoint: {0}")]
    Endpoint(String),

    #[error("{value}: {source}")]
    Integer {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid boolean: {0}")]
    Boolean(String),

    #[error(transparent)]
    Duration(#[from] humantime::DurationError),
}

/// Error producing a settings fragment.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("environment variable {key}: {source}")]
    Env {
        key: String,
        #[source]
        source: ValueError,
    },

    #[error("reading file: {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("loading ini from {}: {source}", .path.display())]
    Ini {
        path: PathBuf,
        #[source]
        source: IniError,
    },

    #[error("{}: parsing {section} section: parsing {key}: {source}", .path.display())]
    File {
        path: PathBuf,
        section: String,
        key: String,
        #[source]
        source: ValueError,
    },

    #[error("{}: cannot decode PEM block", .path.display())]
    Pem { path: PathBuf },
}
