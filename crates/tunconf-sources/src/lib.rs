//! Settings sources.
//!
//! Each source reads one external origin (environment variables, files on
//! disk) into a partial [`Settings`] fragment. Fragments are combined by a
//! [`tunconf_settings::Resolver`]; sources never apply defaults or validate.

pub mod env;
pub mod error;
pub mod files;
pub mod ini;

pub use env::EnvSource;
pub use error::{SourceError, ValueError};
pub use files::FilesSource;
pub use ini::{Ini, IniError};

use tunconf_settings::Settings;

/// An origin of settings fragments.
pub trait Source {
    /// Short label used for the resolver layer.
    fn name(&self) -> &str;

    /// Read the fragment this source contributes. Fields the source has no
    /// value for stay undecided.
    fn read(&self) -> Result<Settings, SourceError>;
}
