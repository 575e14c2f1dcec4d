//! HTTP control server settings.

use std::fmt;

use crate::error::SettingsError;
use crate::optional;
use crate::tree::{LineStyle, Node};

pub const DEFAULT_ADDRESS: &str = ":8000";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlServer {
    /// Listening address as `host:port`; the host may be empty.
    pub address: Option<String>,
    /// Log every request.
    pub log: Option<bool>,
}

impl ControlServer {
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn merge_with(&mut self, other: &ControlServer) {
        optional::merge(&mut self.address, &other.address);
        optional::merge(&mut self.log, &other.log);
    }

    pub fn override_with(&mut self, other: &ControlServer) {
        optional::override_with(&mut self.address, &other.address);
        optional::override_with(&mut self.log, &other.log);
    }

    pub(crate) fn set_defaults(&mut self) {
        optional::default(&mut self.address, DEFAULT_ADDRESS.to_string());
        optional::default(&mut self.log, true);
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let address = self.address.as_deref().unwrap_or_default();
        let invalid = |reason: &str| SettingsError::ControlServerAddressInvalid {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let (_, port) = address
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port in address"))?;
        port.parse::<u16>()
            .map_err(|_| invalid("port is not a valid number"))?;

        Ok(())
    }

    pub fn to_node(&self) -> Node {
        let mut node = Node::new("HTTP control server settings:");
        node.child(format!(
            "Listening address: {}",
            self.address.as_deref().unwrap_or("not set")
        ));
        let log = match self.log {
            Some(true) => "yes",
            Some(false) => "no",
            None => "not set",
        };
        node.child(format!("Logging: {}", log));
        node
    }

    /// The section header followed by its field lines.
    pub fn to_lines(&self, style: &LineStyle) -> Vec<String> {
        self.to_node().lines(style)
    }
}

impl fmt::Display for ControlServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines(&LineStyle::default()).join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn with_address(address: &str) -> ControlServer {
        ControlServer {
            address: Some(address.to_string()),
            log: Some(true),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let mut settings = ControlServer::default();
        settings.set_defaults();
        assert_eq!(settings.address.as_deref(), Some(":8000"));
        assert_eq!(settings.log, Some(true));
        settings.validate().unwrap();
    }

    #[test]
    fn test_validate_addresses() {
        for address in [":8000", "0.0.0.0:9999", "[::1]:8000", "localhost:80"] {
            with_address(address).validate().unwrap();
        }

        let err = with_address("8000").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ControlServerAddressInvalid);
        assert_eq!(
            err.to_string(),
            "control server listening address is not valid: 8000: missing port in address"
        );

        let err = with_address(":http").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "control server listening address is not valid: :http: port is not a valid number"
        );
    }

    #[test]
    fn test_override_with_explicit_false() {
        let mut settings = with_address(":8000");
        settings.override_with(&ControlServer {
            address: None,
            log: Some(false),
        });
        assert_eq!(settings.address.as_deref(), Some(":8000"));
        assert_eq!(settings.log, Some(false));
    }

    #[test]
    fn test_display() {
        let settings = ControlServer {
            address: Some(":8000".to_string()),
            log: Some(false),
        };
        assert_eq!(
            settings.to_string(),
            "HTTP control server settings:\n├── Listening address: :8000\n└── Logging: no"
        );
    }
}
