//! Network interface name grammar shared by both tunnel protocols.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Accepted interface names.
pub const INTERFACE_NAME_PATTERN: &str = r"^[a-zA-Z0-9_]+$";

pub fn is_valid_interface_name(name: &str) -> bool {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(INTERFACE_NAME_PATTERN).expect("interface name pattern compiles"))
        .is_match(name)
}
