//! VPN service providers and their per-provider rules.
//!
//! Which OpenVPN fields a provider requires, whether it supports WireGuard
//! and which context-specific defaults apply are all looked up in
//! [`RULES`]. Validators and defaulting code never branch on a provider
//! directly.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex_lite::Regex;

/// A VPN service provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    Airvpn,
    Custom,
    Cyberghost,
    Expressvpn,
    Fastestvpn,
    Giganews,
    HideMyAss,
    Ipvanish,
    Ivpn,
    Mullvad,
    Nordvpn,
    PerfectPrivacy,
    Privado,
    PrivateInternetAccess,
    Privatevpn,
    Protonvpn,
    Purevpn,
    Slickvpn,
    Surfshark,
    Torguard,
    VpnSecure,
    VpnUnlimited,
    Vyprvpn,
    Wevpn,
    Windscribe,
}

impl Provider {
    /// Every provider, in name order.
    pub const ALL: [Provider; 25] = [
        Provider::Airvpn,
        Provider::Custom,
        Provider::Cyberghost,
        Provider::Expressvpn,
        Provider::Fastestvpn,
        Provider::Giganews,
        Provider::HideMyAss,
        Provider::Ipvanish,
        Provider::Ivpn,
        Provider::Mullvad,
        Provider::Nordvpn,
        Provider::PerfectPrivacy,
        Provider::Privado,
        Provider::PrivateInternetAccess,
        Provider::Privatevpn,
        Provider::Protonvpn,
        Provider::Purevpn,
        Provider::Slickvpn,
        Provider::Surfshark,
        Provider::Torguard,
        Provider::VpnSecure,
        Provider::VpnUnlimited,
        Provider::Vyprvpn,
        Provider::Wevpn,
        Provider::Windscribe,
    ];

    /// The provider's name as used in environment variables and output.
    pub fn name(self) -> &'static str {
        match self {
            Provider::Airvpn => "airvpn",
            Provider::Custom => "custom",
            Provider::Cyberghost => "cyberghost",
            Provider::Expressvpn => "expressvpn",
            Provider::Fastestvpn => "fastestvpn",
            Provider::Giganews => "giganews",
            Provider::HideMyAss => "hidemyass",
            Provider::Ipvanish => "ipvanish",
            Provider::Ivpn => "ivpn",
            Provider::Mullvad => "mullvad",
            Provider::Nordvpn => "nordvpn",
            Provider::PerfectPrivacy => "perfect privacy",
            Provider::Privado => "privado",
            Provider::PrivateInternetAccess => "private internet access",
            Provider::Privatevpn => "privatevpn",
            Provider::Protonvpn => "protonvpn",
            Provider::Purevpn => "purevpn",
            Provider::Slickvpn => "slickvpn",
            Provider::Surfshark => "surfshark",
            Provider::Torguard => "torguard",
            Provider::VpnSecure => "vpnsecure",
            Provider::VpnUnlimited => "vpn unlimited",
            Provider::Vyprvpn => "vyprvpn",
            Provider::Wevpn => "wevpn",
            Provider::Windscribe => "windscribe",
        }
    }

    /// The rules row for this provider.
    pub fn rules(self) -> &'static ProviderRules {
        RULES
            .iter()
            .find(|rules| rules.provider == Some(self))
            .unwrap_or(&DEFAULT_RULES)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error parsing a provider name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("VPN service provider is not valid: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Provider::ALL
            .iter()
            .copied()
            .find(|provider| provider.name() == wanted)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}

/// Whether an OpenVPN blob must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

impl Requirement {
    pub fn is_required(self) -> bool {
        self == Requirement::Required
    }
}

/// OpenVPN username/password requirement.
#[derive(Clone, Copy)]
pub enum Credentials {
    /// Both user and password must be non-empty.
    Required,
    /// Neither is required.
    NotRequired,
    /// The user is required; the password is waived when the predicate
    /// accepts the user.
    PasswordWaived(fn(&str) -> bool),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Required => write!(f, "Required"),
            Credentials::NotRequired => write!(f, "NotRequired"),
            Credentials::PasswordWaived(_) => write!(f, "PasswordWaived"),
        }
    }
}

impl Credentials {
    pub fn user_required(self) -> bool {
        !matches!(self, Credentials::NotRequired)
    }

    pub fn password_required(self, user: &str) -> bool {
        match self {
            Credentials::Required => true,
            Credentials::NotRequired => false,
            Credentials::PasswordWaived(waived) => !waived(user),
        }
    }
}

/// One row of the provider rule table.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRules {
    /// `None` only for [`DEFAULT_RULES`].
    pub provider: Option<Provider>,
    pub credentials: Credentials,
    pub client_certificate: Requirement,
    pub client_key: Requirement,
    pub encrypted_key: Requirement,
    /// The connection comes from a user-supplied OpenVPN file.
    pub custom_config: bool,
    pub wireguard: bool,
    pub default_password: Option<&'static str>,
    pub default_encryption_preset: Option<&'static str>,
}

/// Rules for any provider without its own row.
pub const DEFAULT_RULES: ProviderRules = ProviderRules {
    provider: None,
    credentials: Credentials::Required,
    client_certificate: Requirement::Optional,
    client_key: Requirement::Optional,
    encrypted_key: Requirement::Optional,
    custom_config: false,
    wireguard: false,
    default_password: None,
    default_encryption_preset: None,
};

const fn row(provider: Provider) -> ProviderRules {
    ProviderRules {
        provider: Some(provider),
        ..DEFAULT_RULES
    }
}

/// Providers whose rules differ from [`DEFAULT_RULES`].
pub static RULES: &[ProviderRules] = &[
    ProviderRules {
        credentials: Credentials::NotRequired,
        client_certificate: Requirement::Required,
        client_key: Requirement::Required,
        wireguard: true,
        ..row(Provider::Airvpn)
    },
    ProviderRules {
        credentials: Credentials::NotRequired,
        custom_config: true,
        wireguard: true,
        ..row(Provider::Custom)
    },
    ProviderRules {
        client_certificate: Requirement::Required,
        client_key: Requirement::Required,
        ..row(Provider::Cyberghost)
    },
    ProviderRules {
        wireguard: true,
        ..row(Provider::Fastestvpn)
    },
    ProviderRules {
        credentials: Credentials::PasswordWaived(is_ivpn_account_id),
        wireguard: true,
        ..row(Provider::Ivpn)
    },
    ProviderRules {
        wireguard: true,
        default_password: Some("m"),
        ..row(Provider::Mullvad)
    },
    ProviderRules {
        wireguard: true,
        ..row(Provider::Nordvpn)
    },
    ProviderRules {
        default_encryption_preset: Some(ENCRYPTION_PRESET_STRONG),
        ..row(Provider::PrivateInternetAccess)
    },
    ProviderRules {
        wireguard: true,
        ..row(Provider::Protonvpn)
    },
    ProviderRules {
        wireguard: true,
        ..row(Provider::Surfshark)
    },
    ProviderRules {
        credentials: Credentials::NotRequired,
        client_certificate: Requirement::Required,
        encrypted_key: Requirement::Required,
        ..row(Provider::VpnSecure)
    },
    ProviderRules {
        client_certificate: Requirement::Required,
        client_key: Requirement::Required,
        ..row(Provider::VpnUnlimited)
    },
    ProviderRules {
        client_key: Requirement::Required,
        ..row(Provider::Wevpn)
    },
    ProviderRules {
        wireguard: true,
        ..row(Provider::Windscribe)
    },
];

pub const ENCRYPTION_PRESET_NONE: &str = "none";
pub const ENCRYPTION_PRESET_NORMAL: &str = "normal";
pub const ENCRYPTION_PRESET_STRONG: &str = "strong";

/// Accepted Private Internet Access encryption presets.
pub const ENCRYPTION_PRESETS: &[&str] = &[
    ENCRYPTION_PRESET_NONE,
    ENCRYPTION_PRESET_NORMAL,
    ENCRYPTION_PRESET_STRONG,
];

/// IVPN account IDs (`i-XXXX-XXXX-XXXX`) authenticate without a password.
pub fn is_ivpn_account_id(user: &str) -> bool {
    static ACCOUNT_ID: OnceLock<Regex> = OnceLock::new();
    ACCOUNT_ID
        .get_or_init(|| {
            Regex::new(r"^(i|ivpn)\-[a-zA-Z0-9]{4}\-[a-zA-Z0-9]{4}\-[a-zA-Z0-9]{4}$")
                .expect("IVPN account ID pattern compiles")
        })
        .is_match(user)
}
