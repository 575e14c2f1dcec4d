//! The settings aggregate and the resolution pipeline.
//!
//! Fragments are layered in declared order onto an empty [`Settings`], then
//! defaulted, then validated:
//!
//! ```text
//! Resolver ──fill/override──▶ resolve() ──▶ Resolution ──validate()──▶ Resolved
//!                             (defaults)    (display)                  (immutable)
//! ```
//!
//! Defaulting is only reachable through [`Resolver::resolve`], so every
//! layer is combined before any default applies.

use std::fmt;
use std::ops::Deref;

use tracing::debug;

use crate::control_server::ControlServer;
use crate::error::SettingsError;
use crate::tree::{LineStyle, Node};
use crate::updater::Updater;
use crate::vpn::Vpn;

/// All settings, or a partial fragment of them produced by one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub vpn: Vpn,
    pub control_server: ControlServer,
    pub updater: Updater,
}

impl Settings {
    /// Independent deep copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Fill every field still absent from `other`. Present fields, including
    /// present-empty ones, are left untouched.
    pub fn merge_with(&mut self, other: &Settings) {
        self.vpn.merge_with(&other.vpn);
        self.control_server.merge_with(&other.control_server);
        self.updater.merge_with(&other.updater);
    }

    /// Replace every field `other` has decided. Absent fields of `other`
    /// never erase anything.
    pub fn override_with(&mut self, other: &Settings) {
        self.vpn.override_with(&other.vpn);
        self.control_server.override_with(&other.control_server);
        self.updater.override_with(&other.updater);
    }

    pub(crate) fn set_defaults(&mut self) {
        self.vpn.set_defaults();
        self.control_server.set_defaults();
        self.updater.set_defaults();
    }

    /// Check every invariant, returning the first violation.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.vpn.validate()?;
        self.control_server.validate()?;
        self.updater.validate()
    }

    pub fn to_node(&self) -> Node {
        let mut node = Node::new("Settings summary:");
        node.push(self.vpn.to_node());
        node.push(self.control_server.to_node());
        node.push(self.updater.to_node());
        node
    }

    /// The section header followed by its field lines.
    pub fn to_lines(&self, style: &LineStyle) -> Vec<String> {
        self.to_node().lines(style)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines(&LineStyle::default()).join("\n"))
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// How a layer combines with the layers before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Only fills fields no earlier layer decided.
    Fill,
    /// Replaces every field it decides.
    Override,
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precedence::Fill => write!(f, "fill"),
            Precedence::Override => write!(f, "override"),
        }
    }
}

/// A labelled fragment and how it combines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub label: String,
    pub precedence: Precedence,
    pub fragment: Settings,
}

/// Collects layers in declared order.
///
/// A `fill` layer has lower priority than every layer declared before it;
/// an `override` layer beats them.
#[derive(Debug, Default)]
pub struct Resolver {
    layers: Vec<Layer>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer that only fills fields still absent.
    pub fn fill(self, label: impl Into<String>, fragment: Settings) -> Self {
        self.layer(label, Precedence::Fill, fragment)
    }

    /// Add a layer whose decided fields replace earlier ones.
    pub fn override_with(self, label: impl Into<String>, fragment: Settings) -> Self {
        self.layer(label, Precedence::Override, fragment)
    }

    pub fn layer(
        mut self,
        label: impl Into<String>,
        precedence: Precedence,
        fragment: Settings,
    ) -> Self {
        self.layers.push(Layer {
            label: label.into(),
            precedence,
            fragment,
        });
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Combine every layer, then apply defaults.
    pub fn resolve(self) -> Resolution {
        let mut settings = Settings::default();
        for layer in &self.layers {
            match layer.precedence {
                Precedence::Fill => settings.merge_with(&layer.fragment),
                Precedence::Override => settings.override_with(&layer.fragment),
            }
            debug!(layer = %layer.label, precedence = %layer.precedence, "applied settings layer");
        }

        settings.set_defaults();
        debug!(layers = self.layers.len(), "defaults applied");

        Resolution {
            settings,
            layers: self.layers,
        }
    }
}

/// Combined and defaulted settings awaiting validation.
#[derive(Debug, Clone)]
pub struct Resolution {
    settings: Settings,
    layers: Vec<Layer>,
}

impl Resolution {
    /// The defaulted settings, for display whether or not they are valid.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The layers that were combined, in declared order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn validate(self) -> Result<Resolved, SettingsError> {
        self.settings.validate()?;
        debug!("settings validated");
        Ok(Resolved {
            settings: self.settings,
            layers: self.layers,
        })
    }
}

/// Validated settings. Read-only from here on.
#[derive(Debug, Clone)]
pub struct Resolved {
    settings: Settings,
    layers: Vec<Layer>,
}

impl Resolved {
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

impl Deref for Resolved {
    type Target = Settings;

    fn deref(&self) -> &Settings {
        &self.settings
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.settings, f)
    }
}
