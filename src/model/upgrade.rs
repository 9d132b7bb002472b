use crate::sequence::Step;
use serde::{Deserialize, Serialize};

/// Stands for the project's own version inside a [`VersionRange`]
pub const THIS_VERSION: &str = "%this%";

/// The stock major upgrade element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MajorUpgrade {
    pub allow_downgrades: Option<bool>,
    pub allow_same_version_upgrades: Option<bool>,
    pub downgrade_error_message: Option<String>,
    /// `afterInstallValidate`, `afterInstallInitialize`, ...
    pub schedule: Option<String>,
    pub ignore_remove_failure: Option<bool>,
}

impl MajorUpgrade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downgrade_error_message(mut self, message: impl Into<String>) -> Self {
        self.downgrade_error_message = Some(message.into());
        self
    }

    pub fn allow_same_version_upgrades(mut self) -> Self {
        self.allow_same_version_upgrades = Some(true);
        self
    }
}

/// Version window of related products that are upgraded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionRange {
    pub minimum: Option<String>,
    pub include_minimum: bool,
    pub maximum: Option<String>,
    pub include_maximum: bool,
}

impl Default for VersionRange {
    fn default() -> Self {
        Self {
            minimum: Some("0.0.0.0".to_string()),
            include_minimum: true,
            maximum: Some(THIS_VERSION.to_string()),
            include_maximum: false,
        }
    }
}

/// Explicit upgrade detection with optional downgrade prevention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeStrategy {
    pub versions: VersionRange,
    pub prevent_downgrading: bool,
    pub newer_product_installed_message: String,
    /// Anchor of `RemoveExistingProducts`, always scheduled after it
    pub remove_existing_product_after: Step,
}

impl Default for UpgradeStrategy {
    fn default() -> Self {
        Self {
            versions: VersionRange::default(),
            prevent_downgrading: true,
            newer_product_installed_message: "Newer version already installed".to_string(),
            remove_existing_product_after: Step::install_initialize(),
        }
    }
}

impl UpgradeStrategy {
    pub fn new(versions: VersionRange) -> Self {
        Self {
            versions,
            ..Self::default()
        }
    }

    pub fn allow_downgrades(mut self) -> Self {
        self.prevent_downgrading = false;
        self
    }
}
