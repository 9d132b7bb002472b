//! Declarative project graph
//!
//! Plain data describing the desired installed state. Children are passed
//! to the composite constructors as closed item enums ([`ProjectItem`],
//! [`DirItem`], [`FileItem`]) and bucketed by variant.

mod action;
mod dir;
mod feature;
mod file;
mod iis;
mod project;
mod registry;
mod service;
mod sql;
mod upgrade;

pub use action::{Action, ActionKind, ManagedAction};
pub use dir::{Dir, DirItem, Files, MergeModule, Shortcut};
pub use feature::{Feature, FeatureCondition, FeatureDisplay};
pub use file::{File, FileAssociation, FileItem, FilePermission};
pub use iis::{IisVirtualDir, WebAddress, WebDirProperties, WebSite};
pub use project::{
    language_code, Binary, ControlPanelInfo, InstallScope, Media, Platform, Project, ProjectItem,
    Property, UiRef, LANGUAGES,
};
pub use registry::{RegValue, RegValueType, RegistryHive, RegistrySearch};
pub use service::{FailureAction, ServiceInstaller, SvcErrorControl, SvcEvent, SvcEventType, SvcStartType};
pub use sql::{SqlDatabase, SqlExecution, SqlScript, SqlString};
pub use upgrade::{MajorUpgrade, UpgradeStrategy, VersionRange, THIS_VERSION};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extra output attributes for an entity's primary element
pub type Attributes = BTreeMap<String, String>;

/// Settings applied to the component that wraps an entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentOverrides {
    pub permanent: Option<bool>,
    pub never_overwrite: Option<bool>,
    pub shared_dll_ref_count: Option<bool>,
    pub transitive: Option<bool>,
    /// Any other component attribute
    pub extra: Attributes,
}

impl ComponentOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
