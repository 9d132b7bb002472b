//! Installer condition expressions

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A boolean expression in the installer's condition syntax.
///
/// The text is emitted verbatim; nothing is parsed or substituted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(Cow<'static, str>);

impl Condition {
    /// Always true
    pub const ALWAYS: Condition = Condition(Cow::Borrowed("1"));
    /// The product is already installed
    pub const INSTALLED: Condition = Condition(Cow::Borrowed("Installed"));
    /// The product is not installed yet
    pub const NOT_INSTALLED: Condition = Condition(Cow::Borrowed("NOT Installed"));
    /// The product is being uninstalled
    pub const BEING_REMOVED: Condition = Condition(Cow::Borrowed("REMOVE=\"ALL\""));
    pub const NOT_BEING_REMOVED: Condition = Condition(Cow::Borrowed("NOT (REMOVE=\"ALL\")"));
    /// No condition
    pub const NONE: Condition = Condition(Cow::Borrowed(""));

    pub fn new(expression: impl Into<String>) -> Self {
        Condition(Cow::Owned(expression.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn and(&self, other: &Condition) -> Condition {
        Condition::new(format!("({}) AND ({})", self.0, other.0))
    }

    pub fn or(&self, other: &Condition) -> Condition {
        Condition::new(format!("({}) OR ({})", self.0, other.0))
    }

    pub fn not(&self) -> Condition {
        Condition::new(format!("NOT ({})", self.0))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Condition {
    fn from(s: &str) -> Self {
        Condition::new(s)
    }
}

impl From<String> for Condition {
    fn from(s: String) -> Self {
        Condition::new(s)
    }
}
