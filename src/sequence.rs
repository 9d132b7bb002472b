//! Sequence tables and scheduling of custom actions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, BitOr};
use std::str::FromStr;

/// One or more installer sequence tables.
///
/// Combine with `+` or `|`; the textual form joins the table names with
/// `|` in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sequence(u8);

const TABLES: &[(u8, &str)] = &[
    (1, "InstallUISequence"),
    (2, "InstallExecuteSequence"),
    (4, "AdminUISequence"),
    (8, "AdminExecuteSequence"),
    (16, "AdvertiseExecuteSequence"),
];

impl Sequence {
    pub const INSTALL_UI_SEQUENCE: Sequence = Sequence(1);
    pub const INSTALL_EXECUTE_SEQUENCE: Sequence = Sequence(2);
    pub const ADMIN_UI_SEQUENCE: Sequence = Sequence(4);
    pub const ADMIN_EXECUTE_SEQUENCE: Sequence = Sequence(8);
    pub const ADVERTISE_EXECUTE_SEQUENCE: Sequence = Sequence(16);
    /// Declared but never scheduled
    pub const NOT_IN_SEQUENCE: Sequence = Sequence(0);

    /// Table names in emission order
    pub fn tables(&self) -> impl Iterator<Item = &'static str> + '_ {
        TABLES
            .iter()
            .filter(move |(bit, _)| self.0 & bit != 0)
            .map(|(_, name)| *name)
    }

    pub fn contains(&self, other: Sequence) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Sequence::INSTALL_EXECUTE_SEQUENCE
    }
}

impl Add for Sequence {
    type Output = Sequence;
    fn add(self, rhs: Sequence) -> Sequence {
        Sequence(self.0 | rhs.0)
    }
}

impl BitOr for Sequence {
    type Output = Sequence;
    fn bitor(self, rhs: Sequence) -> Sequence {
        Sequence(self.0 | rhs.0)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NotInSequence");
        }
        let names: Vec<_> = self.tables().collect();
        f.write_str(&names.join("|"))
    }
}

impl FromStr for Sequence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = 0;
        for part in s.split(['|', '+']).map(str::trim).filter(|p| !p.is_empty()) {
            if part == "NotInSequence" {
                continue;
            }
            let (bit, _) = TABLES
                .iter()
                .find(|(_, name)| *name == part)
                .ok_or_else(|| format!("unknown sequence table '{}'", part))?;
            bits |= bit;
        }
        Ok(Sequence(bits))
    }
}

impl TryFrom<String> for Sequence {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Sequence> for String {
    fn from(s: Sequence) -> String {
        s.to_string()
    }
}

/// Position relative to the anchor step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum When {
    Before,
    #[default]
    After,
}

impl When {
    pub fn as_str(&self) -> &'static str {
        match self {
            When::Before => "Before",
            When::After => "After",
        }
    }
}

/// Anchor action a custom action is scheduled against
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Step {
    /// A standard or custom action by name
    Named(String),
    /// The action declared just before this one
    PreviousAction,
    /// The previous action, or `InstallFinalize` for the first action
    PreviousActionOrInstallFinalize,
    /// The previous action, or `InstallInitialize` for the first action
    PreviousActionOrInstallInitialize,
}

impl Step {
    pub fn named(name: impl Into<String>) -> Self {
        Step::Named(name.into())
    }

    pub fn install_files() -> Self {
        Step::named("InstallFiles")
    }

    pub fn install_initialize() -> Self {
        Step::named("InstallInitialize")
    }

    pub fn install_finalize() -> Self {
        Step::named("InstallFinalize")
    }

    pub fn install_execute() -> Self {
        Step::named("InstallExecute")
    }

    pub fn launch_conditions() -> Self {
        Step::named("LaunchConditions")
    }

    pub fn find_related_products() -> Self {
        Step::named("FindRelatedProducts")
    }

    pub fn remove_files() -> Self {
        Step::named("RemoveFiles")
    }

    /// Resolve the anchor against the running "previous action" cursor
    pub fn resolve<'a>(&'a self, previous: Option<&'a str>) -> Option<&'a str> {
        match self {
            Step::Named(name) => Some(name.as_str()),
            Step::PreviousAction => previous,
            Step::PreviousActionOrInstallFinalize => Some(previous.unwrap_or("InstallFinalize")),
            Step::PreviousActionOrInstallInitialize => {
                Some(previous.unwrap_or("InstallInitialize"))
            }
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Step::install_files()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Named(name) => f.write_str(name),
            Step::PreviousAction => f.write_str("PreviousAction"),
            Step::PreviousActionOrInstallFinalize => f.write_str("PreviousActionOrInstallFinalize"),
            Step::PreviousActionOrInstallInitialize => {
                f.write_str("PreviousActionOrInstallInitialize")
            }
        }
    }
}

impl TryFrom<String> for Step {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ok(match s.as_str() {
            "" => return Err("empty step".to_string()),
            "PreviousAction" => Step::PreviousAction,
            "PreviousActionOrInstallFinalize" => Step::PreviousActionOrInstallFinalize,
            "PreviousActionOrInstallInitialize" => Step::PreviousActionOrInstallInitialize,
            _ => Step::Named(s),
        })
    }
}

impl From<Step> for String {
    fn from(s: Step) -> String {
        s.to_string()
    }
}

/// How the installer waits for a custom action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReturnType {
    #[default]
    Check,
    Ignore,
    AsyncWait,
    AsyncNoWait,
}

impl ReturnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnType::Check => "check",
            ReturnType::Ignore => "ignore",
            ReturnType::AsyncWait => "asyncWait",
            ReturnType::AsyncNoWait => "asyncNoWait",
        }
    }
}

/// Execution scheduling of a custom action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Execute {
    #[default]
    Immediate,
    Deferred,
    Rollback,
    Commit,
    OncePerProcess,
    FirstSequence,
    SecondSequence,
}

impl Execute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Execute::Immediate => "immediate",
            Execute::Deferred => "deferred",
            Execute::Rollback => "rollback",
            Execute::Commit => "commit",
            Execute::OncePerProcess => "oncePerProcess",
            Execute::FirstSequence => "firstSequence",
            Execute::SecondSequence => "secondSequence",
        }
    }

    /// Runs in the elevated script phase
    pub fn is_deferred(&self) -> bool {
        matches!(self, Execute::Deferred | Execute::Rollback | Execute::Commit)
    }
}
