use super::Attributes;
use crate::condition::Condition;
use serde::{Deserialize, Serialize};

/// Registry root key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RegistryHive {
    #[serde(rename = "HKLM")]
    #[default]
    LocalMachine,
    #[serde(rename = "HKCU")]
    CurrentUser,
    #[serde(rename = "HKCR")]
    ClassesRoot,
    #[serde(rename = "HKU")]
    Users,
    /// Per-machine or per-user depending on the install scope
    #[serde(rename = "HKMU")]
    MachineOrUser,
}

impl RegistryHive {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryHive::LocalMachine => "HKLM",
            RegistryHive::CurrentUser => "HKCU",
            RegistryHive::ClassesRoot => "HKCR",
            RegistryHive::Users => "HKU",
            RegistryHive::MachineOrUser => "HKMU",
        }
    }

    /// Split `HKLM\Software\Vendor` (or `/`-separated) into hive and key
    pub fn parse_path(path: &str) -> Option<(RegistryHive, String)> {
        let path = path.replace('/', "\\");
        let (root, key) = path.split_once('\\').unwrap_or((path.as_str(), ""));

        let hive = match root.to_uppercase().as_str() {
            "HKLM" | "HKEY_LOCAL_MACHINE" => RegistryHive::LocalMachine,
            "HKCU" | "HKEY_CURRENT_USER" => RegistryHive::CurrentUser,
            "HKCR" | "HKEY_CLASSES_ROOT" => RegistryHive::ClassesRoot,
            "HKU" | "HKEY_USERS" => RegistryHive::Users,
            "HKMU" => RegistryHive::MachineOrUser,
            _ => return None,
        };
        Some((hive, key.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegValueType {
    #[default]
    String,
    Integer,
    Expandable,
    MultiString,
    Binary,
}

impl RegValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegValueType::String => "string",
            RegValueType::Integer => "integer",
            RegValueType::Expandable => "expandable",
            RegValueType::MultiString => "multiString",
            RegValueType::Binary => "binary",
        }
    }
}

/// A registry value written at install time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegValue {
    pub id: Option<String>,
    pub root: RegistryHive,
    pub key: String,
    /// Value name, `None` for the key's default value
    pub name: Option<String>,
    pub value: String,
    pub value_type: RegValueType,
    pub feature: Option<String>,
    pub win64: Option<bool>,
    pub condition: Option<Condition>,
    pub attributes: Attributes,
}

impl RegValue {
    pub fn new(
        root: RegistryHive,
        key: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            root,
            key: key.into(),
            name: if name.is_empty() { None } else { Some(name) },
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn integer(mut self) -> Self {
        self.value_type = RegValueType::Integer;
        self
    }

    pub fn value_type(mut self, value_type: RegValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn win64(mut self, win64: bool) -> Self {
        self.win64 = Some(win64);
        self
    }

    pub fn condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// Initializes a property from the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySearch {
    pub root: RegistryHive,
    pub key: String,
    pub name: Option<String>,
    pub win64: Option<bool>,
}
