use super::dir::Shortcut;
use super::iis::IisVirtualDir;
use super::service::ServiceInstaller;
use super::{Attributes, ComponentOverrides};
use crate::condition::Condition;
use serde::{Deserialize, Serialize};

/// A file installed into its parent [`Dir`](super::Dir)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    pub id: Option<String>,
    /// Source path on the build machine
    pub name: String,
    pub feature: Option<String>,
    pub condition: Option<Condition>,
    pub vital: Option<bool>,
    pub read_only: Option<bool>,
    pub hidden: Option<bool>,
    pub shortcuts: Vec<Shortcut>,
    pub associations: Vec<FileAssociation>,
    pub virtual_dirs: Vec<IisVirtualDir>,
    pub services: Vec<ServiceInstaller>,
    pub permissions: Vec<FilePermission>,
    pub attributes: Attributes,
    pub component: ComponentOverrides,
}

/// Anything that can be attached to a [`File`]
#[derive(Debug, Clone, PartialEq)]
pub enum FileItem {
    Shortcut(Shortcut),
    Association(FileAssociation),
    VirtualDir(IisVirtualDir),
    Service(ServiceInstaller),
    Permission(FilePermission),
}

impl File {
    pub fn new<I>(source: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = FileItem>,
    {
        let mut file = Self {
            name: source.into(),
            ..Self::default()
        };
        for item in items {
            match item {
                FileItem::Shortcut(s) => file.shortcuts.push(s),
                FileItem::Association(a) => file.associations.push(a),
                FileItem::VirtualDir(v) => file.virtual_dirs.push(v),
                FileItem::Service(s) => file.services.push(s),
                FileItem::Permission(p) => file.permissions.push(p),
            }
        }
        file
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn vital(mut self, vital: bool) -> Self {
        self.vital = Some(vital);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn component(mut self, overrides: ComponentOverrides) -> Self {
        self.component = overrides;
        self
    }

    /// File name without its directory
    pub fn file_name(&self) -> &str {
        self.name
            .rsplit(['\\', '/'])
            .find(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }
}

impl From<Shortcut> for FileItem {
    fn from(s: Shortcut) -> Self {
        FileItem::Shortcut(s)
    }
}

impl From<FileAssociation> for FileItem {
    fn from(a: FileAssociation) -> Self {
        FileItem::Association(a)
    }
}

impl From<IisVirtualDir> for FileItem {
    fn from(v: IisVirtualDir) -> Self {
        FileItem::VirtualDir(v)
    }
}

impl From<ServiceInstaller> for FileItem {
    fn from(s: ServiceInstaller) -> Self {
        FileItem::Service(s)
    }
}

impl From<FilePermission> for FileItem {
    fn from(p: FilePermission) -> Self {
        FileItem::Permission(p)
    }
}

/// Registers the file as the handler of a file extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAssociation {
    /// Extension without the leading dot
    pub extension: String,
    pub content_type: Option<String>,
    pub prog_id: Option<String>,
    pub description: Option<String>,
    /// Verb name, `open` by default
    pub command: String,
    pub arguments: String,
    pub icon: Option<String>,
    pub advertise: bool,
}

impl Default for FileAssociation {
    fn default() -> Self {
        Self {
            extension: String::new(),
            content_type: None,
            prog_id: None,
            description: None,
            command: "open".to_string(),
            arguments: "\"%1\"".to_string(),
            icon: None,
            advertise: false,
        }
    }
}

impl FileAssociation {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into().trim_start_matches('.').to_string(),
            ..Self::default()
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn command(mut self, verb: impl Into<String>, arguments: impl Into<String>) -> Self {
        self.command = verb.into();
        self.arguments = arguments.into();
        self
    }

    pub fn icon(mut self, path: impl Into<String>) -> Self {
        self.icon = Some(path.into());
        self
    }

    pub fn advertise(mut self) -> Self {
        self.advertise = true;
        self
    }

    /// ProgId used when none is given
    pub fn prog_id_or_default(&self) -> String {
        self.prog_id
            .clone()
            .unwrap_or_else(|| format!("{}.file", self.extension))
    }
}

/// Access rights granted on an installed file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePermission {
    pub user: String,
    pub domain: Option<String>,
    pub generic_all: Option<bool>,
    pub generic_read: Option<bool>,
    pub generic_write: Option<bool>,
    pub generic_execute: Option<bool>,
    pub read: Option<bool>,
    pub delete: Option<bool>,
    pub change_permission: Option<bool>,
    pub take_ownership: Option<bool>,
}

impl FilePermission {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn generic_all(mut self, allow: bool) -> Self {
        self.generic_all = Some(allow);
        self
    }

    pub fn generic_read(mut self, allow: bool) -> Self {
        self.generic_read = Some(allow);
        self
    }

    pub fn generic_write(mut self, allow: bool) -> Self {
        self.generic_write = Some(allow);
        self
    }
}
