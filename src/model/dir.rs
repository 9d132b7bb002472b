use super::file::File;
use super::sql::SqlDatabase;
use super::{Attributes, ComponentOverrides};
use crate::condition::Condition;
use serde::{Deserialize, Serialize};

/// A directory on the target machine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dir {
    pub id: Option<String>,
    /// Directory name or symbolic folder token (`%ProgramFiles%`)
    pub name: String,
    pub feature: Option<String>,
    pub dirs: Vec<Dir>,
    pub files: Vec<File>,
    pub shortcuts: Vec<Shortcut>,
    pub merge_modules: Vec<MergeModule>,
    pub wildcards: Vec<Files>,
    pub sql_databases: Vec<SqlDatabase>,
    pub attributes: Attributes,
    pub component: ComponentOverrides,
}

/// Anything that can live inside a [`Dir`]
#[derive(Debug, Clone, PartialEq)]
pub enum DirItem {
    Dir(Dir),
    File(File),
    Shortcut(Shortcut),
    MergeModule(MergeModule),
    Files(Files),
    SqlDatabase(SqlDatabase),
}

impl Dir {
    /// Create a directory from a path such as `%ProgramFiles%/My Company/My App`.
    ///
    /// Every path segment becomes a nested `Dir`; `items` go to the
    /// innermost one.
    pub fn new<I>(path: &str, items: I) -> Self
    where
        I: IntoIterator<Item = DirItem>,
    {
        let mut segments: Vec<&str> = path.split(['\\', '/']).filter(|s| !s.is_empty()).collect();
        let leaf_name = segments.pop().unwrap_or_default();

        let mut dir = Dir::named(leaf_name);
        dir.add_items(items);

        while let Some(segment) = segments.pop() {
            let mut parent = Dir::named(segment);
            parent.dirs.push(dir);
            dir = parent;
        }
        dir
    }

    /// A single directory without children
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_items<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = DirItem>,
    {
        for item in items {
            match item {
                DirItem::Dir(d) => self.dirs.push(d),
                DirItem::File(f) => self.files.push(f),
                DirItem::Shortcut(s) => self.shortcuts.push(s),
                DirItem::MergeModule(m) => self.merge_modules.push(m),
                DirItem::Files(w) => self.wildcards.push(w),
                DirItem::SqlDatabase(db) => self.sql_databases.push(db),
            }
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// The innermost directory of a single-child chain
    pub fn leaf_mut(&mut self) -> &mut Dir {
        if self.dirs.len() == 1 && self.has_no_content() {
            return self.dirs[0].leaf_mut();
        }
        self
    }

    /// No files, shortcuts, merge modules, wildcards or databases at this level
    pub fn has_no_content(&self) -> bool {
        self.files.is_empty()
            && self.shortcuts.is_empty()
            && self.merge_modules.is_empty()
            && self.wildcards.is_empty()
            && self.sql_databases.is_empty()
    }

    /// Nothing installable at all, not even sub-directories
    pub fn is_empty(&self) -> bool {
        self.has_no_content() && self.dirs.is_empty()
    }
}

impl From<Dir> for DirItem {
    fn from(d: Dir) -> Self {
        DirItem::Dir(d)
    }
}

impl From<File> for DirItem {
    fn from(f: File) -> Self {
        DirItem::File(f)
    }
}

impl From<Shortcut> for DirItem {
    fn from(s: Shortcut) -> Self {
        DirItem::Shortcut(s)
    }
}

impl From<MergeModule> for DirItem {
    fn from(m: MergeModule) -> Self {
        DirItem::MergeModule(m)
    }
}

impl From<Files> for DirItem {
    fn from(w: Files) -> Self {
        DirItem::Files(w)
    }
}

impl From<SqlDatabase> for DirItem {
    fn from(db: SqlDatabase) -> Self {
        DirItem::SqlDatabase(db)
    }
}

/// A shortcut, owned either by a [`File`] or by a [`Dir`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shortcut {
    pub id: Option<String>,
    pub name: String,
    /// Target command, required for directory-owned shortcuts
    pub target: Option<String>,
    /// Directory path the shortcut is created in (file-owned shortcuts)
    pub location: Option<String>,
    pub arguments: Option<String>,
    pub working_directory: Option<String>,
    pub description: Option<String>,
    pub icon_file: Option<String>,
    pub icon_index: Option<i32>,
    /// Advertised shortcuts are only valid on files
    pub advertise: bool,
    pub feature: Option<String>,
    pub condition: Option<Condition>,
    pub attributes: Attributes,
}

impl Shortcut {
    /// A file-owned shortcut created in `location`
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Some(location.into()),
            ..Self::default()
        }
    }

    /// A directory-owned shortcut pointing at `target`
    pub fn to_target(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn arguments(mut self, args: impl Into<String>) -> Self {
        self.arguments = Some(args.into());
        self
    }

    pub fn working_directory(mut self, dir_id: impl Into<String>) -> Self {
        self.working_directory = Some(dir_id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn icon(mut self, path: impl Into<String>) -> Self {
        self.icon_file = Some(path.into());
        self
    }

    pub fn icon_index(mut self, index: i32) -> Self {
        self.icon_index = Some(index);
        self
    }

    pub fn advertise(mut self) -> Self {
        self.advertise = true;
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
}

/// A merge module (.msm) merged into its directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeModule {
    pub id: Option<String>,
    /// Path of the .msm file
    pub source: String,
    pub feature: Option<String>,
    pub file_compression: Option<bool>,
    pub attributes: Attributes,
}

impl MergeModule {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }
}

/// Wildcard file set expanded against the file system at compile time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Files {
    /// Pattern such as `bin/Release/*.*`, relative to the source base dir
    pub pattern: String,
    /// Include sub-directories as nested `Dir`s
    pub recursive: bool,
    /// Glob patterns (matched against file names and relative paths) to skip
    pub exclude: Vec<String>,
    pub feature: Option<String>,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            recursive: true,
            exclude: Vec::new(),
            feature: None,
        }
    }
}

impl Files {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn non_recursive(mut self) -> Self {
        self.recursive = false;
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_becomes_nested_chain() {
        let dir = Dir::new(
            r"%ProgramFiles%\My Company/My Product",
            [File::new("readme.txt", []).into()],
        );
        assert_eq!(dir.name, "%ProgramFiles%");
        assert_eq!(dir.dirs[0].name, "My Company");
        assert_eq!(dir.dirs[0].dirs[0].name, "My Product");
        assert_eq!(dir.dirs[0].dirs[0].files.len(), 1);
        assert!(dir.files.is_empty());
    }

    #[test]
    fn test_items_are_bucketed() {
        let dir = Dir::new(
            "App",
            [
                File::new("a.exe", []).into(),
                Dir::named("Sub").into(),
                Shortcut::to_target("App", "[INSTALLDIR]a.exe").into(),
                MergeModule::new("crt.msm").into(),
                Files::new("bin/*.*").into(),
            ],
        );
        assert_eq!(dir.files.len(), 1);
        assert_eq!(dir.dirs.len(), 1);
        assert_eq!(dir.shortcuts.len(), 1);
        assert_eq!(dir.merge_modules.len(), 1);
        assert_eq!(dir.wildcards.len(), 1);
    }

    #[test]
    fn test_leaf_of_chain() {
        let mut dir = Dir::new("A/B/C", []);
        assert_eq!(dir.leaf_mut().name, "C");
        assert!(dir.leaf_mut().is_empty());
    }
}
