use super::action::Action;
use super::dir::Dir;
use super::feature::Feature;
use super::registry::{RegValue, RegistrySearch};
use super::upgrade::{MajorUpgrade, UpgradeStrategy};
use super::Attributes;
use crate::compiler::CompileOptions;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Culture names accepted for `Project::language`
pub const LANGUAGES: &[(&str, u32)] = &[
    ("en-US", 1033),
    ("de-DE", 1031),
    ("fr-FR", 1036),
    ("es-ES", 3082),
    ("it-IT", 1040),
    ("ja-JP", 1041),
    ("ko-KR", 1042),
    ("nl-NL", 1043),
    ("pt-BR", 1046),
    ("ru-RU", 1049),
    ("sv-SE", 1053),
    ("zh-CN", 2052),
    ("zh-TW", 1028),
];

/// LCID of a culture name, case-insensitive
pub fn language_code(culture: &str) -> Option<u32> {
    LANGUAGES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(culture))
        .map(|(_, lcid)| *lcid)
}

/// Root of the declarative graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub version: String,
    pub manufacturer: String,
    pub description: Option<String>,
    /// Install identity; derived from the name when unset
    pub guid: Option<Uuid>,
    /// Derived from `guid` when unset
    pub upgrade_code: Option<Uuid>,
    /// Derived from `guid` and `version` when unset
    pub product_id: Option<Uuid>,
    /// Culture name such as `en-US`
    pub language: String,
    pub codepage: u32,
    pub platform: Platform,
    pub scope: InstallScope,
    pub installer_version: u32,
    pub media: Media,
    pub dirs: Vec<Dir>,
    pub actions: Vec<Action>,
    pub reg_values: Vec<RegValue>,
    pub properties: Vec<Property>,
    pub binaries: Vec<Binary>,
    pub features: Vec<Feature>,
    pub major_upgrade: Option<MajorUpgrade>,
    pub upgrade_strategy: Option<UpgradeStrategy>,
    pub control_panel: ControlPanelInfo,
    pub ui: Option<UiRef>,
    /// RTF licence shown by the stock dialogs
    pub licence_file: Option<String>,
    /// Extension assemblies passed to the toolchain in addition to the
    /// detected ones
    pub wix_extensions: Vec<String>,
    /// Base of relative file sources and wildcard patterns
    pub source_base_dir: Option<PathBuf>,
    /// File name of the package without extension; the project name by default
    pub output_name: Option<String>,
    pub options: CompileOptions,
    /// Extra attributes for the `Product` element
    pub attributes: Attributes,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: "1.0.0.0".to_string(),
            manufacturer: String::new(),
            description: None,
            guid: None,
            upgrade_code: None,
            product_id: None,
            language: "en-US".to_string(),
            codepage: 1252,
            platform: Platform::default(),
            scope: InstallScope::default(),
            installer_version: 200,
            media: Media::default(),
            dirs: Vec::new(),
            actions: Vec::new(),
            reg_values: Vec::new(),
            properties: Vec::new(),
            binaries: Vec::new(),
            features: Vec::new(),
            major_upgrade: None,
            upgrade_strategy: None,
            control_panel: ControlPanelInfo::default(),
            ui: None,
            licence_file: None,
            wix_extensions: Vec::new(),
            source_base_dir: None,
            output_name: None,
            options: CompileOptions::default(),
            attributes: Attributes::new(),
        }
    }
}

/// Anything that can be passed to [`Project::with_items`]
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectItem {
    Dir(Dir),
    Action(Action),
    RegValue(RegValue),
    Property(Property),
    Binary(Binary),
    Feature(Feature),
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a project and bucket `items` by kind
    pub fn with_items<I>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = ProjectItem>,
    {
        let mut project = Self::new(name);
        project.add_items(items);
        project
    }

    pub fn add_items<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = ProjectItem>,
    {
        for item in items {
            match item {
                ProjectItem::Dir(d) => self.dirs.push(d),
                ProjectItem::Action(a) => self.actions.push(a),
                ProjectItem::RegValue(r) => self.reg_values.push(r),
                ProjectItem::Property(p) => self.properties.push(p),
                ProjectItem::Binary(b) => self.binaries.push(b),
                ProjectItem::Feature(f) => self.features.push(f),
            }
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse from a YAML or JSON file; relative sources resolve against
    /// the file's directory unless `source_base_dir` is set
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut project: Project = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => Self::from_yaml(&content)?,
        };
        if project.source_base_dir.is_none() {
            project.source_base_dir = path.parent().map(Path::to_path_buf);
        }
        Ok(project)
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn guid(mut self, guid: Uuid) -> Self {
        self.guid = Some(guid);
        self
    }

    pub fn upgrade_code(mut self, code: Uuid) -> Self {
        self.upgrade_code = Some(code);
        self
    }

    pub fn language(mut self, culture: impl Into<String>) -> Self {
        self.language = culture.into();
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn scope(mut self, scope: InstallScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn major_upgrade(mut self, upgrade: MajorUpgrade) -> Self {
        self.major_upgrade = Some(upgrade);
        self
    }

    pub fn upgrade_strategy(mut self, strategy: UpgradeStrategy) -> Self {
        self.upgrade_strategy = Some(strategy);
        self
    }

    pub fn ui(mut self, ui: UiRef) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn licence_file(mut self, path: impl Into<String>) -> Self {
        self.licence_file = Some(path.into());
        self
    }

    pub fn control_panel(mut self, info: ControlPanelInfo) -> Self {
        self.control_panel = info;
        self
    }

    pub fn source_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_base_dir = Some(dir.into());
        self
    }

    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn resolved_guid(&self) -> Uuid {
        self.guid
            .unwrap_or_else(|| Uuid::new_v5(&Uuid::NAMESPACE_OID, self.name.as_bytes()))
    }

    pub fn resolved_upgrade_code(&self) -> Uuid {
        self.upgrade_code.unwrap_or_else(|| self.resolved_guid())
    }

    /// Stable for one version, different for the next
    pub fn resolved_product_id(&self) -> Uuid {
        self.product_id
            .unwrap_or_else(|| Uuid::new_v5(&self.resolved_guid(), self.version.as_bytes()))
    }

    pub fn output_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(&self.name)
    }

    /// Resolve a source path against `source_base_dir`
    pub fn source_path(&self, source: &str) -> PathBuf {
        let path = PathBuf::from(source);
        match &self.source_base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }

    pub fn is_win64(&self) -> bool {
        self.platform == Platform::X64
    }
}

impl From<Dir> for ProjectItem {
    fn from(d: Dir) -> Self {
        ProjectItem::Dir(d)
    }
}

impl From<Action> for ProjectItem {
    fn from(a: Action) -> Self {
        ProjectItem::Action(a)
    }
}

impl From<RegValue> for ProjectItem {
    fn from(r: RegValue) -> Self {
        ProjectItem::RegValue(r)
    }
}

impl From<Property> for ProjectItem {
    fn from(p: Property) -> Self {
        ProjectItem::Property(p)
    }
}

impl From<Binary> for ProjectItem {
    fn from(b: Binary) -> Self {
        ProjectItem::Binary(b)
    }
}

impl From<Feature> for ProjectItem {
    fn from(f: Feature) -> Self {
        ProjectItem::Feature(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    X86,
    X64,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::X86 => "x86",
            Platform::X64 => "x64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstallScope {
    #[default]
    PerMachine,
    PerUser,
}

impl InstallScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallScope::PerMachine => "perMachine",
            InstallScope::PerUser => "perUser",
        }
    }
}

/// Cabinet layout of the package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Media {
    pub id: u32,
    pub cabinet: String,
    pub embed_cab: bool,
    /// `none`, `low`, `medium`, `high` or `mszip`
    pub compression_level: Option<String>,
}

impl Default for Media {
    fn default() -> Self {
        Self {
            id: 1,
            cabinet: "Cabs.cab".to_string(),
            embed_cab: true,
            compression_level: None,
        }
    }
}

/// An installer property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Property {
    pub name: String,
    pub value: Option<String>,
    /// Keep the value out of the install log
    pub hidden: Option<bool>,
    /// Pass the value from the UI to the execute sequence
    pub secure: Option<bool>,
    pub admin: Option<bool>,
    pub registry_search: Option<RegistrySearch>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// A property initialized from the registry at install time
    pub fn from_registry(name: impl Into<String>, search: RegistrySearch) -> Self {
        Self {
            name: name.into(),
            registry_search: Some(search),
            ..Self::default()
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = Some(true);
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = Some(true);
        self
    }
}

/// A file stored in the package's `Binary` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Binary {
    pub id: Option<String>,
    pub source: String,
}

impl Binary {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Add/Remove Programs entry details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPanelInfo {
    pub comments: Option<String>,
    pub contact: Option<String>,
    pub help_link: Option<String>,
    pub help_telephone: Option<String>,
    pub url_info_about: Option<String>,
    pub url_update_info: Option<String>,
    pub readme: Option<String>,
    /// Icon file shown next to the entry
    pub product_icon: Option<String>,
    pub no_modify: bool,
    pub no_repair: bool,
    pub no_remove: bool,
}

impl ControlPanelInfo {
    /// `(property, value)` pairs for every set field, excluding the icon
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        let mut props = Vec::new();
        let text = [
            ("ARPCOMMENTS", &self.comments),
            ("ARPCONTACT", &self.contact),
            ("ARPHELPLINK", &self.help_link),
            ("ARPHELPTELEPHONE", &self.help_telephone),
            ("ARPURLINFOABOUT", &self.url_info_about),
            ("ARPURLUPDATEINFO", &self.url_update_info),
            ("ARPREADME", &self.readme),
        ];
        for (name, value) in text {
            if let Some(value) = value {
                props.push((name, value.clone()));
            }
        }
        for (name, set) in [
            ("ARPNOMODIFY", self.no_modify),
            ("ARPNOREPAIR", self.no_repair),
            ("ARPNOREMOVE", self.no_remove),
        ] {
            if set {
                props.push((name, "1".to_string()));
            }
        }
        props
    }
}

/// Stock dialog sets from WixUIExtension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiRef {
    Minimal,
    InstallDir,
    FeatureTree,
    Mondo,
    Advanced,
}

impl UiRef {
    pub fn id(&self) -> &'static str {
        match self {
            UiRef::Minimal => "WixUI_Minimal",
            UiRef::InstallDir => "WixUI_InstallDir",
            UiRef::FeatureTree => "WixUI_FeatureTree",
            UiRef::Mondo => "WixUI_Mondo",
            UiRef::Advanced => "WixUI_Advanced",
        }
    }

    /// The dialog set lets the user pick the install directory
    pub fn needs_install_dir(&self) -> bool {
        matches!(self, UiRef::InstallDir)
    }
}
