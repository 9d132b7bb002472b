//! Burn bootstrapper bundles
//!
//! Chains MSI, EXE, MSP and MSU packages behind one of the stock WiX
//! bootstrapper applications. Bundles are emitted through the same element
//! model and formatter as products.
//!
//! ```
//! use wix_compose::{BootstrapperUi, Bundle, BundlePackage};
//!
//! let bundle = Bundle::new("MySetup", "1.0.0.0")
//!     .manufacturer("My Company")
//!     .ui(BootstrapperUi::RtfLicense)
//!     .package(BundlePackage::exe("vcredist_x64.exe")
//!         .detect_condition("VCRUNTIME_X64")
//!         .install_command("/install /quiet /norestart"))
//!     .package(BundlePackage::msi("MainProduct.msi"));
//!
//! let wxs = bundle.to_source().unwrap();
//! assert!(wxs.contains("<Chain>"));
//! ```

use crate::compiler::{declare_namespaces, WIX_NAMESPACE};
use crate::error::{Result, ValidationError, WixError};
use crate::format::format_source;
use crate::id::{format_guid, EntityKind, IdAllocator};
use crate::model::Platform;
use crate::validate::is_valid_version;
use crate::xml::{yes_no, Document, Element};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

/// Extension every bundle is built with
pub const BAL_EXTENSION: &str = "WixBalExtension.dll";

/// Stock bootstrapper application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BootstrapperUi {
    /// Licence shown as a hyperlink
    HyperlinkLicense,
    HyperlinkSidebarLicense,
    /// Licence text shown from an RTF file
    #[default]
    RtfLicense,
    RtfLargeLicense,
    /// Bootstrapper application provided by a payload of the bundle
    Custom,
}

impl BootstrapperUi {
    /// Id of the referenced `BootstrapperApplication`
    pub fn application_id(&self) -> &'static str {
        match self {
            BootstrapperUi::HyperlinkLicense => "WixStandardBootstrapperApplication.HyperlinkLicense",
            BootstrapperUi::HyperlinkSidebarLicense => {
                "WixStandardBootstrapperApplication.HyperlinkSidebarLicense"
            }
            BootstrapperUi::RtfLicense => "WixStandardBootstrapperApplication.RtfLicense",
            BootstrapperUi::RtfLargeLicense => "WixStandardBootstrapperApplication.RtfLargeLicense",
            BootstrapperUi::Custom => "ManagedBootstrapperApplicationHost",
        }
    }

    fn is_hyperlink(&self) -> bool {
        matches!(
            self,
            BootstrapperUi::HyperlinkLicense | BootstrapperUi::HyperlinkSidebarLicense
        )
    }
}

/// Package type in the bundle chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Msi,
    Exe,
    Msp,
    Msu,
}

impl PackageType {
    pub fn element_name(&self) -> &'static str {
        match self {
            PackageType::Msi => "MsiPackage",
            PackageType::Exe => "ExePackage",
            PackageType::Msp => "MspPackage",
            PackageType::Msu => "MsuPackage",
        }
    }
}

/// Package caching after installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    #[default]
    Yes,
    No,
    Always,
}

impl CacheType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::Yes => "yes",
            CacheType::No => "no",
            CacheType::Always => "always",
        }
    }
}

/// A package in the bundle chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlePackage {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub package_type: PackageType,
    pub source: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub install_condition: Option<String>,
    /// Exe packages only
    #[serde(default)]
    pub detect_condition: Option<String>,
    #[serde(default)]
    pub install_command: Option<String>,
    #[serde(default)]
    pub repair_command: Option<String>,
    #[serde(default)]
    pub uninstall_command: Option<String>,
    #[serde(default = "default_true")]
    pub vital: bool,
    #[serde(default)]
    pub permanent: bool,
    #[serde(default)]
    pub cache: CacheType,
    #[serde(default)]
    pub compressed: Option<bool>,
    #[serde(default)]
    pub per_machine: Option<bool>,
    /// Show the package's own UI instead of the bootstrapper's (msi only)
    #[serde(default)]
    pub display_internal_ui: bool,
    /// `MsiProperty` values passed to an msi package
    #[serde(default)]
    pub msi_properties: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl BundlePackage {
    pub fn msi(source: impl Into<String>) -> Self {
        Self::new(PackageType::Msi, source)
    }

    pub fn exe(source: impl Into<String>) -> Self {
        Self::new(PackageType::Exe, source)
    }

    /// Patch package
    pub fn msp(source: impl Into<String>) -> Self {
        Self::new(PackageType::Msp, source)
    }

    /// Windows Update package
    pub fn msu(source: impl Into<String>) -> Self {
        Self::new(PackageType::Msu, source)
    }

    fn new(package_type: PackageType, source: impl Into<String>) -> Self {
        Self {
            id: None,
            package_type,
            source: source.into(),
            name: None,
            download_url: None,
            install_condition: None,
            detect_condition: None,
            install_command: None,
            repair_command: None,
            uninstall_command: None,
            vital: true,
            permanent: false,
            cache: CacheType::Yes,
            compressed: None,
            per_machine: None,
            display_internal_ui: false,
            msi_properties: BTreeMap::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn install_condition(mut self, condition: impl Into<String>) -> Self {
        self.install_condition = Some(condition.into());
        self
    }

    pub fn detect_condition(mut self, condition: impl Into<String>) -> Self {
        self.detect_condition = Some(condition.into());
        self
    }

    pub fn install_command(mut self, args: impl Into<String>) -> Self {
        self.install_command = Some(args.into());
        self
    }

    pub fn repair_command(mut self, args: impl Into<String>) -> Self {
        self.repair_command = Some(args.into());
        self
    }

    pub fn uninstall_command(mut self, args: impl Into<String>) -> Self {
        self.uninstall_command = Some(args.into());
        self
    }

    pub fn non_vital(mut self) -> Self {
        self.vital = false;
        self
    }

    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    pub fn cache(mut self, cache: CacheType) -> Self {
        self.cache = cache;
        self
    }

    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = Some(compressed);
        self
    }

    pub fn per_machine(mut self, per_machine: bool) -> Self {
        self.per_machine = Some(per_machine);
        self
    }

    pub fn display_internal_ui(mut self) -> Self {
        self.display_internal_ui = true;
        self
    }

    pub fn msi_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.msi_properties.insert(name.into(), value.into());
        self
    }

    fn element(&self, ids: &mut IdAllocator) -> Element {
        let id = ids.resolve(EntityKind::Package, self.id.as_deref(), &self.source);
        let mut el = Element::new(self.package_type.element_name())
            .attr("Id", id)
            .attr("SourceFile", self.source.as_str())
            .attr_opt("Name", self.name.as_deref())
            .attr_opt("DownloadUrl", self.download_url.as_deref())
            .attr_opt("InstallCondition", self.install_condition.as_deref());

        if self.package_type == PackageType::Exe {
            el = el
                .attr_opt("DetectCondition", self.detect_condition.as_deref())
                .attr_opt("InstallCommand", self.install_command.as_deref())
                .attr_opt("RepairCommand", self.repair_command.as_deref())
                .attr_opt("UninstallCommand", self.uninstall_command.as_deref());
        }

        el = el
            .attr("Vital", yes_no(self.vital))
            .yes_no("Permanent", self.permanent.then_some(true))
            .attr("Cache", self.cache.as_str())
            .yes_no("Compressed", self.compressed)
            .yes_no("PerMachine", self.per_machine);

        if self.package_type == PackageType::Msi {
            el = el.yes_no("DisplayInternalUI", self.display_internal_ui.then_some(true));
            for (name, value) in &self.msi_properties {
                el.push(
                    Element::new("MsiProperty")
                        .attr("Name", name.as_str())
                        .attr("Value", value.as_str()),
                );
            }
        }
        el
    }
}

/// Burn variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleVariable {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, rename = "type")]
    pub variable_type: Option<VariableType>,
    #[serde(default)]
    pub persisted: bool,
    #[serde(default)]
    pub hidden: bool,
    /// Value may be overridden from the command line
    #[serde(default)]
    pub overridable: bool,
}

impl BundleVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            variable_type: None,
            persisted: false,
            hidden: false,
            overridable: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_type(mut self, var_type: VariableType) -> Self {
        self.variable_type = Some(var_type);
        self
    }

    pub fn persisted(mut self) -> Self {
        self.persisted = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn overridable(mut self) -> Self {
        self.overridable = true;
        self
    }

    fn element(&self) -> Element {
        let mut el = Element::new("Variable")
            .attr("Name", self.name.as_str())
            .attr_opt("Value", self.value.as_deref())
            .attr_opt("Type", self.variable_type.map(|t| t.as_str()))
            .yes_no("Persisted", self.persisted.then_some(true))
            .yes_no("Hidden", self.hidden.then_some(true));
        if self.overridable {
            el.set_attr("bal:Overridable", "yes");
        }
        el
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Numeric,
    Version,
}

impl VariableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::String => "string",
            VariableType::Numeric => "numeric",
            VariableType::Version => "version",
        }
    }
}

/// Bootstrapper bundle definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bundle {
    pub name: String,
    pub version: String,
    pub manufacturer: Option<String>,
    /// Derived from the name when unset
    pub upgrade_code: Option<Uuid>,
    pub about_url: Option<String>,
    pub help_url: Option<String>,
    pub update_url: Option<String>,
    pub icon_source: Option<String>,
    pub splash_screen: Option<String>,
    pub ui: BootstrapperUi,
    /// RTF licence for the Rtf applications
    pub license_file: Option<String>,
    /// Licence link for the Hyperlink applications
    pub license_url: Option<String>,
    pub logo_file: Option<String>,
    pub packages: Vec<BundlePackage>,
    pub variables: Vec<BundleVariable>,
    pub package_groups: BTreeMap<String, Vec<BundlePackage>>,
    pub disable_modify: bool,
    pub disable_remove: bool,
    pub disable_repair: bool,
    /// Launch condition of the whole bundle
    pub condition: Option<String>,
    pub platform: Platform,
    /// File name of the bundle without extension; the name by default
    pub output_name: Option<String>,
}

impl Default for Bundle {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: "1.0.0.0".to_string(),
            manufacturer: None,
            upgrade_code: None,
            about_url: None,
            help_url: None,
            update_url: None,
            icon_source: None,
            splash_screen: None,
            ui: BootstrapperUi::default(),
            license_file: None,
            license_url: None,
            logo_file: None,
            packages: Vec::new(),
            variables: Vec::new(),
            package_groups: BTreeMap::new(),
            disable_modify: false,
            disable_remove: false,
            disable_repair: false,
            condition: None,
            platform: Platform::default(),
            output_name: None,
        }
    }
}

impl Bundle {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn upgrade_code(mut self, code: Uuid) -> Self {
        self.upgrade_code = Some(code);
        self
    }

    pub fn about_url(mut self, url: impl Into<String>) -> Self {
        self.about_url = Some(url.into());
        self
    }

    pub fn help_url(mut self, url: impl Into<String>) -> Self {
        self.help_url = Some(url.into());
        self
    }

    pub fn update_url(mut self, url: impl Into<String>) -> Self {
        self.update_url = Some(url.into());
        self
    }

    pub fn icon(mut self, path: impl Into<String>) -> Self {
        self.icon_source = Some(path.into());
        self
    }

    pub fn splash_screen(mut self, path: impl Into<String>) -> Self {
        self.splash_screen = Some(path.into());
        self
    }

    pub fn ui(mut self, ui: BootstrapperUi) -> Self {
        self.ui = ui;
        self
    }

    pub fn license_file(mut self, path: impl Into<String>) -> Self {
        self.license_file = Some(path.into());
        self
    }

    pub fn license_url(mut self, url: impl Into<String>) -> Self {
        self.license_url = Some(url.into());
        self
    }

    pub fn logo_file(mut self, path: impl Into<String>) -> Self {
        self.logo_file = Some(path.into());
        self
    }

    pub fn package(mut self, package: BundlePackage) -> Self {
        self.packages.push(package);
        self
    }

    pub fn packages<I>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = BundlePackage>,
    {
        self.packages.extend(packages);
        self
    }

    pub fn variable(mut self, variable: BundleVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn package_group(mut self, name: impl Into<String>, packages: Vec<BundlePackage>) -> Self {
        self.package_groups.insert(name.into(), packages);
        self
    }

    pub fn disable_modify(mut self) -> Self {
        self.disable_modify = true;
        self
    }

    pub fn disable_remove(mut self) -> Self {
        self.disable_remove = true;
        self
    }

    pub fn disable_repair(mut self) -> Self {
        self.disable_repair = true;
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn resolved_upgrade_code(&self) -> Uuid {
        self.upgrade_code
            .unwrap_or_else(|| Uuid::new_v5(&Uuid::NAMESPACE_OID, self.name.as_bytes()))
    }

    pub fn output_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(&self.name)
    }

    /// Reject bundles without packages and malformed versions
    pub fn validate(&self) -> Result<()> {
        if !is_valid_version(&self.version) {
            return Err(ValidationError::InvalidVersion {
                context: format!("bundle '{}'", self.name),
                value: self.version.clone(),
            }
            .into());
        }
        if self.packages.is_empty() && self.package_groups.is_empty() {
            return Err(WixError::Structure(format!(
                "bundle '{}' has no packages",
                self.name
            )));
        }
        let all = self
            .packages
            .iter()
            .chain(self.package_groups.values().flatten());
        for package in all {
            if package.source.is_empty() {
                return Err(WixError::Structure(
                    "bundle package source cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Bundle document with namespaces declared, plus the extension
    /// assemblies it needs
    pub fn to_document(&self) -> Result<(Document, Vec<String>)> {
        self.validate()?;
        let mut ids = IdAllocator::new();

        let mut bundle = Element::new("Bundle")
            .attr("Name", self.name.as_str())
            .attr("Version", self.version.as_str())
            .attr_opt("Manufacturer", self.manufacturer.as_deref())
            .attr("UpgradeCode", format_guid(&self.resolved_upgrade_code()))
            .attr_opt("AboutUrl", self.about_url.as_deref())
            .attr_opt("HelpUrl", self.help_url.as_deref())
            .attr_opt("UpdateUrl", self.update_url.as_deref())
            .attr_opt("IconSourceFile", self.icon_source.as_deref())
            .attr_opt("SplashScreenSourceFile", self.splash_screen.as_deref())
            .yes_no("DisableModify", self.disable_modify.then_some(true))
            .yes_no("DisableRemove", self.disable_remove.then_some(true))
            .yes_no("DisableRepair", self.disable_repair.then_some(true))
            .attr_opt("Condition", self.condition.as_deref());

        bundle.push(self.bootstrapper_application());
        for variable in &self.variables {
            bundle.push(variable.element());
        }

        let mut chain = Element::new("Chain");
        for name in self.package_groups.keys() {
            chain.push(Element::new("PackageGroupRef").attr("Id", name.as_str()));
        }
        for package in &self.packages {
            chain.push(package.element(&mut ids));
        }
        bundle.push(chain);

        let mut root = Element::new("Wix").attr("xmlns", WIX_NAMESPACE).child(bundle);
        for (name, packages) in &self.package_groups {
            let mut group = Element::new("PackageGroup").attr("Id", name.as_str());
            for package in packages {
                group.push(package.element(&mut ids));
            }
            root.push(Element::new("Fragment").child(group));
        }

        let mut extensions = declare_namespaces(&mut root);
        if !extensions.iter().any(|e| e == BAL_EXTENSION) {
            extensions.push(BAL_EXTENSION.to_string());
        }
        Ok((Document::new(root), extensions))
    }

    /// Serialized and formatted source text
    pub fn to_source(&self) -> Result<String> {
        let (document, _) = self.to_document()?;
        Ok(format_source(&document.to_xml()))
    }

    fn bootstrapper_application(&self) -> Element {
        let mut app = Element::new("BootstrapperApplicationRef").attr("Id", self.ui.application_id());
        if self.ui == BootstrapperUi::Custom {
            return app;
        }

        let licence = if self.ui.is_hyperlink() {
            ("LicenseUrl", self.license_url.as_deref())
        } else {
            ("LicenseFile", self.license_file.as_deref())
        };
        app.push(
            Element::new("bal:WixStandardBootstrapperApplication")
                .attr_opt(licence.0, licence.1)
                .attr_opt("LogoFile", self.logo_file.as_deref()),
        );
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> Bundle {
        Bundle::new("Setup", "1.2.0.0")
            .manufacturer("Acme")
            .license_file("licence.rtf")
            .package(
                BundlePackage::exe(r"redist\vcredist_x64.exe")
                    .detect_condition("VCRUNTIME_X64")
                    .install_command("/install /quiet")
                    .permanent(),
            )
            .package(BundlePackage::msi("App.msi").msi_property("INSTALLDIR", "[InstallFolder]"))
    }

    fn root(bundle: &Bundle) -> Element {
        bundle.to_document().unwrap().0.root
    }

    #[test]
    fn test_bundle_structure() {
        let root = root(&bundle());
        assert_eq!(
            root.get_attr("xmlns:bal"),
            Some("http://schemas.microsoft.com/wix/BalExtension")
        );
        let bundle = root.first_named("Bundle").unwrap();
        assert_eq!(bundle.get_attr("Version"), Some("1.2.0.0"));
        assert!(bundle.get_attr("UpgradeCode").is_some());

        let app = bundle.first_named("BootstrapperApplicationRef").unwrap();
        assert_eq!(
            app.get_attr("Id"),
            Some("WixStandardBootstrapperApplication.RtfLicense")
        );
        let standard = app.first_named("bal:WixStandardBootstrapperApplication").unwrap();
        assert_eq!(standard.get_attr("LicenseFile"), Some("licence.rtf"));

        let chain = bundle.first_named("Chain").unwrap();
        let packages: Vec<_> = chain.elements().collect();
        assert_eq!(packages[0].name, "ExePackage");
        assert_eq!(packages[0].id(), Some("vcredist_x64.exe"));
        assert_eq!(packages[0].get_attr("InstallCommand"), Some("/install /quiet"));
        assert_eq!(packages[0].get_attr("Permanent"), Some("yes"));
        assert_eq!(packages[1].name, "MsiPackage");
        assert!(packages[1].get_attr("DetectCondition").is_none());
        assert!(packages[1].has_child("MsiProperty"));
    }

    #[test]
    fn test_hyperlink_licence() {
        let bundle = bundle()
            .ui(BootstrapperUi::HyperlinkLicense)
            .license_url("https://example.com/eula");
        let root = root(&bundle);
        let standard = root
            .descendants()
            .into_iter()
            .find(|e| e.name == "bal:WixStandardBootstrapperApplication")
            .unwrap();
        assert_eq!(standard.get_attr("LicenseUrl"), Some("https://example.com/eula"));
        assert!(standard.get_attr("LicenseFile").is_none());
    }

    #[test]
    fn test_package_groups_become_fragments() {
        let bundle = Bundle::new("Setup", "1.0.0.0")
            .package_group("Prereqs", vec![BundlePackage::msu("kb123.msu")]);
        let root = root(&bundle);
        let chain = root.descendants().into_iter().find(|e| e.name == "Chain").unwrap();
        assert_eq!(chain.first_named("PackageGroupRef").unwrap().id(), Some("Prereqs"));
        let fragment = root.first_named("Fragment").unwrap();
        let group = fragment.first_named("PackageGroup").unwrap();
        assert_eq!(group.first_named("MsuPackage").unwrap().id(), Some("kb123.msu"));
    }

    #[test]
    fn test_duplicate_sources_get_unique_ids() {
        let bundle = Bundle::new("Setup", "1.0.0.0")
            .package(BundlePackage::msi(r"a\App.msi"))
            .package(BundlePackage::msi(r"b\App.msi"));
        let root = root(&bundle);
        let ids: Vec<_> = root
            .descendants()
            .into_iter()
            .filter(|e| e.name == "MsiPackage")
            .filter_map(|e| e.id().map(str::to_string))
            .collect();
        assert_eq!(ids, vec!["App.msi", "App.msi.1"]);
    }

    #[test]
    fn test_validate() {
        let err = Bundle::new("Setup", "1.0.0.0").validate().unwrap_err();
        assert!(matches!(err, WixError::Structure(_)));

        let bad_version = Bundle {
            version: "1.x".to_string(),
            ..bundle()
        };
        let err = bad_version.validate().unwrap_err();
        assert!(matches!(err, WixError::Validation(ValidationError::InvalidVersion { .. })));
    }

    #[test]
    fn test_overridable_variable_uses_bal() {
        let bundle = bundle().variable(
            BundleVariable::new("InstallFolder")
                .with_value("[ProgramFilesFolder]Acme")
                .with_type(VariableType::String)
                .overridable(),
        );
        let root = root(&bundle);
        let variable = root
            .descendants()
            .into_iter()
            .find(|e| e.name == "Variable")
            .unwrap();
        assert_eq!(variable.get_attr("Type"), Some("string"));
        assert_eq!(variable.get_attr("bal:Overridable"), Some("yes"));
    }

    #[test]
    fn test_source_is_formatted() {
        let source = bundle().to_source().unwrap();
        assert!(source.contains("<Chain>"));
        assert!(source.contains("\n\n</Bundle>") || source.contains("\n\n  </Bundle>"));
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
name: Setup
version: 2.0.0.0
ui: HyperlinkLicense
license_url: https://example.com/eula
packages:
  - type: msi
    source: App.msi
  - type: exe
    source: dotnet.exe
    vital: false
    install_command: /q
"#;
        let bundle = Bundle::from_yaml(yaml).unwrap();
        assert_eq!(bundle.ui, BootstrapperUi::HyperlinkLicense);
        assert_eq!(bundle.packages.len(), 2);
        assert!(bundle.packages[0].vital);
        assert!(!bundle.packages[1].vital);
        assert_eq!(bundle.packages[1].install_command.as_deref(), Some("/q"));
    }
}
