//! Project graph to WiX source compilation
//!
//! [`Compiler::compile`] runs validation, emits the `Product` tree, applies
//! the normalization pass from [`autogen`] and declares the extension
//! namespaces the document ended up using. Every compilation owns a fresh
//! [`IdAllocator`], so compiling the same project twice yields identical
//! output.

mod actions;
pub mod autogen;
mod components;
mod directories;
mod features;
mod upgrade;

use crate::error::{Result, WixError};
use crate::format::format_source;
use crate::id::{format_guid, ComponentGuidPolicy, ComponentGuids, EntityKind, IdAllocator};
use crate::model::{language_code, Attributes, Project};
use crate::validate::validate;
use crate::xml::{yes_no, Document, Element};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

pub use autogen::{normalize, AutogenContext};
pub use directories::DUMMY_DIR_ID;

/// Default namespace of WiX v3 sources
pub const WIX_NAMESPACE: &str = "http://schemas.microsoft.com/wix/2006/wi";

/// Extension prefixes accepted in element and attribute names:
/// `(prefix, namespace, extension assembly)`
pub const EXTENSIONS: &[(&str, &str, &str)] = &[
    (
        "util",
        "http://schemas.microsoft.com/wix/UtilExtension",
        "WixUtilExtension.dll",
    ),
    (
        "iis",
        "http://schemas.microsoft.com/wix/IIsExtension",
        "WixIIsExtension.dll",
    ),
    (
        "sql",
        "http://schemas.microsoft.com/wix/SqlExtension",
        "WixSqlExtension.dll",
    ),
    (
        "netfx",
        "http://schemas.microsoft.com/wix/NetFxExtension",
        "WixNetFxExtension.dll",
    ),
    (
        "bal",
        "http://schemas.microsoft.com/wix/BalExtension",
        "WixBalExtension.dll",
    ),
];

pub const UTIL_EXTENSION: &str = "WixUtilExtension.dll";
pub const UI_EXTENSION: &str = "WixUIExtension.dll";

/// Knobs of the emitted source that are not part of the installed state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// HKCU key holding the dummy key paths of per-user components
    pub user_profile_key: String,
    /// Mark components of x64 packages with `Win64="yes"`
    pub emit_win64: bool,
    pub component_guids: ComponentGuidPolicy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            user_profile_key: r"Software\WixCompose\Used".to_string(),
            emit_win64: true,
            component_guids: ComponentGuidPolicy::default(),
        }
    }
}

/// Reference from a feature to an installable unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitRef {
    Component(String),
    Merge(String),
}

impl UnitRef {
    pub fn id(&self) -> &str {
        match self {
            UnitRef::Component(id) | UnitRef::Merge(id) => id,
        }
    }

    pub fn to_element(&self) -> Element {
        match self {
            UnitRef::Component(id) => Element::new("ComponentRef").attr("Id", id.as_str()),
            UnitRef::Merge(id) => Element::new("MergeRef").attr("Id", id.as_str()),
        }
    }
}

/// Installable units collected while emitting, keyed by owning feature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitTable {
    /// Feature id to units explicitly assigned to it
    pub by_feature: BTreeMap<String, Vec<UnitRef>>,
    /// Units without a feature, folded into the default feature
    pub default: Vec<UnitRef>,
    /// Generated units attached to every feature
    pub auto: Vec<UnitRef>,
}

impl UnitTable {
    pub fn add(&mut self, feature: Option<&str>, unit: UnitRef) {
        match feature {
            Some(feature) => self
                .by_feature
                .entry(feature.to_string())
                .or_default()
                .push(unit),
            None => self.default.push(unit),
        }
    }

    pub fn add_auto(&mut self, unit: UnitRef) {
        self.auto.push(unit);
    }
}

/// A managed assembly that has to be packaged into a native custom action DLL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPackage {
    pub binary_id: String,
    pub assembly: PathBuf,
    pub ref_assemblies: Vec<PathBuf>,
    pub pdb: Option<PathBuf>,
    /// Where the packaged DLL is expected by the emitted `Binary`
    pub output: PathBuf,
}

/// Result of compiling a project
#[derive(Debug, Clone)]
pub struct CompiledProject {
    pub document: Document,
    pub units: UnitTable,
    /// Logical path of the directory that was given the `INSTALLDIR` id
    pub auto_install_dir: Option<String>,
    pub managed_packages: Vec<ManagedPackage>,
    /// Extension assemblies the toolchain needs for this document
    pub extensions: Vec<String>,
}

impl CompiledProject {
    /// Serialized and formatted source text
    pub fn to_source(&self) -> String {
        format_source(&self.document.to_xml())
    }
}

/// State shared by the emitting passes of one compilation
pub(crate) struct Context<'p> {
    pub project: &'p Project,
    pub ids: IdAllocator,
    pub guids: ComponentGuids,
    pub win64: bool,
    pub lcid: u32,
    pub units: UnitTable,
    /// Feature name or explicit id to emitted feature id
    pub feature_ids: HashMap<String, String>,
    /// Lower-cased file id and file name to file id
    pub file_ids: HashMap<String, String>,
    /// Lower-cased binary id and source name to binary id
    pub binary_ids: HashMap<String, String>,
    /// Site key to emitted web site id
    pub web_sites: HashMap<String, String>,
    pub binaries: Vec<Element>,
    /// Product-level elements contributed by nested entities
    pub product_extras: Vec<Element>,
    pub managed_packages: Vec<ManagedPackage>,
    pub managed_output_dir: Option<PathBuf>,
    /// Extensions needed without a namespaced element
    pub extra_extensions: Vec<String>,
}

impl<'p> Context<'p> {
    pub fn new(project: &'p Project, lcid: u32, managed_output_dir: Option<PathBuf>) -> Self {
        Self {
            project,
            ids: IdAllocator::new(),
            guids: component_guids(project),
            win64: project.is_win64() && project.options.emit_win64,
            lcid,
            units: UnitTable::default(),
            feature_ids: HashMap::new(),
            file_ids: HashMap::new(),
            binary_ids: HashMap::new(),
            web_sites: HashMap::new(),
            binaries: Vec::new(),
            product_extras: Vec::new(),
            managed_packages: Vec::new(),
            managed_output_dir,
            extra_extensions: Vec::new(),
        }
    }

    /// `Component` element with guid, bitness and overrides applied
    pub fn component(
        &self,
        id: &str,
        overrides: &crate::model::ComponentOverrides,
    ) -> Result<Element> {
        let mut el = Element::new("Component")
            .attr("Id", id)
            .attr("Guid", self.guids.guid_for(id));
        if self.win64 {
            el.set_attr("Win64", "yes");
        }
        el = el
            .yes_no("Permanent", overrides.permanent)
            .yes_no("NeverOverwrite", overrides.never_overwrite)
            .yes_no("SharedDllRefCount", overrides.shared_dll_ref_count)
            .yes_no("Transitive", overrides.transitive);
        apply_attributes(el, &overrides.extra)
    }

    /// Feature id referenced by name or id
    pub fn feature_id(&self, reference: Option<&str>) -> Result<Option<String>> {
        match reference {
            None => Ok(None),
            Some(name) => self
                .feature_ids
                .get(name)
                .cloned()
                .map(Some)
                .ok_or_else(|| WixError::Structure(format!("unknown feature '{}'", name))),
        }
    }

    pub fn source_path(&self, source: &str) -> String {
        self.project.source_path(source).to_string_lossy().to_string()
    }

    /// Declare a `Binary` once per source file and return its id
    pub fn binary(&mut self, explicit: Option<&str>, source: &str) -> String {
        let key = source.to_lowercase();
        if let Some(id) = self.binary_ids.get(&key) {
            return id.clone();
        }
        let id = self.ids.resolve(EntityKind::Binary, explicit, source);
        self.binaries.push(
            Element::new("Binary")
                .attr("Id", id.as_str())
                .attr("SourceFile", self.source_path(source)),
        );
        self.binary_ids.insert(key, id.clone());
        self.binary_ids.insert(id.to_lowercase(), id.clone());
        id
    }
}

/// Copy an attribute bag onto an element, rejecting unknown namespace prefixes
pub(crate) fn apply_attributes(element: Element, attrs: &Attributes) -> Result<Element> {
    for key in attrs.keys() {
        if let Some((prefix, _)) = key.split_once(':') {
            if !EXTENSIONS.iter().any(|(p, _, _)| *p == prefix) {
                return Err(WixError::Structure(format!(
                    "unsupported attribute target '{}' on <{}>",
                    key, element.name
                )));
            }
        }
    }
    Ok(element.extend_attrs(attrs))
}

/// Compiles projects into WiX source documents
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    managed_output_dir: Option<PathBuf>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory the packaged managed custom action DLLs are written to
    pub fn managed_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.managed_output_dir = Some(dir.into());
        self
    }

    /// Validate, emit, normalize and declare namespaces
    pub fn compile(&self, project: &Project) -> Result<CompiledProject> {
        validate(project)?;

        let resolved;
        let project = if has_wildcards(project) {
            resolved = project.resolve_wildcards()?;
            &resolved
        } else {
            project
        };

        let emitted = self.emit(project)?;
        let guids = component_guids(project);
        let autogen = AutogenContext {
            user_profile_key: &project.options.user_profile_key,
            guids: &guids,
            win64: project.is_win64() && project.options.emit_win64,
        };
        let mut document = normalize(emitted.document, &autogen);

        let mut extensions = declare_namespaces(&mut document.root);
        for ext in emitted
            .extensions
            .iter()
            .chain(project.wix_extensions.iter())
        {
            if !extensions.contains(ext) {
                extensions.push(ext.clone());
            }
        }

        info!(
            "Compiled '{}' {}: {} feature(s), extensions [{}]",
            project.name,
            project.version,
            document.root.descendants().iter().filter(|e| e.name == "Feature").count(),
            extensions.join(", ")
        );

        Ok(CompiledProject {
            document,
            extensions,
            ..emitted
        })
    }

    /// Emit the raw document without normalization or namespace declarations
    pub fn emit(&self, project: &Project) -> Result<CompiledProject> {
        let lcid = project
            .language
            .split([',', ';'])
            .next()
            .and_then(|c| language_code(c.trim()))
            .unwrap_or(1033);

        let mut ctx = Context::new(project, lcid, self.managed_output_dir.clone());

        features::allocate_ids(&mut ctx, &project.features);
        for binary in &project.binaries {
            ctx.binary(binary.id.as_deref(), &binary.source);
        }

        let dirs = directories::process(&mut ctx)?;
        if let Some(path) = &dirs.auto_install_dir {
            info!("INSTALLDIR assigned to '{}'", path);
        }
        let mut target_dir = dirs.element;
        for component in components::registry_components(&mut ctx)? {
            target_dir.push(component);
        }

        let actions = actions::process(&mut ctx)?;
        let upgrade = upgrade::process(project);
        let features = features::emit(&ctx, &project.features)?;
        debug!(
            "Emitted {} custom action(s), {} top-level feature(s)",
            actions.custom_actions.len(),
            features.len()
        );

        let mut product = product_element(project, lcid)?;
        product.push(package_element(project, lcid));
        product.push(media_element(project));
        product.push(target_dir);
        for feature in features {
            product.push(feature);
        }
        for property in property_elements(project) {
            product.push(property);
        }
        for binary in std::mem::take(&mut ctx.binaries) {
            product.push(binary);
        }
        for action in actions.custom_actions {
            product.push(action);
        }
        for element in upgrade.elements {
            product.push(element);
        }

        let mut sequences = actions.sequences;
        sequences.merge(upgrade.sequences);
        for table in sequences.into_elements() {
            product.push(table);
        }

        if let Some(ui) = project.ui {
            product.push(Element::new("UIRef").attr("Id", ui.id()));
            ctx.extra_extensions.push(UI_EXTENSION.to_string());
        }
        if let Some(licence) = &project.licence_file {
            product.push(
                Element::new("WixVariable")
                    .attr("Id", "WixUILicenseRtf")
                    .attr("Value", ctx.source_path(licence)),
            );
        }
        for extra in std::mem::take(&mut ctx.product_extras) {
            product.push(extra);
        }
        if let Some(icon) = &project.control_panel.product_icon {
            let icon_id = ctx.ids.resolve(EntityKind::Icon, None, icon);
            product.push(
                Element::new("Property")
                    .attr("Id", "ARPPRODUCTICON")
                    .attr("Value", icon_id.as_str()),
            );
            product.push(
                Element::new("Icon")
                    .attr("Id", icon_id.as_str())
                    .attr("SourceFile", ctx.source_path(icon)),
            );
        }

        let root = Element::new("Wix")
            .attr("xmlns", WIX_NAMESPACE)
            .child(product);

        Ok(CompiledProject {
            document: Document::new(root),
            units: ctx.units,
            auto_install_dir: dirs.auto_install_dir,
            managed_packages: ctx.managed_packages,
            extensions: ctx.extra_extensions,
        })
    }
}

/// Compile with default settings
pub fn compile(project: &Project) -> Result<CompiledProject> {
    Compiler::new().compile(project)
}

/// Compile and return the formatted source text
pub fn compile_to_string(project: &Project) -> Result<String> {
    Ok(compile(project)?.to_source())
}

fn component_guids(project: &Project) -> ComponentGuids {
    ComponentGuids::new(
        project.options.component_guids,
        project.resolved_product_id(),
    )
}

fn has_wildcards(project: &Project) -> bool {
    fn walk(dir: &crate::model::Dir) -> bool {
        !dir.wildcards.is_empty() || dir.dirs.iter().any(walk)
    }
    project.dirs.iter().any(walk)
}

fn product_element(project: &Project, lcid: u32) -> Result<Element> {
    let product = Element::new("Product")
        .attr("Id", format_guid(&project.resolved_product_id()))
        .attr("Name", project.name.as_str())
        .attr("Language", lcid.to_string())
        .attr("Codepage", project.codepage.to_string())
        .attr("Version", project.version.as_str())
        .attr("Manufacturer", project.manufacturer.as_str())
        .attr("UpgradeCode", format_guid(&project.resolved_upgrade_code()));
    apply_attributes(product, &project.attributes)
}

fn package_element(project: &Project, lcid: u32) -> Element {
    let languages: Vec<String> = project
        .language
        .split([',', ';'])
        .filter_map(|c| language_code(c.trim()))
        .map(|code| code.to_string())
        .collect();
    let languages = if languages.is_empty() {
        lcid.to_string()
    } else {
        languages.join(",")
    };

    Element::new("Package")
        .attr("InstallerVersion", project.installer_version.to_string())
        .attr("Compressed", "yes")
        .attr("SummaryCodepage", project.codepage.to_string())
        .attr("Languages", languages)
        .attr("InstallScope", project.scope.as_str())
        .attr("Platform", project.platform.as_str())
        .attr("Manufacturer", project.manufacturer.as_str())
        .attr_opt("Description", project.description.as_deref())
}

fn media_element(project: &Project) -> Element {
    let media = &project.media;
    Element::new("Media")
        .attr("Id", media.id.to_string())
        .attr("Cabinet", media.cabinet.as_str())
        .attr("EmbedCab", yes_no(media.embed_cab))
        .attr_opt("CompressionLevel", media.compression_level.as_deref())
}

fn property_elements(project: &Project) -> Vec<Element> {
    let mut out = Vec::new();

    for prop in &project.properties {
        let mut el = Element::new("Property")
            .attr("Id", prop.name.as_str())
            .attr_opt("Value", prop.value.as_deref())
            .yes_no("Hidden", prop.hidden)
            .yes_no("Secure", prop.secure)
            .yes_no("Admin", prop.admin);
        if let Some(search) = &prop.registry_search {
            el.push(
                Element::new("RegistrySearch")
                    .attr("Id", format!("{}.Search", prop.name))
                    .attr("Root", search.root.as_str())
                    .attr("Key", search.key.as_str())
                    .attr_opt("Name", search.name.as_deref())
                    .attr("Type", "raw")
                    .yes_no("Win64", search.win64),
            );
        }
        out.push(el);
    }

    for (name, value) in project.control_panel.properties() {
        out.push(Element::new("Property").attr("Id", name).attr("Value", value));
    }

    if project.ui.is_some_and(|ui| ui.needs_install_dir()) {
        out.push(
            Element::new("Property")
                .attr("Id", "WIXUI_INSTALLDIR")
                .attr("Value", directories::INSTALL_DIR_ID),
        );
    }
    out
}

/// Declare every extension namespace the document uses and return the
/// matching extension assemblies
pub(crate) fn declare_namespaces(root: &mut Element) -> Vec<String> {
    let used = root.prefixes();
    let mut extensions = Vec::new();
    for (prefix, namespace, extension) in EXTENSIONS {
        if used.iter().any(|p| p == prefix) {
            root.set_attr(format!("xmlns:{}", prefix), *namespace);
            extensions.push(extension.to_string());
        }
    }
    extensions
}
