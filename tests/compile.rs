//! Integration tests compiling whole projects and inspecting the emitted XML

use roxmltree::{Document, Node};
use std::collections::BTreeSet;
use std::path::Path;
use wix_compose::id::ComponentGuids;
use wix_compose::{
    compile, compile_to_string, normalize, Action, AutogenContext, Dir, DirItem, Feature, File,
    FileAssociation, IisVirtualDir,
    Project, Property, RegValue, RegistryHive, ServiceInstaller, Shortcut, SvcStartType,
    WebAddress, WebSite,
};

const WIX_NS: &str = "http://schemas.microsoft.com/wix/2006/wi";
const IIS_NS: &str = "http://schemas.microsoft.com/wix/IIsExtension";

fn elements<'a, 'i>(doc: &'a Document<'i>, name: &str) -> Vec<Node<'a, 'i>> {
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == name)
        .collect()
}

fn child_elements<'a, 'i>(node: Node<'a, 'i>, name: &'a str) -> impl Iterator<Item = Node<'a, 'i>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn sample_project() -> Project {
    Project::with_items(
        "Sample",
        [
            Dir::new(
                r"%ProgramFiles%\Acme\Sample",
                [
                    File::new(
                        r"bin\sample.exe",
                        [Shortcut::new("Sample", r"%ProgramMenu%\Acme").into()],
                    )
                    .into(),
                    File::new(r"docs\readme.txt", []).into(),
                    Dir::new("logs", []).into(),
                ],
            )
            .into(),
            RegValue::new(RegistryHive::LocalMachine, r"Software\Acme\Sample", "Path", "[INSTALLDIR]").into(),
        ],
    )
    .manufacturer("Acme")
    .version("1.2.3.0")
}

#[test]
fn test_compiling_twice_is_identical() {
    let project = sample_project();
    let first = compile_to_string(&project).unwrap();
    let second = compile_to_string(&project).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_output_is_well_formed() {
    let source = compile_to_string(&sample_project()).unwrap();
    let doc = Document::parse(&source).unwrap();

    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "Wix");
    assert_eq!(root.tag_name().namespace(), Some(WIX_NS));

    let product = elements(&doc, "Product")[0];
    assert_eq!(product.attribute("Version"), Some("1.2.3.0"));
    assert_eq!(product.attribute("Manufacturer"), Some("Acme"));
    assert_eq!(product.attribute("Language"), Some("1033"));

    let install_dir = elements(&doc, "Directory")
        .into_iter()
        .find(|d| d.attribute("Id") == Some("INSTALLDIR"))
        .unwrap();
    assert_eq!(install_dir.attribute("Name"), Some("Sample"));
    assert_eq!(
        install_dir.parent_element().unwrap().attribute("Id"),
        Some("ProgramFilesFolder.Acme")
    );

    let menu = elements(&doc, "Directory")
        .into_iter()
        .find(|d| d.attribute("Id") == Some("ProgramMenuFolder"))
        .unwrap();
    assert_eq!(
        menu.parent_element().unwrap().attribute("Id"),
        Some("TARGETDIR")
    );
}

#[test]
fn test_default_feature_holds_every_unit() {
    let source = compile_to_string(&sample_project()).unwrap();
    let doc = Document::parse(&source).unwrap();

    let features = elements(&doc, "Feature");
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].attribute("Id"), Some("Complete"));
    assert_eq!(features[0].attribute("Title"), Some("Complete"));

    let components: BTreeSet<_> = elements(&doc, "Component")
        .into_iter()
        .filter_map(|c| c.attribute("Id"))
        .collect();
    let referenced: BTreeSet<_> = child_elements(features[0], "ComponentRef")
        .filter_map(|c| c.attribute("Id"))
        .collect();
    assert_eq!(components, referenced);
    assert!(components.contains("Component.sample.exe"));
    assert!(components.contains("Registry.1"));
}

#[test]
fn test_three_level_feature_nesting() {
    let docs = ["Guide", "Reference", "Samples"];
    let files: Vec<DirItem> = docs
        .iter()
        .map(|name| File::new(format!("{}.pdf", name), []).feature(*name).into())
        .collect();
    let project = Project::with_items(
        "Nested",
        [
            Dir::new(r"%ProgramFiles%\Nested", files).into(),
            Feature::new("Product")
                .child(
                    Feature::new("Documentation")
                        .children(docs.iter().map(|name| Feature::new(*name))),
                )
                .into(),
        ],
    );

    let source = compile_to_string(&project).unwrap();
    let doc = Document::parse(&source).unwrap();

    let product = elements(&doc, "Product")[0];
    let top: Vec<_> = child_elements(product, "Feature").collect();
    assert_eq!(top.len(), 1, "no default feature when every unit is assigned");
    assert_eq!(top[0].attribute("Id"), Some("Product"));

    let documentation: Vec<_> = child_elements(top[0], "Feature").collect();
    assert_eq!(documentation.len(), 1);
    assert_eq!(documentation[0].attribute("Id"), Some("Documentation"));

    let leaves: Vec<_> = child_elements(documentation[0], "Feature").collect();
    assert_eq!(leaves.len(), 3);
    for (leaf, name) in leaves.iter().zip(docs) {
        assert_eq!(leaf.attribute("Id"), Some(name));
        assert_eq!(child_elements(*leaf, "Feature").count(), 0);
        let refs: Vec<_> = child_elements(*leaf, "ComponentRef")
            .filter_map(|c| c.attribute("Id"))
            .collect();
        assert_eq!(refs, vec![format!("Component.{}.pdf", name)]);
    }
}

#[test]
fn test_normalization_is_idempotent_on_compiled_output() {
    let project = sample_project();
    let compiled = compile(&project).unwrap();

    let guids = ComponentGuids::new(
        project.options.component_guids,
        project.resolved_product_id(),
    );
    let ctx = AutogenContext {
        user_profile_key: &project.options.user_profile_key,
        guids: &guids,
        win64: false,
    };
    let again = normalize(compiled.document.clone(), &ctx);
    assert_eq!(again, compiled.document);
}

#[test]
fn test_empty_project_uses_placeholder_directory() {
    let source = compile_to_string(&Project::new("Empty")).unwrap();
    let doc = Document::parse(&source).unwrap();

    let dummy = elements(&doc, "Directory")
        .into_iter()
        .find(|d| d.attribute("Id") == Some("DummyDir"))
        .unwrap();
    let component = child_elements(dummy, "Component").next().unwrap();
    assert_eq!(component.attribute("Id"), Some("DummyDir.EmptyDirectory"));

    let removes: Vec<_> = child_elements(component, "RemoveFolder").collect();
    assert_eq!(removes.len(), 1);
    assert_eq!(removes[0].attribute("On"), Some("both"));
}

#[test]
fn test_placeholder_tokens_survive() {
    let site = WebSite::new("Shop").address(WebAddress::new("[IIS_SITE_ADDRESS]", "[IIS_SITE_PORT]"));
    let project = Project::with_items(
        "Web",
        [
            Dir::new(
                r"%ProgramFiles%\Web",
                [File::new(
                    "default.aspx",
                    [IisVirtualDir::new("shop").web_site(site).into()],
                )
                .into()],
            )
            .into(),
            Property::new("IIS_SITE_ADDRESS", "[ComputerName]").into(),
        ],
    );

    let source = compile_to_string(&project).unwrap();
    assert!(source.contains("[IIS_SITE_ADDRESS]"));
    let doc = Document::parse(&source).unwrap();

    let address = elements(&doc, "WebAddress")[0];
    assert_eq!(address.tag_name().namespace(), Some(IIS_NS));
    assert_eq!(address.attribute("IP"), Some("[IIS_SITE_ADDRESS]"));
    assert_eq!(address.attribute("Port"), Some("[IIS_SITE_PORT]"));

    let property = elements(&doc, "Property")
        .into_iter()
        .find(|p| p.attribute("Id") == Some("IIS_SITE_ADDRESS"))
        .unwrap();
    assert_eq!(property.attribute("Value"), Some("[ComputerName]"));

    let vdir = elements(&doc, "WebVirtualDir")[0];
    assert_eq!(vdir.attribute("WebSite"), Some("Shop"));
    assert_eq!(vdir.attribute("Directory"), Some("INSTALLDIR"));
}

#[test]
fn test_service_installer_attributes() {
    let service = ServiceInstaller::new("AcmeSvc")
        .display_name("Acme Service")
        .description("Does things")
        .start_type(SvcStartType::Demand)
        .account(r"NT AUTHORITY\LocalService")
        .arguments("--quiet")
        .depends_on("Tcpip");
    let project = Project::with_items(
        "Svc",
        [Dir::new(
            r"%ProgramFiles%\Svc",
            [File::new("svc.exe", [service.into()]).into()],
        )
        .into()],
    );

    let source = compile_to_string(&project).unwrap();
    let doc = Document::parse(&source).unwrap();

    let installs = elements(&doc, "ServiceInstall");
    assert_eq!(installs.len(), 1);
    let install = installs[0];
    assert_eq!(install.attribute("Name"), Some("AcmeSvc"));
    assert_eq!(install.attribute("DisplayName"), Some("Acme Service"));
    assert_eq!(install.attribute("Description"), Some("Does things"));
    assert_eq!(install.attribute("Start"), Some("demand"));
    assert_eq!(install.attribute("Account"), Some(r"NT AUTHORITY\LocalService"));
    assert_eq!(install.attribute("Arguments"), Some("--quiet"));
    assert_eq!(install.attribute("Type"), Some("ownProcess"));
    for absent in ["Password", "LoadOrderGroup", "Interactive", "Vital"] {
        assert!(install.attribute(absent).is_none(), "{} should be absent", absent);
    }
    assert_eq!(
        child_elements(install, "ServiceDependency").next().unwrap().attribute("Id"),
        Some("Tcpip")
    );
    assert_eq!(elements(&doc, "ServiceConfig").len(), 0);

    let controls = elements(&doc, "ServiceControl");
    assert_eq!(controls.len(), 3);
    assert_eq!(controls[0].attribute("Start"), Some("install"));
    assert!(controls[0].attribute("Wait").is_none());
    assert_eq!(controls[1].attribute("Stop"), Some("both"));
    assert_eq!(controls[1].attribute("Wait"), Some("yes"));
    assert_eq!(controls[2].attribute("Remove"), Some("uninstall"));
}

#[test]
fn test_same_named_files_get_suffixed_ids() {
    let project = Project::with_items(
        "Dupes",
        [Dir::new(
            r"%ProgramFiles%\Dupes",
            [
                Dir::new("a", [File::new(r"a\readme.txt", []).into()]).into(),
                Dir::new("b", [File::new(r"b\readme.txt", []).into()]).into(),
                Dir::new("c", [File::new(r"c\readme.txt", []).into()]).into(),
            ],
        )
        .into()],
    );

    let source = compile_to_string(&project).unwrap();
    let doc = Document::parse(&source).unwrap();
    let ids: Vec<_> = elements(&doc, "File")
        .into_iter()
        .filter_map(|f| f.attribute("Id"))
        .collect();
    assert_eq!(ids, vec!["readme.txt", "readme.txt.1", "readme.txt.2"]);
}

#[test]
fn test_file_shortcut_component_gets_user_registry_key() {
    let source = compile_to_string(&sample_project()).unwrap();
    let doc = Document::parse(&source).unwrap();

    let component = elements(&doc, "Component")
        .into_iter()
        .find(|c| c.attribute("Id") == Some("Component.sample.exe"))
        .unwrap();
    let keys: Vec<_> = child_elements(component, "RegistryKey")
        .filter(|k| k.attribute("Root") == Some("HKCU"))
        .collect();
    assert_eq!(keys.len(), 1);

    let value = child_elements(keys[0], "RegistryValue").next().unwrap();
    assert_eq!(value.attribute("KeyPath"), Some("yes"));

    let plain = Project::with_items(
        "Plain",
        [Dir::new(r"%ProgramFiles%\Acme\Plain", [File::new("plain.dat", []).into()]).into()],
    );
    let source = compile_to_string(&plain).unwrap();
    assert!(!source.contains("HKCU"), "no user key without a shortcut");
}

#[test]
fn test_advertised_file_shortcut_keeps_file_key_path() {
    let project = Project::with_items(
        "Adv",
        [Dir::new(
            r"%ProgramFiles%\Acme\Adv",
            [File::new("adv.exe", [Shortcut::new("Adv", "%Desktop%").advertise().into()]).into()],
        )
        .into()],
    );
    let source = compile_to_string(&project).unwrap();
    let doc = Document::parse(&source).unwrap();

    let file = elements(&doc, "File")[0];
    assert_eq!(file.attribute("KeyPath"), Some("yes"));
    let component = file.parent_element().unwrap();
    assert_eq!(child_elements(component, "RegistryKey").count(), 0);
}

#[test]
fn test_icons_resolve_against_source_base_dir() {
    let file = File::new(
        r"bin\app.exe",
        [
            Shortcut::new("App", "%Desktop%").icon(r"res\app.ico").into(),
            FileAssociation::new("appdoc").icon(r"res\doc.ico").into(),
        ],
    );
    let project = Project::with_items(
        "Icons",
        [Dir::new(r"%ProgramFiles%\Acme\Icons", [file.into()]).into()],
    )
    .source_base_dir("/src/base");

    let source = compile_to_string(&project).unwrap();
    let doc = Document::parse(&source).unwrap();

    let resolved = |p: &str| Path::new("/src/base").join(p).to_string_lossy().to_string();
    assert_eq!(
        elements(&doc, "File")[0].attribute("Source"),
        Some(resolved(r"bin\app.exe").as_str())
    );

    let icons: BTreeSet<_> = elements(&doc, "Icon")
        .into_iter()
        .filter_map(|i| i.attribute("SourceFile"))
        .collect();
    let expected = [resolved(r"res\app.ico"), resolved(r"res\doc.ico")];
    let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
    assert_eq!(icons, expected);

    let shortcut = elements(&doc, "Shortcut")[0];
    assert_eq!(shortcut.attribute("Icon"), Some("app.ico"));
    let prog_id = elements(&doc, "ProgId")[0];
    assert_eq!(prog_id.attribute("Icon"), Some("doc.ico"));
}

#[test]
fn test_script_with_cdata_terminator_stays_well_formed() {
    let project = Project::with_items(
        "Script",
        [
            Dir::new(r"%ProgramFiles%\Script", [File::new("a.exe", []).into()]).into(),
            Action::script("x = \"]]>\"").into(),
        ],
    );
    let source = compile_to_string(&project).unwrap();
    let doc = Document::parse(&source).unwrap();

    let action = elements(&doc, "CustomAction")
        .into_iter()
        .find(|a| a.attribute("Script").is_some())
        .unwrap();
    assert_eq!(action.text().map(str::trim), Some("x = \"]]>\""));
}
