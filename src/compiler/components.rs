//! Component emission for files, shortcuts, merge modules, databases and
//! registry values

use super::{apply_attributes, Context, UnitRef};
use crate::condition::Condition;
use crate::error::{Result, WixError};
use crate::id::EntityKind;
use crate::model::{
    ComponentOverrides, FailureAction, File, FileAssociation, FilePermission, IisVirtualDir,
    MergeModule, RegValue, ServiceInstaller, Shortcut, SqlDatabase, SqlExecution, WebSite,
};
use crate::xml::{yes_no, Element};
use std::collections::HashMap;

fn condition_element(condition: &Condition) -> Element {
    Element::new("Condition").cdata(condition.as_str())
}

fn add_unit(ctx: &mut Context, feature: Option<&str>, unit: UnitRef) -> Result<()> {
    let feature_id = ctx.feature_id(feature)?;
    ctx.units.add(feature_id.as_deref(), unit);
    Ok(())
}

/// `Component.<fileId>` holding the file and everything attached to it
pub(crate) fn file_component(
    ctx: &mut Context,
    file: &File,
    dir_id: &str,
    inherited_feature: Option<&str>,
    locations: &HashMap<String, String>,
) -> Result<Element> {
    let file_id = ctx.ids.resolve(EntityKind::File, file.id.as_deref(), &file.name);
    ctx.file_ids
        .entry(file.file_name().to_lowercase())
        .or_insert_with(|| file_id.clone());
    ctx.file_ids.insert(file_id.to_lowercase(), file_id.clone());

    let component_id = format!("Component.{}", file_id);
    let mut component = ctx.component(&component_id, &file.component)?;

    let mut file_el = Element::new("File")
        .attr("Id", file_id.as_str())
        .attr("Source", ctx.source_path(&file.name))
        .yes_no("Vital", file.vital)
        .yes_no("ReadOnly", file.read_only)
        .yes_no("Hidden", file.hidden);
    file_el = apply_attributes(file_el, &file.attributes)?;

    for shortcut in &file.shortcuts {
        let directory = shortcut
            .location
            .as_ref()
            .and_then(|loc| locations.get(loc))
            .map(String::as_str)
            .unwrap_or(dir_id);
        file_el.push(file_shortcut(ctx, shortcut, directory, dir_id)?);
    }
    for permission in &file.permissions {
        file_el.push(permission_element(permission));
    }
    component.push(file_el);

    for association in &file.associations {
        component.push(association_element(ctx, association, &file_id));
    }
    for service in &file.services {
        for el in service_elements(ctx, service) {
            component.push(el);
        }
    }
    for vdir in &file.virtual_dirs {
        let (vdir_el, site) = virtual_dir_element(ctx, vdir, dir_id);
        if let Some(site) = site {
            component.push(site);
        }
        component.push(vdir_el);
    }
    if let Some(condition) = &file.condition {
        component.push(condition_element(condition));
    }

    add_unit(
        ctx,
        file.feature.as_deref().or(inherited_feature),
        UnitRef::Component(component_id),
    )?;
    Ok(component)
}

fn file_shortcut(
    ctx: &mut Context,
    shortcut: &Shortcut,
    directory: &str,
    file_dir: &str,
) -> Result<Element> {
    let id = ctx
        .ids
        .resolve(EntityKind::Shortcut, shortcut.id.as_deref(), &shortcut.name);
    let el = Element::new("Shortcut")
        .attr("Id", id)
        .attr("Name", shortcut.name.as_str())
        .attr("Directory", directory)
        .attr(
            "WorkingDirectory",
            shortcut.working_directory.as_deref().unwrap_or(file_dir),
        )
        .attr_opt("Arguments", shortcut.arguments.as_deref())
        .attr_opt("Description", shortcut.description.as_deref())
        .attr_opt("Icon", shortcut.icon_file.as_deref().map(|i| ctx.source_path(i)))
        .attr_opt("IconIndex", shortcut.icon_index.map(|i| i.to_string()))
        .attr("Advertise", yes_no(shortcut.advertise));
    apply_attributes(el, &shortcut.attributes)
}

fn permission_element(permission: &FilePermission) -> Element {
    Element::new("util:PermissionEx")
        .attr("User", permission.user.as_str())
        .attr_opt("Domain", permission.domain.as_deref())
        .yes_no("GenericAll", permission.generic_all)
        .yes_no("GenericRead", permission.generic_read)
        .yes_no("GenericWrite", permission.generic_write)
        .yes_no("GenericExecute", permission.generic_execute)
        .yes_no("Read", permission.read)
        .yes_no("Delete", permission.delete)
        .yes_no("ChangePermission", permission.change_permission)
        .yes_no("TakeOwnership", permission.take_ownership)
}

fn association_element(ctx: &Context, association: &FileAssociation, file_id: &str) -> Element {
    let mut verb = Element::new("Verb")
        .attr("Id", association.command.as_str())
        .attr("Command", association.command.as_str())
        .attr("Argument", association.arguments.as_str());
    if !association.advertise {
        verb.set_attr("TargetFile", file_id);
    }

    let extension = Element::new("Extension")
        .attr("Id", association.extension.as_str())
        .attr_opt("ContentType", association.content_type.as_deref())
        .attr("Advertise", yes_no(association.advertise))
        .child(verb);

    Element::new("ProgId")
        .attr("Id", association.prog_id_or_default())
        .attr_opt("Description", association.description.as_deref())
        .attr_opt("Icon", association.icon.as_deref().map(|i| ctx.source_path(i)))
        .attr("Advertise", yes_no(association.advertise))
        .child(extension)
}

fn service_elements(ctx: &mut Context, service: &ServiceInstaller) -> Vec<Element> {
    let id = ctx
        .ids
        .resolve(EntityKind::Service, service.id.as_deref(), &service.name);

    let mut install = Element::new("ServiceInstall")
        .attr("Id", id.as_str())
        .attr("Name", service.name.as_str())
        .attr_opt("DisplayName", service.display_name.as_deref())
        .attr_opt("Description", service.description.as_deref())
        .attr("Type", "ownProcess")
        .attr("Start", service.start_type.as_str())
        .attr("ErrorControl", service.error_control.as_str())
        .attr_opt("Account", service.account.as_deref())
        .attr_opt("Password", service.password.as_deref())
        .attr_opt("Arguments", service.arguments.as_deref())
        .yes_no("Interactive", service.interactive)
        .yes_no("Vital", service.vital)
        .attr_opt("LoadOrderGroup", service.load_order_group.as_deref())
        .yes_no("EraseDescription", service.erase_description);

    for dependency in &service.dependencies {
        install.push(Element::new("ServiceDependency").attr("Id", dependency.as_str()));
    }

    if service.has_recovery_settings() {
        let action = |a: Option<FailureAction>| {
            a.map(|a| a.as_str()).unwrap_or("none")
        };
        install.push(
            Element::new("util:ServiceConfig")
                .attr("FirstFailureActionType", action(service.first_failure))
                .attr("SecondFailureActionType", action(service.second_failure))
                .attr("ThirdFailureActionType", action(service.third_failure))
                .attr_opt(
                    "ResetPeriodInDays",
                    service.reset_period_days.map(|d| d.to_string()),
                )
                .attr_opt(
                    "RestartServiceDelayInSeconds",
                    service.restart_delay_secs.map(|s| s.to_string()),
                )
                .attr_opt("ProgramCommandLine", service.program_command_line.as_deref())
                .attr_opt("RebootMessage", service.reboot_message.as_deref()),
        );
    }

    let mut out = vec![install];
    let triggers = [
        ("Start", service.start_on),
        ("Stop", service.stop_on),
        ("Remove", service.remove_on),
    ];
    for (verb, event) in triggers {
        if let Some(event) = event {
            out.push(
                Element::new("ServiceControl")
                    .attr("Id", format!("{}.{}", id, verb))
                    .attr("Name", service.name.as_str())
                    .attr(verb, event.on.as_str())
                    .yes_no("Wait", event.wait),
            );
        }
    }
    out
}

/// Emit the site once per compilation, returning its id and, when the
/// site is created by this package, the element to place in the component
fn web_site(ctx: &mut Context, site: &WebSite) -> (String, Option<Element>) {
    let key = site
        .id
        .clone()
        .unwrap_or_else(|| site.description.to_lowercase());
    if let Some(id) = ctx.web_sites.get(&key) {
        return (id.clone(), None);
    }

    let id = ctx
        .ids
        .resolve(EntityKind::WebSite, site.id.as_deref(), &site.description);
    ctx.web_sites.insert(key, id.clone());

    let mut el = Element::new("iis:WebSite")
        .attr("Id", id.as_str())
        .attr("Description", site.description.as_str());
    for (i, address) in site.addresses.iter().enumerate() {
        el.push(
            Element::new("iis:WebAddress")
                .attr("Id", format!("{}.Address{}", id, i + 1))
                .attr("IP", address.address.as_str())
                .attr("Port", address.port.as_str())
                .attr_opt("Header", address.header.as_deref()),
        );
    }

    if site.install {
        (id, Some(el))
    } else {
        ctx.product_extras.push(el);
        (id, None)
    }
}

fn virtual_dir_element(
    ctx: &mut Context,
    vdir: &IisVirtualDir,
    dir_id: &str,
) -> (Element, Option<Element>) {
    let id = ctx
        .ids
        .resolve(EntityKind::VirtualDir, vdir.id.as_deref(), &vdir.name);
    let site = vdir.web_site.clone().unwrap_or_default();
    let (site_id, site_el) = web_site(ctx, &site);

    let mut el = Element::new("iis:WebVirtualDir")
        .attr("Id", id.as_str())
        .attr("Alias", vdir.alias.as_deref().unwrap_or(&vdir.name))
        .attr("Directory", dir_id)
        .attr("WebSite", site_id);

    if let Some(app) = &vdir.app_name {
        el.push(
            Element::new("iis:WebApplication")
                .attr("Id", format!("{}.App", id))
                .attr("Name", app.as_str()),
        );
    }
    if let Some(props) = &vdir.properties {
        el.push(
            Element::new("iis:WebDirProperties")
                .attr("Id", format!("{}.Properties", id))
                .yes_no("AnonymousAccess", props.anonymous_access)
                .yes_no("WindowsAuthentication", props.windows_authentication)
                .yes_no("BasicAuthentication", props.basic_authentication)
                .yes_no("Read", props.read)
                .yes_no("Script", props.script)
                .yes_no("Execute", props.execute),
        );
    }
    (el, site_el)
}

/// `Component.<shortcutId>` for a shortcut declared directly in a directory
pub(crate) fn dir_shortcut_component(
    ctx: &mut Context,
    shortcut: &Shortcut,
    inherited_feature: Option<&str>,
) -> Result<Element> {
    let target = shortcut.target.as_deref().ok_or_else(|| {
        WixError::Structure(format!("shortcut '{}' has no target", shortcut.name))
    })?;
    let id = ctx
        .ids
        .resolve(EntityKind::Shortcut, shortcut.id.as_deref(), &shortcut.name);
    let component_id = format!("Component.{}", id);
    let mut component = ctx.component(&component_id, &ComponentOverrides::default())?;

    let el = Element::new("Shortcut")
        .attr("Id", id.as_str())
        .attr("Name", shortcut.name.as_str())
        .attr("Target", target)
        .attr_opt("Arguments", shortcut.arguments.as_deref())
        .attr_opt("WorkingDirectory", shortcut.working_directory.as_deref())
        .attr_opt("Description", shortcut.description.as_deref())
        .attr_opt("Icon", shortcut.icon_file.as_deref().map(|i| ctx.source_path(i)))
        .attr_opt("IconIndex", shortcut.icon_index.map(|i| i.to_string()));
    component.push(apply_attributes(el, &shortcut.attributes)?);
    if let Some(condition) = &shortcut.condition {
        component.push(condition_element(condition));
    }

    add_unit(
        ctx,
        shortcut.feature.as_deref().or(inherited_feature),
        UnitRef::Component(component_id),
    )?;
    Ok(component)
}

pub(crate) fn merge_module(
    ctx: &mut Context,
    module: &MergeModule,
    inherited_feature: Option<&str>,
) -> Result<Element> {
    let id = ctx
        .ids
        .resolve(EntityKind::MergeModule, module.id.as_deref(), &module.source);
    let el = Element::new("Merge")
        .attr("Id", id.as_str())
        .attr("SourceFile", ctx.source_path(&module.source))
        .attr("DiskId", ctx.project.media.id.to_string())
        .attr("Language", ctx.lcid.to_string())
        .yes_no("FileCompression", module.file_compression);
    let el = apply_attributes(el, &module.attributes)?;

    add_unit(
        ctx,
        module.feature.as_deref().or(inherited_feature),
        UnitRef::Merge(id),
    )?;
    Ok(el)
}

fn execution_attrs(el: Element, execution: &SqlExecution) -> Element {
    el.yes_no("ExecuteOnInstall", execution.execute_on_install)
        .yes_no("ExecuteOnReinstall", execution.execute_on_reinstall)
        .yes_no("ExecuteOnUninstall", execution.execute_on_uninstall)
        .yes_no("RollbackOnInstall", execution.rollback_on_install)
        .yes_no("RollbackOnUninstall", execution.rollback_on_uninstall)
        .yes_no("ContinueOnError", execution.continue_on_error)
        .attr_opt("Sequence", execution.sequence.map(|s| s.to_string()))
}

/// Component holding a `sql:SqlDatabase` and its statements
pub(crate) fn sql_component(
    ctx: &mut Context,
    db: &SqlDatabase,
    inherited_feature: Option<&str>,
) -> Result<Element> {
    let db_id = ctx
        .ids
        .resolve(EntityKind::SqlDatabase, db.id.as_deref(), &db.database);
    let component_id = format!("Component.{}", db_id);
    let mut component = ctx.component(&component_id, &ComponentOverrides::default())?;

    let mut db_el = Element::new("sql:SqlDatabase")
        .attr("Id", db_id.as_str())
        .attr("Database", db.database.as_str())
        .attr("Server", db.server.as_str())
        .attr_opt("Instance", db.instance.as_deref())
        .attr_opt("User", db.user.as_deref())
        .yes_no("CreateOnInstall", db.create_on_install)
        .yes_no("DropOnUninstall", db.drop_on_uninstall)
        .yes_no("ContinueOnError", db.continue_on_error)
        .yes_no("ConfirmOverwrite", db.confirm_overwrite);

    for (i, string) in db.strings.iter().enumerate() {
        let raw = format!("{}.Sql{}", db_id, i + 1);
        let id = ctx.ids.resolve(EntityKind::SqlString, string.id.as_deref(), &raw);
        let el = Element::new("sql:SqlString")
            .attr("Id", id)
            .attr("SQL", string.sql.as_str());
        db_el.push(execution_attrs(el, &string.execution));
    }
    for script in &db.scripts {
        let id = ctx
            .ids
            .resolve(EntityKind::SqlScript, script.id.as_deref(), &script.source);
        let binary = ctx.binary(None, &script.source);
        let el = Element::new("sql:SqlScript")
            .attr("Id", id)
            .attr("BinaryKey", binary);
        db_el.push(execution_attrs(el, &script.execution));
    }
    component.push(db_el);

    add_unit(
        ctx,
        db.feature.as_deref().or(inherited_feature),
        UnitRef::Component(component_id),
    )?;
    Ok(component)
}

/// `Registry.<n>` components, one per (root, key, feature, bitness,
/// condition) group in first-seen order
pub(crate) fn registry_components(ctx: &mut Context) -> Result<Vec<Element>> {
    let project = ctx.project;
    let mut groups: Vec<Vec<&RegValue>> = Vec::new();
    for value in &project.reg_values {
        let same_group = |other: &RegValue| {
            other.root == value.root
                && other.key.eq_ignore_ascii_case(&value.key)
                && other.feature == value.feature
                && other.win64 == value.win64
                && other.condition == value.condition
        };
        match groups.iter_mut().find(|g| same_group(g[0])) {
            Some(group) => group.push(value),
            None => groups.push(vec![value]),
        }
    }

    let mut out = Vec::new();
    for (n, group) in groups.into_iter().enumerate() {
        let first = group[0];
        let component_id = format!("Registry.{}", n + 1);
        let mut component = ctx.component(&component_id, &ComponentOverrides::default())?;
        if let Some(win64) = first.win64 {
            component.set_attr("Win64", yes_no(win64));
        }

        let mut key = Element::new("RegistryKey")
            .attr("Root", first.root.as_str())
            .attr("Key", first.key.as_str());
        for (i, value) in group.iter().enumerate() {
            let raw = value.name.as_deref().unwrap_or(&value.key);
            let id = ctx.ids.resolve(EntityKind::RegValue, value.id.as_deref(), raw);
            let mut el = Element::new("RegistryValue")
                .attr("Id", id)
                .attr_opt("Name", value.name.as_deref())
                .attr("Value", value.value.as_str())
                .attr("Type", value.value_type.as_str());
            if i == 0 {
                el.set_attr("KeyPath", "yes");
            }
            key.push(apply_attributes(el, &value.attributes)?);
        }
        component.push(key);
        if let Some(condition) = &first.condition {
            component.push(condition_element(condition));
        }

        add_unit(
            ctx,
            first.feature.as_deref(),
            UnitRef::Component(component_id),
        )?;
        out.push(component);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::features;
    use crate::model::{
        Feature, Project, RegistryHive, SqlScript, SqlString, SvcEvent,
        SvcEventType, WebAddress,
    };

    fn context(project: &Project) -> Context<'_> {
        let mut ctx = Context::new(project, 1033, None);
        features::allocate_ids(&mut ctx, &project.features);
        ctx
    }

    #[test]
    fn test_file_component_with_shortcut_and_condition() {
        let project = Project::new("App");
        let mut ctx = context(&project);
        let mut locations = HashMap::new();
        locations.insert("%Desktop%".to_string(), "DesktopFolder".to_string());

        let file = File::new(r"bin\app.exe", [Shortcut::new("App", "%Desktop%").into()])
            .condition("VersionNT >= 600");
        let el = file_component(&mut ctx, &file, "INSTALLDIR", None, &locations).unwrap();

        assert_eq!(el.id(), Some("Component.app.exe"));
        let file_el = el.first_named("File").unwrap();
        assert_eq!(file_el.id(), Some("app.exe"));
        let shortcut = file_el.first_named("Shortcut").unwrap();
        assert_eq!(shortcut.get_attr("Directory"), Some("DesktopFolder"));
        assert_eq!(shortcut.get_attr("WorkingDirectory"), Some("INSTALLDIR"));
        assert_eq!(el.first_named("Condition").unwrap().text_content(), "VersionNT >= 600");
        assert_eq!(ctx.units.default, vec![UnitRef::Component("Component.app.exe".into())]);
        assert_eq!(ctx.file_ids.get("app.exe").map(String::as_str), Some("app.exe"));
    }

    #[test]
    fn test_same_file_name_gets_suffixed_id() {
        let project = Project::new("App");
        let mut ctx = context(&project);
        let locations = HashMap::new();
        let a = file_component(&mut ctx, &File::new("a/readme.txt", []), "A", None, &locations);
        let b = file_component(&mut ctx, &File::new("b/readme.txt", []), "B", None, &locations);
        assert_eq!(a.unwrap().id(), Some("Component.readme.txt"));
        assert_eq!(b.unwrap().id(), Some("Component.readme.txt.1"));
    }

    #[test]
    fn test_service_installer_elements() {
        let project = Project::new("App");
        let mut ctx = context(&project);
        let mut service = ServiceInstaller::new("MySvc")
            .display_name("My Service")
            .depends_on("RpcSs")
            .remove_on(Some(SvcEvent::new(SvcEventType::Uninstall)));
        service.first_failure = Some(FailureAction::Restart);

        let elements = service_elements(&mut ctx, &service);
        let install = &elements[0];
        assert_eq!(install.get_attr("Start"), Some("auto"));
        assert_eq!(install.get_attr("Type"), Some("ownProcess"));
        assert!(install.has_child("ServiceDependency"));
        let config = install.first_named("util:ServiceConfig").unwrap();
        assert_eq!(config.get_attr("FirstFailureActionType"), Some("restart"));
        assert_eq!(config.get_attr("SecondFailureActionType"), Some("none"));

        let ids: Vec<_> = elements[1..].iter().filter_map(|e| e.id()).collect();
        assert_eq!(ids, vec!["MySvc.Start", "MySvc.Stop", "MySvc.Remove"]);
        assert_eq!(elements[2].get_attr("Wait"), Some("yes"));
        assert!(elements[3].get_attr("Wait").is_none());
    }

    #[test]
    fn test_web_site_locator_is_shared() {
        let project = Project::new("App");
        let mut ctx = context(&project);
        let site = WebSite::new("Shop").address(WebAddress::new("[IIS_SITE_ADDRESS]", "8080"));
        let vdir = IisVirtualDir::new("shop").web_site(site.clone()).app_name("Shop");

        let (el, installed) = virtual_dir_element(&mut ctx, &vdir, "INSTALLDIR");
        assert!(installed.is_none());
        assert_eq!(el.get_attr("WebSite"), Some("Shop"));
        assert!(el.has_child("iis:WebApplication"));
        let (_, again) = virtual_dir_element(&mut ctx, &IisVirtualDir::new("api").web_site(site), "X");
        assert!(again.is_none());

        assert_eq!(ctx.product_extras.len(), 1);
        let address = ctx.product_extras[0].first_named("iis:WebAddress").unwrap();
        assert_eq!(address.get_attr("IP"), Some("[IIS_SITE_ADDRESS]"));
        assert_eq!(address.get_attr("Port"), Some("8080"));
    }

    #[test]
    fn test_dir_shortcut_requires_target() {
        let project = Project::new("App");
        let mut ctx = context(&project);
        let err = dir_shortcut_component(&mut ctx, &Shortcut::new("X", "%Desktop%"), None);
        assert!(matches!(err, Err(WixError::Structure(_))));

        let el = dir_shortcut_component(
            &mut ctx,
            &Shortcut::to_target("Docs", "[INSTALLDIR]docs.html"),
            None,
        )
        .unwrap();
        assert_eq!(el.id(), Some("Component.Docs"));
        assert_eq!(
            el.first_named("Shortcut").unwrap().get_attr("Target"),
            Some("[INSTALLDIR]docs.html")
        );
    }

    #[test]
    fn test_merge_module_goes_to_feature() {
        let project = Project::with_items("App", [Feature::new("Runtime").into()]);
        let mut ctx = context(&project);
        let el = merge_module(&mut ctx, &MergeModule::new(r"msm\crt.msm"), Some("Runtime")).unwrap();
        assert_eq!(el.get_attr("DiskId"), Some("1"));
        assert_eq!(el.get_attr("Language"), Some("1033"));
        assert_eq!(
            ctx.units.by_feature.get("Runtime"),
            Some(&vec![UnitRef::Merge("crt.msm".into())])
        );
    }

    #[test]
    fn test_sql_component_declares_script_binary() {
        let project = Project::new("App");
        let mut ctx = context(&project);
        let db = SqlDatabase::new("Shop", "(local)")
            .create_on_install()
            .string(SqlString::new("CREATE TABLE T (Id int)", SqlExecution::on_install()))
            .script(SqlScript::new(r"sql\seed.sql", SqlExecution::on_install()));

        let el = sql_component(&mut ctx, &db, None).unwrap();
        let db_el = el.first_named("sql:SqlDatabase").unwrap();
        assert_eq!(db_el.get_attr("CreateOnInstall"), Some("yes"));
        assert_eq!(
            db_el.first_named("sql:SqlString").unwrap().get_attr("ExecuteOnInstall"),
            Some("yes")
        );
        assert_eq!(
            db_el.first_named("sql:SqlScript").unwrap().get_attr("BinaryKey"),
            Some("seed.sql")
        );
        assert_eq!(ctx.binaries.len(), 1);
    }

    #[test]
    fn test_registry_grouping() {
        let project = Project::with_items(
            "App",
            [
                RegValue::new(RegistryHive::LocalMachine, r"Software\Acme", "Path", "[INSTALLDIR]").into(),
                RegValue::new(RegistryHive::LocalMachine, r"software\acme", "Version", "1").integer().into(),
                RegValue::new(RegistryHive::CurrentUser, r"Software\Acme", "Theme", "dark").into(),
            ],
        );
        let mut ctx = context(&project);
        let components = registry_components(&mut ctx).unwrap();

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].id(), Some("Registry.1"));
        let values: Vec<_> = components[0]
            .first_named("RegistryKey")
            .unwrap()
            .elements_named("RegistryValue")
            .collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].get_attr("KeyPath"), Some("yes"));
        assert!(values[1].get_attr("KeyPath").is_none());
        assert_eq!(values[1].get_attr("Type"), Some("integer"));
    }
}
