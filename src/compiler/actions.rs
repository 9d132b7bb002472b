//! Custom actions and their sequence table entries

use super::{apply_attributes, Context, ManagedPackage, UTIL_EXTENSION};
use crate::error::{Result, WixError};
use crate::id::EntityKind;
use crate::model::{Action, ActionKind, ManagedAction};
use crate::sequence::{Sequence, When};
use crate::xml::Element;
use log::debug;
use std::path::{Path, PathBuf};

/// Property read by the quiet command-line runner of immediate actions
pub const QUIET_EXEC_PROPERTY: &str = "WixQuietExecCmdLine";

/// `<Custom>` entries grouped by sequence table
#[derive(Debug, Clone, Default)]
pub(crate) struct Sequences {
    entries: Vec<(&'static str, Element)>,
}

impl Sequences {
    pub fn schedule(
        &mut self,
        sequence: Sequence,
        action_id: &str,
        when: When,
        anchor: &str,
        condition: Option<&str>,
    ) {
        for table in sequence.tables() {
            let mut custom = Element::new("Custom")
                .attr("Action", action_id)
                .attr(when.as_str(), anchor);
            if let Some(condition) = condition.filter(|c| !c.is_empty()) {
                custom = custom.text(condition);
            }
            self.entries.push((table, custom));
        }
    }

    /// Add a non-`Custom` entry such as `RemoveExistingProducts`
    pub fn push(&mut self, table: &'static str, element: Element) {
        self.entries.push((table, element));
    }

    pub fn merge(&mut self, other: Sequences) {
        self.entries.extend(other.entries);
    }

    /// One element per non-empty table, in canonical table order
    pub fn into_elements(self) -> Vec<Element> {
        let all = Sequence::INSTALL_UI_SEQUENCE
            + Sequence::INSTALL_EXECUTE_SEQUENCE
            + Sequence::ADMIN_UI_SEQUENCE
            + Sequence::ADMIN_EXECUTE_SEQUENCE
            + Sequence::ADVERTISE_EXECUTE_SEQUENCE;

        all.tables()
            .filter_map(|table| {
                let children: Vec<Element> = self
                    .entries
                    .iter()
                    .filter(|(t, _)| *t == table)
                    .map(|(_, el)| el.clone())
                    .collect();
                (!children.is_empty()).then(|| Element::new(table).children(children))
            })
            .collect()
    }
}

pub(crate) struct ActionsOutput {
    pub custom_actions: Vec<Element>,
    pub sequences: Sequences,
}

pub(crate) fn process(ctx: &mut Context) -> Result<ActionsOutput> {
    let mut custom_actions = Vec::new();
    let mut sequences = Sequences::default();
    let mut previous: Option<String> = None;

    let project = ctx.project;
    for action in &project.actions {
        let id = ctx
            .ids
            .resolve(EntityKind::Action, action.id.as_deref(), &action.base_name());
        let anchor = action
            .step
            .resolve(previous.as_deref())
            .map(str::to_string)
            .ok_or_else(|| {
                WixError::Structure(format!(
                    "action '{}' is scheduled after the previous action but none precedes it",
                    id
                ))
            })?;
        let condition = action.condition.as_ref().map(|c| c.as_str());

        if let ActionKind::CmdLine { app_path, args } = &action.kind {
            let setter_id = format!("Set_{}_CmdLine", id);
            let property = if action.execute.is_deferred() {
                id.clone()
            } else {
                QUIET_EXEC_PROPERTY.to_string()
            };
            custom_actions.push(
                Element::new("CustomAction")
                    .attr("Id", setter_id.as_str())
                    .attr("Property", property)
                    .attr("Value", command_line(app_path, args.as_deref())),
            );
            let exec = Element::new("CustomAction")
                .attr("Id", id.as_str())
                .attr("BinaryKey", "WixCA")
                .attr("DllEntry", "WixQuietExec");
            custom_actions.push(common_attributes(exec, action)?);

            sequences.schedule(action.sequence, &setter_id, action.when, &anchor, condition);
            sequences.schedule(action.sequence, &id, When::After, &setter_id, condition);
            if !ctx.extra_extensions.iter().any(|e| e == UTIL_EXTENSION) {
                ctx.extra_extensions.push(UTIL_EXTENSION.to_string());
            }
        } else {
            let el = custom_action(ctx, &id, action)?;
            custom_actions.push(common_attributes(el, action)?);
            sequences.schedule(action.sequence, &id, action.when, &anchor, condition);
        }

        debug!("Custom action '{}' {} '{}'", id, action.when.as_str(), anchor);
        previous = Some(id);
    }

    Ok(ActionsOutput {
        custom_actions,
        sequences,
    })
}

fn command_line(app_path: &str, args: Option<&str>) -> String {
    match args {
        Some(args) => format!("\"{}\" {}", app_path, args),
        None => format!("\"{}\"", app_path),
    }
}

fn common_attributes(el: Element, action: &Action) -> Result<Element> {
    let el = el
        .attr("Return", action.return_type.as_str())
        .attr("Execute", action.execute.as_str())
        .yes_no("Impersonate", action.impersonate);
    apply_attributes(el, &action.attributes)
}

fn custom_action(ctx: &mut Context, id: &str, action: &Action) -> Result<Element> {
    let el = Element::new("CustomAction").attr("Id", id);
    let el = match &action.kind {
        ActionKind::SetProperty { property, value } => el
            .attr("Property", property.as_str())
            .attr("Value", value.as_str()),
        ActionKind::ScriptFile { script, procedure } => {
            let binary = ctx.binary(None, script);
            el.attr("BinaryKey", binary)
                .attr("VBScriptCall", procedure.as_str())
        }
        ActionKind::Script { code } => el.attr("Script", "vbscript").cdata(code.as_str()),
        ActionKind::Managed(managed) => {
            let binary = managed_binary(ctx, managed);
            el.attr("BinaryKey", binary)
                .attr("DllEntry", managed.method.as_str())
        }
        ActionKind::PathFile {
            app_path,
            args,
            working_dir,
        } => el
            .attr("Directory", working_dir.as_deref().unwrap_or("TARGETDIR"))
            .attr("ExeCommand", command_line(app_path, args.as_deref())),
        ActionKind::InstalledFile { file, args } => {
            let file_id = lookup_file(ctx, file)?;
            el.attr("FileKey", file_id)
                .attr("ExeCommand", args.as_deref().unwrap_or(""))
        }
        ActionKind::BinaryFile { binary, args } => {
            let key = match ctx.binary_ids.get(&binary.to_lowercase()) {
                Some(id) => id.clone(),
                None => ctx.binary(None, binary),
            };
            el.attr("BinaryKey", key)
                .attr("ExeCommand", args.as_deref().unwrap_or(""))
        }
        ActionKind::CmdLine { .. } => {
            return Err(WixError::Structure(
                "command-line actions are emitted as an action pair".to_string(),
            ))
        }
    };
    Ok(el)
}

/// Look an installed file up by id, source path or file name
fn lookup_file(ctx: &Context, file: &str) -> Result<String> {
    let name = file.rsplit(['\\', '/']).find(|s| !s.is_empty()).unwrap_or(file);
    ctx.file_ids
        .get(&file.to_lowercase())
        .or_else(|| ctx.file_ids.get(&name.to_lowercase()))
        .cloned()
        .ok_or_else(|| WixError::Structure(format!("installed file '{}' not found", file)))
}

/// Declare the packaged custom action binary of an assembly once
fn managed_binary(ctx: &mut Context, managed: &ManagedAction) -> String {
    let key = managed.assembly.replace('\\', "/").to_lowercase();
    if let Some(id) = ctx.binary_ids.get(&key) {
        return id.clone();
    }

    let stem = Path::new(&managed.assembly.replace('\\', "/"))
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| managed.assembly.clone());
    let file_name = format!("{}.CA.dll", stem);
    let id = ctx.ids.allocate(EntityKind::Binary, &file_name);

    let out_dir = ctx
        .managed_output_dir
        .clone()
        .or_else(|| ctx.project.source_base_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let output = out_dir.join(&file_name);

    ctx.binaries.push(
        Element::new("Binary")
            .attr("Id", id.as_str())
            .attr("SourceFile", output.to_string_lossy().to_string()),
    );
    let project = ctx.project;
    let package = ManagedPackage {
        binary_id: id.clone(),
        assembly: project.source_path(&managed.assembly),
        ref_assemblies: managed
            .ref_assemblies
            .iter()
            .map(|r| project.source_path(r))
            .collect(),
        pdb: managed.pdb.as_deref().map(|p| project.source_path(p)),
        output,
    };
    ctx.managed_packages.push(package);
    ctx.binary_ids.insert(key, id.clone());
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Project;
    use crate::sequence::{Execute, Step};

    fn run(project: &Project) -> Result<(ActionsOutput, Vec<Element>)> {
        let mut ctx = Context::new(project, 1033, Some(PathBuf::from("/tmp/ca")));
        let out = process(&mut ctx)?;
        Ok((out, ctx.binaries))
    }

    #[test]
    fn test_running_cursor() {
        let project = Project::with_items(
            "App",
            [
                Action::set_property("A", "1")
                    .at(When::Before, Step::install_finalize())
                    .into(),
                Action::script("MsgBox 1").at(When::After, Step::PreviousAction).into(),
            ],
        );
        let (out, _) = run(&project).unwrap();
        let tables = out.sequences.into_elements();
        assert_eq!(tables.len(), 1);
        let customs: Vec<_> = tables[0].elements().collect();
        assert_eq!(customs[0].get_attr("Before"), Some("InstallFinalize"));
        assert_eq!(customs[1].get_attr("After"), Some("Set_A"));
    }

    #[test]
    fn test_previous_action_without_predecessor() {
        let project = Project::with_items(
            "App",
            [Action::script("x").at(When::After, Step::PreviousAction).into()],
        );
        assert!(matches!(run(&project), Err(WixError::Structure(_))));
    }

    #[test]
    fn test_managed_actions_share_binary() {
        let project = Project::with_items(
            "App",
            [
                Action::managed("First", r"bin\Actions.dll").into(),
                Action::elevated_managed("Second", "bin/actions.dll").into(),
            ],
        );
        let (out, binaries) = run(&project).unwrap();
        assert_eq!(binaries.len(), 1);
        assert_eq!(binaries[0].id(), Some("Actions.CA.dll"));
        assert_eq!(out.custom_actions[0].get_attr("DllEntry"), Some("First"));
        assert_eq!(out.custom_actions[1].get_attr("BinaryKey"), Some("Actions.CA.dll"));
        assert_eq!(out.custom_actions[1].get_attr("Execute"), Some("deferred"));
        assert_eq!(out.custom_actions[1].get_attr("Impersonate"), Some("no"));
    }

    #[test]
    fn test_cmd_line_action_pair() {
        let project = Project::with_items(
            "App",
            [Action::cmd_line("notepad.exe", "readme.txt")
                .sequence(Sequence::INSTALL_UI_SEQUENCE + Sequence::INSTALL_EXECUTE_SEQUENCE)
                .into()],
        );
        let (out, _) = run(&project).unwrap();
        let setter = &out.custom_actions[0];
        assert_eq!(setter.get_attr("Property"), Some(QUIET_EXEC_PROPERTY));
        assert_eq!(setter.get_attr("Value"), Some("\"notepad.exe\" readme.txt"));
        assert_eq!(out.custom_actions[1].get_attr("DllEntry"), Some("WixQuietExec"));

        let tables = out.sequences.into_elements();
        assert_eq!(tables[0].name, "InstallUISequence");
        assert_eq!(tables[1].name, "InstallExecuteSequence");
        let exec = tables[1].elements().nth(1).unwrap();
        assert_eq!(exec.get_attr("After"), Some("Set_notepad_CmdLine"));
    }

    #[test]
    fn test_deferred_cmd_line_uses_action_id() {
        let project = Project::with_items(
            "App",
            [Action::cmd_line("setup.exe", "").id("RunSetup").execute(Execute::Deferred).into()],
        );
        let (out, _) = run(&project).unwrap();
        assert_eq!(out.custom_actions[0].get_attr("Property"), Some("RunSetup"));
        assert_eq!(out.custom_actions[0].get_attr("Value"), Some("\"setup.exe\""));
    }

    #[test]
    fn test_installed_file_must_exist() {
        let project = Project::with_items("App", [Action::installed_file("app.exe", "/s").into()]);
        assert!(matches!(run(&project), Err(WixError::Structure(_))));
    }

    #[test]
    fn test_not_in_sequence() {
        let project = Project::with_items(
            "App",
            [Action::script("x").sequence(Sequence::NOT_IN_SEQUENCE).into()],
        );
        let (out, _) = run(&project).unwrap();
        assert_eq!(out.custom_actions.len(), 1);
        assert!(out.sequences.into_elements().is_empty());
    }
}
