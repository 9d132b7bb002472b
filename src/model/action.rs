use super::Attributes;
use crate::condition::Condition;
use crate::sequence::{Execute, ReturnType, Sequence, Step, When};
use serde::{Deserialize, Serialize};

/// A custom action scheduled into one or more sequence tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub id: Option<String>,
    /// Seed of the generated id
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub when: When,
    #[serde(default)]
    pub step: Step,
    #[serde(default)]
    pub sequence: Sequence,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub return_type: ReturnType,
    #[serde(default)]
    pub execute: Execute,
    #[serde(default)]
    pub impersonate: Option<bool>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(flatten)]
    pub kind: ActionKind,
}

/// What a custom action does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Assign a property, value may reference other properties
    SetProperty { property: String, value: String },
    /// Call a procedure of a VBScript file stored as a binary
    ScriptFile { script: String, procedure: String },
    /// Run inline VBScript
    Script { code: String },
    /// Call a method of a managed assembly packaged as a native DLL
    Managed(ManagedAction),
    /// Run a command line quietly through WixQuietExec
    CmdLine {
        app_path: String,
        #[serde(default)]
        args: Option<String>,
    },
    /// Run an executable given by path on the target machine
    PathFile {
        app_path: String,
        #[serde(default)]
        args: Option<String>,
        #[serde(default)]
        working_dir: Option<String>,
    },
    /// Run a file installed by this package
    InstalledFile {
        /// File id or source file name
        file: String,
        #[serde(default)]
        args: Option<String>,
    },
    /// Run an executable stored in the `Binary` table
    BinaryFile {
        binary: String,
        #[serde(default)]
        args: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagedAction {
    /// Entry point exported by the packaged DLL
    pub method: String,
    /// Path of the managed assembly
    pub assembly: String,
    /// Assemblies packaged alongside the main one
    pub ref_assemblies: Vec<String>,
    pub pdb: Option<String>,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            id: None,
            name: None,
            when: When::default(),
            step: Step::default(),
            sequence: Sequence::default(),
            condition: None,
            return_type: ReturnType::default(),
            execute: Execute::default(),
            impersonate: None,
            attributes: Attributes::new(),
            kind,
        }
    }

    pub fn set_property(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ActionKind::SetProperty {
            property: property.into(),
            value: value.into(),
        })
    }

    pub fn script_file(script: impl Into<String>, procedure: impl Into<String>) -> Self {
        Self::new(ActionKind::ScriptFile {
            script: script.into(),
            procedure: procedure.into(),
        })
    }

    pub fn script(code: impl Into<String>) -> Self {
        Self::new(ActionKind::Script { code: code.into() })
    }

    pub fn managed(method: impl Into<String>, assembly: impl Into<String>) -> Self {
        Self::new(ActionKind::Managed(ManagedAction {
            method: method.into(),
            assembly: assembly.into(),
            ..ManagedAction::default()
        }))
    }

    /// Deferred managed action running with system privileges
    pub fn elevated_managed(method: impl Into<String>, assembly: impl Into<String>) -> Self {
        let mut action = Self::managed(method, assembly);
        action.execute = Execute::Deferred;
        action.impersonate = Some(false);
        action
    }

    pub fn cmd_line(app_path: impl Into<String>, args: impl Into<String>) -> Self {
        Self::new(ActionKind::CmdLine {
            app_path: app_path.into(),
            args: non_empty(args.into()),
        })
    }

    pub fn path_file(app_path: impl Into<String>, args: impl Into<String>) -> Self {
        Self::new(ActionKind::PathFile {
            app_path: app_path.into(),
            args: non_empty(args.into()),
            working_dir: None,
        })
    }

    pub fn installed_file(file: impl Into<String>, args: impl Into<String>) -> Self {
        Self::new(ActionKind::InstalledFile {
            file: file.into(),
            args: non_empty(args.into()),
        })
    }

    pub fn binary_file(binary: impl Into<String>, args: impl Into<String>) -> Self {
        Self::new(ActionKind::BinaryFile {
            binary: binary.into(),
            args: non_empty(args.into()),
        })
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Schedule relative to `step`
    pub fn at(mut self, when: When, step: Step) -> Self {
        self.when = when;
        self.step = step;
        self
    }

    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn condition(mut self, condition: impl Into<Condition>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn return_type(mut self, return_type: ReturnType) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn execute(mut self, execute: Execute) -> Self {
        self.execute = execute;
        self
    }

    pub fn impersonate(mut self, impersonate: bool) -> Self {
        self.impersonate = Some(impersonate);
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Reference assemblies of a managed action
    pub fn ref_assembly(mut self, path: impl Into<String>) -> Self {
        if let ActionKind::Managed(managed) = &mut self.kind {
            managed.ref_assemblies.push(path.into());
        }
        self
    }

    /// Name the generated id is derived from
    pub fn base_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match &self.kind {
            ActionKind::SetProperty { property, .. } => format!("Set_{}", property),
            ActionKind::ScriptFile { procedure, .. } => procedure.clone(),
            ActionKind::Script { .. } => "Script".to_string(),
            ActionKind::Managed(m) => m.method.clone(),
            ActionKind::CmdLine { app_path, .. } | ActionKind::PathFile { app_path, .. } => {
                file_stem(app_path).to_string()
            }
            ActionKind::InstalledFile { file, .. } => file_stem(file).to_string(),
            ActionKind::BinaryFile { binary, .. } => binary.clone(),
        }
    }

    pub fn managed_action(&self) -> Option<&ManagedAction> {
        match &self.kind {
            ActionKind::Managed(m) => Some(m),
            _ => None,
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['\\', '/']).next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}
