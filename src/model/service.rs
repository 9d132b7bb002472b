use serde::{Deserialize, Serialize};

/// Installs the owning file as a Windows service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInstaller {
    pub id: Option<String>,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub start_type: SvcStartType,
    pub error_control: SvcErrorControl,
    pub account: Option<String>,
    pub password: Option<String>,
    pub arguments: Option<String>,
    pub interactive: Option<bool>,
    pub vital: Option<bool>,
    pub load_order_group: Option<String>,
    pub erase_description: Option<bool>,
    /// Names of services this one depends on
    pub dependencies: Vec<String>,
    pub start_on: Option<SvcEvent>,
    pub stop_on: Option<SvcEvent>,
    pub remove_on: Option<SvcEvent>,
    pub first_failure: Option<FailureAction>,
    pub second_failure: Option<FailureAction>,
    pub third_failure: Option<FailureAction>,
    pub reset_period_days: Option<u32>,
    pub restart_delay_secs: Option<u32>,
    pub program_command_line: Option<String>,
    pub reboot_message: Option<String>,
}

impl ServiceInstaller {
    /// A service started on install, stopped on install/uninstall and
    /// removed on uninstall
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_on: Some(SvcEvent::new(SvcEventType::Install)),
            stop_on: Some(SvcEvent::new(SvcEventType::Both).wait(true)),
            remove_on: Some(SvcEvent::new(SvcEventType::Uninstall).wait(true)),
            ..Self::default()
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn start_type(mut self, start_type: SvcStartType) -> Self {
        self.start_type = start_type;
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn arguments(mut self, args: impl Into<String>) -> Self {
        self.arguments = Some(args.into());
        self
    }

    pub fn depends_on(mut self, service: impl Into<String>) -> Self {
        self.dependencies.push(service.into());
        self
    }

    pub fn start_on(mut self, event: Option<SvcEvent>) -> Self {
        self.start_on = event;
        self
    }

    pub fn stop_on(mut self, event: Option<SvcEvent>) -> Self {
        self.stop_on = event;
        self
    }

    pub fn remove_on(mut self, event: Option<SvcEvent>) -> Self {
        self.remove_on = event;
        self
    }

    pub fn has_recovery_settings(&self) -> bool {
        self.first_failure.is_some()
            || self.second_failure.is_some()
            || self.third_failure.is_some()
            || self.reset_period_days.is_some()
            || self.restart_delay_secs.is_some()
            || self.program_command_line.is_some()
            || self.reboot_message.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvcStartType {
    #[default]
    Auto,
    Demand,
    Disabled,
    Boot,
    System,
}

impl SvcStartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SvcStartType::Auto => "auto",
            SvcStartType::Demand => "demand",
            SvcStartType::Disabled => "disabled",
            SvcStartType::Boot => "boot",
            SvcStartType::System => "system",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvcErrorControl {
    Ignore,
    #[default]
    Normal,
    Critical,
}

impl SvcErrorControl {
    pub fn as_str(&self) -> &'static str {
        match self {
            SvcErrorControl::Ignore => "ignore",
            SvcErrorControl::Normal => "normal",
            SvcErrorControl::Critical => "critical",
        }
    }
}

/// When a service control operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvcEventType {
    Install,
    Uninstall,
    Both,
}

impl SvcEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SvcEventType::Install => "install",
            SvcEventType::Uninstall => "uninstall",
            SvcEventType::Both => "both",
        }
    }
}

/// A start, stop or remove trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvcEvent {
    pub on: SvcEventType,
    #[serde(default)]
    pub wait: Option<bool>,
}

impl SvcEvent {
    pub fn new(on: SvcEventType) -> Self {
        Self { on, wait: None }
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = Some(wait);
        self
    }
}

/// Recovery action after a service failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureAction {
    None,
    Reboot,
    Restart,
    RunCommand,
}

impl FailureAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureAction::None => "none",
            FailureAction::Reboot => "reboot",
            FailureAction::Restart => "restart",
            FailureAction::RunCommand => "runCommand",
        }
    }
}
