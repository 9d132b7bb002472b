use serde::{Deserialize, Serialize};

/// A SQL Server database created or used by the package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlDatabase {
    pub id: Option<String>,
    pub database: String,
    pub server: String,
    pub instance: Option<String>,
    pub user: Option<String>,
    pub create_on_install: Option<bool>,
    pub drop_on_uninstall: Option<bool>,
    pub continue_on_error: Option<bool>,
    pub confirm_overwrite: Option<bool>,
    pub feature: Option<String>,
    pub strings: Vec<SqlString>,
    pub scripts: Vec<SqlScript>,
}

impl SqlDatabase {
    pub fn new(database: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn create_on_install(mut self) -> Self {
        self.create_on_install = Some(true);
        self
    }

    pub fn drop_on_uninstall(mut self) -> Self {
        self.drop_on_uninstall = Some(true);
        self
    }

    pub fn string(mut self, sql: SqlString) -> Self {
        self.strings.push(sql);
        self
    }

    pub fn script(mut self, script: SqlScript) -> Self {
        self.scripts.push(script);
        self
    }
}

/// When a SQL statement or script runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlExecution {
    pub execute_on_install: Option<bool>,
    pub execute_on_reinstall: Option<bool>,
    pub execute_on_uninstall: Option<bool>,
    pub rollback_on_install: Option<bool>,
    pub rollback_on_uninstall: Option<bool>,
    pub continue_on_error: Option<bool>,
    pub sequence: Option<u32>,
}

impl SqlExecution {
    pub fn on_install() -> Self {
        Self {
            execute_on_install: Some(true),
            ..Self::default()
        }
    }
}

/// An inline SQL statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlString {
    pub id: Option<String>,
    pub sql: String,
    #[serde(flatten)]
    pub execution: SqlExecution,
}

impl SqlString {
    pub fn new(sql: impl Into<String>, execution: SqlExecution) -> Self {
        Self {
            id: None,
            sql: sql.into(),
            execution,
        }
    }
}

/// A SQL script file embedded as a binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlScript {
    pub id: Option<String>,
    pub source: String,
    #[serde(flatten)]
    pub execution: SqlExecution,
}

impl SqlScript {
    pub fn new(source: impl Into<String>, execution: SqlExecution) -> Self {
        Self {
            id: None,
            source: source.into(),
            execution,
        }
    }
}
