use serde::{Deserialize, Serialize};

/// An IIS virtual directory served from the owning file's directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IisVirtualDir {
    pub id: Option<String>,
    pub name: String,
    /// URL alias, defaults to the name
    pub alias: Option<String>,
    /// Creates a web application rooted at the virtual directory
    pub app_name: Option<String>,
    /// Site hosting the directory, `Default Web Site` when unset
    pub web_site: Option<WebSite>,
    pub properties: Option<WebDirProperties>,
}

impl IisVirtualDir {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn web_site(mut self, site: WebSite) -> Self {
        self.web_site = Some(site);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSite {
    pub id: Option<String>,
    pub description: String,
    /// Create the site on install instead of locating an existing one
    pub install: bool,
    pub addresses: Vec<WebAddress>,
}

impl Default for WebSite {
    fn default() -> Self {
        Self {
            id: None,
            description: "Default Web Site".to_string(),
            install: false,
            addresses: vec![WebAddress::default()],
        }
    }
}

impl WebSite {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn installed(mut self) -> Self {
        self.install = true;
        self
    }

    pub fn address(mut self, address: WebAddress) -> Self {
        if self.addresses == vec![WebAddress::default()] {
            self.addresses.clear();
        }
        self.addresses.push(address);
        self
    }
}

/// Binding of a web site. Values may be installer properties such as
/// `[IIS_SITE_PORT]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebAddress {
    pub address: String,
    pub port: String,
    pub header: Option<String>,
}

impl Default for WebAddress {
    fn default() -> Self {
        Self {
            address: "*".to_string(),
            port: "80".to_string(),
            header: None,
        }
    }
}

impl WebAddress {
    pub fn new(address: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: port.into(),
            header: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDirProperties {
    pub anonymous_access: Option<bool>,
    pub windows_authentication: Option<bool>,
    pub basic_authentication: Option<bool>,
    pub read: Option<bool>,
    pub script: Option<bool>,
    pub execute: Option<bool>,
}
