// file: src/config/mod.rs
// version: 2.0.0
// guid: a1b2c3d4-e5f6-7a8b-9c0d-1e2f3a4b5c6d

//! Configuration module for the tenancy agent
//!
//! Handles loading and validation of the tenant layout and the control panel
//! connection settings.

pub mod loader;

pub use loader::ConfigLoader;

use crate::error::TenancyError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Transport protocol used to reach the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "https")]
    Https,
}

impl Protocol {
    /// Get the protocol as a URL scheme
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    /// Protocol implied by a port: the plain-text cPanel, WHM and webmail
    /// ports and port 80 are http, everything else https.
    pub fn for_port(port: u16) -> Self {
        match port {
            80 | 2082 | 2086 | 2095 => Protocol::Http,
            _ => Protocol::Https,
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = TenancyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(TenancyError::validation(format!(
                "Unknown protocol: {} (expected http or https)",
                s
            ))),
        }
    }
}

/// Shape in which panel responses are handed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Parsed JSON document from the json-api endpoint
    Json,
    /// Raw XML text from the xml-api endpoint
    Xml,
    /// Parsed XML element tree
    #[serde(alias = "simplexml", alias = "object")]
    Element,
    /// XML normalized into nested maps and lists
    Array,
}

impl ResponseFormat {
    /// Get the format name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
            ResponseFormat::Element => "element",
            ResponseFormat::Array => "array",
        }
    }

    /// API path segment serving this format
    pub fn api_path(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json-api",
            _ => "xml-api",
        }
    }
}

impl std::str::FromStr for ResponseFormat {
    type Err = TenancyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            "element" | "simplexml" | "object" => Ok(ResponseFormat::Element),
            "array" => Ok(ResponseFormat::Array),
            _ => Err(TenancyError::validation(format!(
                "Unknown output format: {} (expected json, xml, element or array)",
                s
            ))),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// Directory holding one sub-directory per tenant
    pub tenants_dir: PathBuf,
    /// Template tenant cloned for new tenants; never removable
    pub default_tenant: String,
    /// Config file inside each tenant directory holding the database entries
    pub config_file: String,
    /// Prefix prepended to the tenant name for database and user names
    pub db_prefix: String,
    /// Length of generated database passwords
    pub password_length: usize,
    /// Control panel connection
    pub panel: PanelConfig,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            tenants_dir: PathBuf::from("tenants"),
            default_tenant: "default".to_string(),
            config_file: "config.php".to_string(),
            db_prefix: String::new(),
            password_length: 10,
            panel: PanelConfig::default(),
        }
    }
}

impl TenancyConfig {
    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.tenants_dir.as_os_str().is_empty() {
            return Err(TenancyError::validation("tenants_dir cannot be empty"));
        }

        if !is_plain_file_name(&self.default_tenant) {
            return Err(TenancyError::validation(format!(
                "Invalid default_tenant: '{}'",
                self.default_tenant
            )));
        }

        if !is_plain_file_name(&self.config_file) {
            return Err(TenancyError::validation(format!(
                "Invalid config_file: '{}'",
                self.config_file
            )));
        }

        let prefix_pattern = Regex::new(r"^[a-z0-9_]*$")
            .map_err(|e| TenancyError::config(format!("Invalid regex pattern: {}", e)))?;
        if !prefix_pattern.is_match(&self.db_prefix) {
            return Err(TenancyError::validation(format!(
                "Invalid db_prefix: '{}' (allowed: a-z, 0-9, _)",
                self.db_prefix
            )));
        }

        if self.password_length < 8 {
            return Err(TenancyError::validation(
                "password_length must be at least 8",
            ));
        }

        if self.panel.enabled {
            self.panel.validate()?;
        }

        Ok(())
    }
}

/// cPanel/WHM connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Provision databases through the panel; when false only files are managed
    pub enabled: bool,
    /// Hostname or IP of the panel
    pub host: String,
    /// Panel port (2083 cPanel SSL, 2087 WHM SSL)
    pub port: u16,
    /// Explicit protocol; derived from the port when unset
    pub protocol: Option<Protocol>,
    /// Account to authenticate as
    pub user: String,
    /// Account password (HTTP Basic authentication)
    pub password: Option<String>,
    /// WHM access hash; preferred over the password when both are set
    pub hash: Option<String>,
    /// Response shape returned by raw queries
    pub output: ResponseFormat,
    /// Accept self-signed panel certificates
    pub accept_invalid_certs: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Log request and response details
    pub debug: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "127.0.0.1".to_string(),
            port: 2083,
            protocol: None,
            user: String::new(),
            password: None,
            hash: None,
            output: ResponseFormat::Array,
            accept_invalid_certs: true,
            timeout_secs: 30,
            debug: false,
        }
    }
}

impl PanelConfig {
    /// Protocol to use, honouring an explicit override
    pub fn resolved_protocol(&self) -> Protocol {
        self.protocol.unwrap_or_else(|| Protocol::for_port(self.port))
    }

    /// Validate the panel configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(TenancyError::validation("panel.host cannot be empty"));
        }

        if self.port == 0 {
            return Err(TenancyError::validation("panel.port must be between 1 and 65535"));
        }

        if self.user.trim().is_empty() {
            return Err(TenancyError::validation("panel.user cannot be empty"));
        }

        let has_password = self.password.as_deref().is_some_and(|p| !p.is_empty());
        let has_hash = self.hash.as_deref().is_some_and(|h| !h.trim().is_empty());
        if !has_password && !has_hash {
            return Err(TenancyError::validation(
                "panel requires either a password or an access hash",
            ));
        }

        if self.timeout_secs == 0 {
            return Err(TenancyError::validation("panel.timeout_secs must be positive"));
        }

        Ok(())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
