// file: src/error.rs
// version: 3.0.0
// guid: 57b83a63-07b6-4534-aa6c-51e8797254e0

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, TenancyError>;

/// Error types for tenant provisioning
#[derive(Error, Debug)]
pub enum TenancyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("The tenant name '{0}' contains illegal characters (allowed: a-z, 0-9)")]
    InvalidTenantName(String),

    #[error("Tenant '{0}' already exists, make sure the name is unique")]
    TenantExists(String),

    #[error("Tenant '{0}' does not exist")]
    TenantNotFound(String),

    #[error("Tenant '{0}' is the template tenant and cannot be removed")]
    ProtectedTenant(String),

    #[error("Expected exactly one '{key}' entry in config file, found {found}")]
    ConfigRewrite { key: String, found: usize },

    #[error("Copy error: {0}")]
    Copy(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Control panel error: {0}")]
    Panel(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TenancyError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new copy error
    pub fn copy(msg: impl Into<String>) -> Self {
        Self::Copy(msg.into())
    }

    /// Create a new authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a new control panel error
    pub fn panel(msg: impl Into<String>) -> Self {
        Self::Panel(msg.into())
    }

    /// Create a new XML error
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }
}
