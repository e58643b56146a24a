// file: src/panel/auth.rs
// version: 1.0.0
// guid: 3c1f8e2a-6b4d-4f0e-9a7c-2d5e8b1f4a60

//! Panel credentials and `Authorization` header construction

use crate::config::PanelConfig;
use crate::error::TenancyError;
use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// Credentials used to authenticate against the panel
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// WHM remote access hash
    Hash { user: String, hash: String },
    /// Account password, sent with HTTP Basic authentication
    Password { user: String, password: String },
}

impl Credentials {
    /// Access hash credentials; the hash is copied from a multi-line key
    /// file, so all whitespace is removed.
    pub fn hash(user: impl Into<String>, hash: &str) -> Self {
        Self::Hash {
            user: user.into(),
            hash: hash.chars().filter(|c| !c.is_whitespace()).collect(),
        }
    }

    /// Password credentials
    pub fn password(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Build credentials from config, preferring the access hash
    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        if let Some(hash) = config.hash.as_deref().filter(|h| !h.trim().is_empty()) {
            return Ok(Self::hash(config.user.clone(), hash));
        }

        match config.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Ok(Self::password(config.user.clone(), password)),
            None => Err(TenancyError::config(
                "no authentication information has been set",
            )),
        }
    }

    pub fn user(&self) -> &str {
        match self {
            Self::Hash { user, .. } | Self::Password { user, .. } => user,
        }
    }

    /// Authorization scheme name
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Hash { .. } => "WHM",
            Self::Password { .. } => "Basic",
        }
    }

    /// Value of the `Authorization` header
    pub fn header_value(&self) -> String {
        match self {
            Self::Hash { user, hash } => format!("WHM {}:{}", user, hash),
            Self::Password { user, password } => {
                format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scheme", &self.scheme())
            .field("user", &self.user())
            .finish_non_exhaustive()
    }
}
