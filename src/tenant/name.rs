// file: src/tenant/name.rs
// version: 1.0.0
// guid: 2b7e9f14-c0a3-4d58-8e61-a4f3d2c9b075

//! Validated tenant identifiers

use crate::error::TenancyError;
use crate::Result;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

const TENANT_NAME_PATTERN: &str = r"^[a-z0-9]+$";

/// Tenant name restricted to lowercase letters and digits, so it is safe as
/// a directory name and as part of a database identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TenantName(String);

impl TenantName {
    pub fn parse(name: &str) -> Result<Self> {
        let pattern = Regex::new(TENANT_NAME_PATTERN)
            .map_err(|e| TenancyError::config(format!("Invalid regex pattern: {}", e)))?;

        if pattern.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(TenancyError::InvalidTenantName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TenantName {
    type Err = TenancyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for TenantName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
