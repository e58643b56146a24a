// file: src/tenant/config_file.rs
// version: 1.0.0
// guid: c4e8a2f6-7b13-4d9a-a3c5-18f6e0b7d942

//! In-place rewrite of the database entries of a tenant config file.
//!
//! The file is PHP source, e.g. `define('DB_NAME', 'app');` or
//! `'DB_NAME' => 'app',`. Only the quoted value after each sentinel key is
//! replaced; everything else is left byte-for-byte intact.

use crate::error::TenancyError;
use crate::Result;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};

/// Sentinel keys holding the tenant's database settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DbName,
    DbUser,
    DbPass,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::DbName => "DB_NAME",
            ConfigKey::DbUser => "DB_USER",
            ConfigKey::DbPass => "DB_PASS",
        }
    }

    fn pattern(&self) -> Result<Regex> {
        Regex::new(&format!(
            r"'{}'(\s*(?:,|=>)\s*)'(?:[^'\\]|\\.)*'",
            regex::escape(self.as_str())
        ))
        .map_err(|e| TenancyError::config(format!("Invalid regex pattern: {}", e)))
    }
}

/// A tenant config file loaded for editing
#[derive(Debug, Clone)]
pub struct TenantConfigFile {
    path: PathBuf,
    contents: String,
}

impl TenantConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|e| {
            TenancyError::config(format!(
                "Failed to read tenant config {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self { path, contents })
    }

    pub fn from_contents(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Replace the value of `key`; the key must occur exactly once
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        let pattern = key.pattern()?;

        let found = pattern.find_iter(&self.contents).count();
        if found != 1 {
            return Err(TenancyError::ConfigRewrite {
                key: key.as_str().to_string(),
                found,
            });
        }

        let escaped = escape_single_quoted(value);
        let rewritten = pattern.replace(&self.contents, |caps: &Captures<'_>| {
            format!("'{}'{}'{}'", key.as_str(), &caps[1], escaped)
        });
        self.contents = rewritten.into_owned();
        Ok(())
    }

    /// Apply several replacements; nothing changes unless all of them succeed
    pub fn set_all(&mut self, entries: &[(ConfigKey, &str)]) -> Result<()> {
        let mut staged = self.clone();
        for (key, value) in entries {
            staged.set(*key, value)?;
        }
        *self = staged;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, &self.contents)?;
        Ok(())
    }
}

fn escape_single_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEFINE_STYLE: &str = "<?php\n\
        define('DB_HOST', 'localhost');\n\
        define('DB_NAME', 'default_db');\n\
        define('DB_USER', 'default_user');\n\
        define('DB_PASS', 'changeme');\n";

    const ARRAY_STYLE: &str = "<?php\nreturn array(\n    'DB_NAME' => 'app',\n    'DB_USER' => 'app',\n    'DB_PASS' => 'it\\'s',\n);\n";

    #[test]
    fn test_rewrites_define_style() {
        let mut file = TenantConfigFile::from_contents("config.php", DEFINE_STYLE);
        file.set_all(&[
            (ConfigKey::DbName, "acme_shop"),
            (ConfigKey::DbUser, "acme_shop"),
            (ConfigKey::DbPass, "Xy12$1ab"),
        ])
        .unwrap();

        assert_eq!(
            file.contents(),
            "<?php\n\
             define('DB_HOST', 'localhost');\n\
             define('DB_NAME', 'acme_shop');\n\
             define('DB_USER', 'acme_shop');\n\
             define('DB_PASS', 'Xy12$1ab');\n"
        );
    }

    #[test]
    fn test_rewrites_array_style_with_escaped_value() {
        let mut file = TenantConfigFile::from_contents("config.php", ARRAY_STYLE);
        file.set(ConfigKey::DbPass, "o'neil\\x").unwrap();

        assert!(file.contents().contains("'DB_PASS' => 'o\\'neil\\\\x',"));
        assert!(file.contents().contains("'DB_NAME' => 'app',"));
    }

    #[test]
    fn test_missing_key_fails() {
        let mut file = TenantConfigFile::from_contents("config.php", "<?php\n");
        let err = file.set(ConfigKey::DbName, "x").unwrap_err();
        assert!(matches!(
            err,
            TenancyError::ConfigRewrite { ref key, found: 0 } if key == "DB_NAME"
        ));
    }

    #[test]
    fn test_duplicate_key_fails() {
        let contents = format!("{}define('DB_PASS', 'other');\n", DEFINE_STYLE);
        let mut file = TenantConfigFile::from_contents("config.php", contents.clone());

        let err = file.set(ConfigKey::DbPass, "x").unwrap_err();
        assert!(matches!(err, TenancyError::ConfigRewrite { found: 2, .. }));
        assert_eq!(file.contents(), contents);
    }

    #[test]
    fn test_set_all_is_atomic() {
        let contents = "<?php\ndefine('DB_NAME', 'a');\ndefine('DB_USER', 'b');\n";
        let mut file = TenantConfigFile::from_contents("config.php", contents);

        let result = file.set_all(&[
            (ConfigKey::DbName, "x"),
            (ConfigKey::DbUser, "y"),
            (ConfigKey::DbPass, "z"),
        ]);

        assert!(result.is_err());
        assert_eq!(file.contents(), contents);
    }

    #[test]
    fn test_load_and_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.php");
        fs::write(&path, DEFINE_STYLE).unwrap();

        let mut file = TenantConfigFile::load(&path).unwrap();
        file.set(ConfigKey::DbPass, "n3wpass").unwrap();
        file.save().unwrap();

        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.contains("define('DB_PASS', 'n3wpass');"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            TenantConfigFile::load("/nonexistent/config.php"),
            Err(TenancyError::Config(_))
        ));
    }
}
