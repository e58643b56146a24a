// file: src/config/loader.rs
// version: 2.0.0
// guid: d4e5f6g7-h8i9-0123-4567-890123defghi

//! Configuration file loading and environment variable substitution

use super::TenancyConfig;
use crate::error::TenancyError;
use crate::Result;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File names probed in the working directory when no path is given
const LOCAL_CONFIG_FILES: [&str; 2] = ["tenancy.yaml", "tenancy.toml"];

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load configuration from a YAML or TOML file, chosen by extension
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<TenancyConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            TenancyError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let regex = placeholder_regex()?;
        let mut missing = Vec::new();
        let mut config: TenancyConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => {
                let mut value: toml::Value = toml::from_str(&content)?;
                self.expand_toml(&regex, &mut value, &mut missing);
                check_missing(&missing)?;
                value.try_into()?
            }
            _ => {
                let mut value: serde_yaml::Value = serde_yaml::from_str(&content)?;
                if value.is_null() {
                    TenancyConfig::default()
                } else {
                    self.expand_yaml(&regex, &mut value, &mut missing);
                    check_missing(&missing)?;
                    serde_yaml::from_value(value)?
                }
            }
        };

        self.finish(&mut config)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the explicit path when given, otherwise the first config file
    /// found in the search path, otherwise the built-in defaults
    pub fn load_or_default(&self, explicit: Option<&Path>) -> Result<TenancyConfig> {
        if let Some(path) = explicit {
            return self.load(path);
        }

        if let Some(path) = Self::search_paths().into_iter().find(|p| p.is_file()) {
            return self.load(path);
        }

        debug!("No configuration file found, using defaults");
        let mut config = TenancyConfig::default();
        self.finish(&mut config)?;
        Ok(config)
    }

    /// Candidate configuration files in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = LOCAL_CONFIG_FILES.iter().map(PathBuf::from).collect();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("tenancy").join("config.yaml"));
        }
        paths
    }

    fn finish(&self, config: &mut TenancyConfig) -> Result<()> {
        let raw = config.tenants_dir.to_string_lossy().into_owned();
        config.tenants_dir = PathBuf::from(shellexpand::tilde(&raw).into_owned());

        if config.panel.password.is_some() && config.panel.hash.is_some() {
            warn!("Both panel.password and panel.hash are set, using the access hash");
        }

        config.validate()
    }

    /// Expand `${VAR}` placeholders in a single value
    pub fn expand_env_vars(&self, content: &str) -> Result<String> {
        let regex = placeholder_regex()?;
        let mut missing = Vec::new();
        let expanded = self.expand_str(&regex, content, &mut missing);
        check_missing(&missing)?;
        Ok(expanded)
    }

    /// Placeholders are expanded inside parsed string values only, so
    /// substituted text is never read as YAML or TOML syntax
    fn expand_yaml(&self, regex: &Regex, value: &mut serde_yaml::Value, missing: &mut Vec<String>) {
        match value {
            serde_yaml::Value::String(s) => *s = self.expand_str(regex, s, missing),
            serde_yaml::Value::Sequence(items) => {
                for item in items {
                    self.expand_yaml(regex, item, missing);
                }
            }
            serde_yaml::Value::Mapping(map) => {
                for (_, item) in map.iter_mut() {
                    self.expand_yaml(regex, item, missing);
                }
            }
            serde_yaml::Value::Tagged(tagged) => self.expand_yaml(regex, &mut tagged.value, missing),
            _ => {}
        }
    }

    fn expand_toml(&self, regex: &Regex, value: &mut toml::Value, missing: &mut Vec<String>) {
        match value {
            toml::Value::String(s) => *s = self.expand_str(regex, s, missing),
            toml::Value::Array(items) => {
                for item in items {
                    self.expand_toml(regex, item, missing);
                }
            }
            toml::Value::Table(table) => {
                for (_, item) in table.iter_mut() {
                    self.expand_toml(regex, item, missing);
                }
            }
            _ => {}
        }
    }

    fn expand_str(&self, regex: &Regex, text: &str, missing: &mut Vec<String>) -> String {
        regex
            .replace_all(text, |caps: &Captures<'_>| match self.env_vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => {
                    if !missing.iter().any(|v| v == &caps[1]) {
                        missing.push(caps[1].to_string());
                    }
                    caps[0].to_string()
                }
            })
            .into_owned()
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

fn placeholder_regex() -> Result<Regex> {
    Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| TenancyError::config(format!("Invalid regex pattern: {}", e)))
}

fn check_missing(missing: &[String]) -> Result<()> {
    if missing.is_empty() {
        return Ok(());
    }
    Err(TenancyError::config(format!(
        "Missing environment variables: {}",
        missing.join(", ")
    )))
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Protocol, ResponseFormat};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn test_env_var_expansion() {
        let mut loader = ConfigLoader::new();
        loader.set_env_var("TEST_VAR".to_string(), "test_value".to_string());

        let content = "key: ${TEST_VAR}";
        let result = loader.expand_env_vars(content).unwrap();
        assert_eq!(result, "key: test_value");
    }

    #[test]
    fn test_missing_env_var() {
        let loader = ConfigLoader::new();
        let content = "key: ${TENANCY_SURELY_MISSING_VAR}";

        let result = loader.expand_env_vars(content);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing environment variables"));
    }

    #[test]
    fn test_load_yaml_config() -> Result<()> {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
tenants_dir: /srv/app/tenants
db_prefix: app_
panel:
  enabled: true
  host: panel.example.com
  port: 2082
  user: acme
  password: ${{TENANCY_TEST_PANEL_PASS}}
  output: simplexml
"#
        )
        .unwrap();

        let mut loader = ConfigLoader::new();
        loader.set_env_var("TENANCY_TEST_PANEL_PASS".to_string(), "s3cret".to_string());
        let config = loader.load(file.path())?;

        assert_eq!(config.tenants_dir, PathBuf::from("/srv/app/tenants"));
        assert_eq!(config.db_prefix, "app_");
        assert_eq!(config.default_tenant, "default");
        assert_eq!(config.panel.password.as_deref(), Some("s3cret"));
        assert_eq!(config.panel.output, ResponseFormat::Element);
        assert_eq!(config.panel.resolved_protocol(), Protocol::Http);

        Ok(())
    }

    #[test]
    fn test_load_toml_config() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
tenants_dir = "/var/tenants"
password_length = 16

[panel]
enabled = true
host = "10.0.0.5"
port = 2087
user = "root"
hash = "ABC DEF"
output = "json"
"#
        )
        .unwrap();

        let config = ConfigLoader::new().load(file.path())?;
        assert_eq!(config.password_length, 16);
        assert_eq!(config.panel.port, 2087);
        assert_eq!(config.panel.output, ResponseFormat::Json);
        assert_eq!(config.panel.resolved_protocol(), Protocol::Https);

        Ok(())
    }

    #[test]
    fn test_expanded_values_keep_yaml_syntax_characters() -> Result<()> {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "panel:\n  enabled: true\n  host: panel.local\n  user: acme\n  password: ${{TENANCY_TEST_PW}}\ndb_prefix: \"${{TENANCY_TEST_PREFIX}}\"\n"
        )
        .unwrap();

        let mut loader = ConfigLoader::new();
        loader.set_env_var("TENANCY_TEST_PW".to_string(), "s3cret #42 \"*&".to_string());
        loader.set_env_var("TENANCY_TEST_PREFIX".to_string(), "app_".to_string());
        let config = loader.load(file.path())?;

        assert_eq!(config.panel.password.as_deref(), Some("s3cret #42 \"*&"));
        assert_eq!(config.db_prefix, "app_");
        Ok(())
    }

    #[test]
    fn test_expanded_values_keep_toml_quotes() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[panel]\nenabled = true\nhost = \"panel.local\"\nuser = \"acme\"\npassword = \"${{TENANCY_TEST_PW}}\"\n"
        )
        .unwrap();

        let mut loader = ConfigLoader::new();
        loader.set_env_var("TENANCY_TEST_PW".to_string(), "a\"b # c$1".to_string());
        let config = loader.load(file.path())?;

        assert_eq!(config.panel.password.as_deref(), Some("a\"b # c$1"));
        Ok(())
    }

    #[test]
    fn test_missing_env_var_in_file() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "tenants_dir: ${{TENANCY_SURELY_MISSING_DIR}}/tenants").unwrap();

        let err = ConfigLoader::new().load(file.path()).unwrap_err();
        assert!(err.to_string().contains("TENANCY_SURELY_MISSING_DIR"));
    }

    #[test]
    fn test_empty_yaml_uses_defaults() -> Result<()> {
        let file = Builder::new().suffix(".yaml").tempfile().unwrap();
        let config = ConfigLoader::new().load(file.path())?;
        assert_eq!(config.default_tenant, "default");
        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "panel:\n  enabled: true\n  host: example.com\n").unwrap();

        let result = ConfigLoader::new().load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = ConfigLoader::new().load_or_default(Some(Path::new("/nonexistent/tenancy.yaml")));
        assert!(matches!(result, Err(TenancyError::Config(_))));
    }
}
