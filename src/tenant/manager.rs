// file: src/tenant/manager.rs
// version: 1.0.0
// guid: e5b9c3a7-0f48-4d61-92ce-6a1d8b4f7e03

//! Tenant lifecycle: add, update, reset and remove

use super::config_file::{ConfigKey, TenantConfigFile};
use super::database::{DatabaseCredentials, DatabaseProvisioner};
use super::name::TenantName;
use super::store::TenantStore;
use crate::config::TenancyConfig;
use crate::error::TenancyError;
use crate::utils::CryptoUtils;
use crate::Result;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Outcome of removing several tenants
#[derive(Debug, Default)]
pub struct RemovalSummary {
    pub removed: Vec<String>,
    pub failed: Vec<(String, TenancyError)>,
}

impl RemovalSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Coordinates tenant folders, config files and databases
#[derive(Debug, Clone)]
pub struct TenantManager {
    store: TenantStore,
    provisioner: DatabaseProvisioner,
    db_prefix: String,
    password_length: usize,
}

impl TenantManager {
    pub fn new(
        store: TenantStore,
        provisioner: DatabaseProvisioner,
        db_prefix: impl Into<String>,
        password_length: usize,
    ) -> Self {
        Self {
            store,
            provisioner,
            db_prefix: db_prefix.into(),
            password_length,
        }
    }

    pub fn from_config(config: &TenancyConfig) -> Result<Self> {
        let store = TenantStore::new(
            &config.tenants_dir,
            &config.default_tenant,
            &config.config_file,
        );
        let provisioner = DatabaseProvisioner::from_config(&config.panel)?;
        Ok(Self::new(
            store,
            provisioner,
            &config.db_prefix,
            config.password_length,
        ))
    }

    pub fn store(&self) -> &TenantStore {
        &self.store
    }

    pub fn provisioner(&self) -> &DatabaseProvisioner {
        &self.provisioner
    }

    pub fn list(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Create a tenant from the template.
    ///
    /// A random password is generated when none is given. The new folder is
    /// removed again if the config rewrite or database creation fails.
    pub async fn add(&self, name: &TenantName, password: Option<&str>) -> Result<DatabaseCredentials> {
        let password = match password {
            Some(p) => validate_password(p)?.to_string(),
            None => CryptoUtils::generate_password(self.password_length),
        };
        let credentials = self
            .provisioner
            .credentials_for(&self.db_prefix, name, &password);

        info!("Copying template {} to {}", self.store.template(), name);
        let mut new_dir = NewTenantDir::new(self.store.create_from_template(name)?);

        if let Err(err) = self.configure_new_tenant(name, &credentials).await {
            error!("Adding tenant {} failed, rolling back: {}", name, err);
            return Err(err);
        }

        new_dir.keep();
        info!("Tenant {} added", name);
        Ok(credentials)
    }

    async fn configure_new_tenant(
        &self,
        name: &TenantName,
        credentials: &DatabaseCredentials,
    ) -> Result<()> {
        info!("Writing database settings to {}", self.store.config_path(name).display());
        let mut config = TenantConfigFile::load(self.store.config_path(name))?;
        config.set_all(&[
            (ConfigKey::DbName, credentials.name.as_str()),
            (ConfigKey::DbUser, credentials.user.as_str()),
            (ConfigKey::DbPass, credentials.password.as_str()),
        ])?;
        config.save()?;

        self.provisioner.create(credentials).await
    }

    /// Change the database password of an existing tenant
    pub async fn update_password(&self, name: &TenantName, password: &str) -> Result<()> {
        let password = validate_password(password)?;
        if !self.store.exists(name) {
            return Err(TenancyError::TenantNotFound(name.to_string()));
        }

        let credentials = self
            .provisioner
            .credentials_for(&self.db_prefix, name, password);

        // A config without exactly one DB_PASS fails here, before the panel is called
        let mut config = TenantConfigFile::load(self.store.config_path(name))?;
        config.set(ConfigKey::DbPass, password)?;

        self.provisioner.update_password(&credentials).await?;

        info!("Writing new password to {}", self.store.config_path(name).display());
        config.save()?;
        info!("Password of tenant {} updated", name);
        Ok(())
    }

    /// Replace the password with a random one and return it
    pub async fn reset_password(&self, name: &TenantName) -> Result<String> {
        let password = CryptoUtils::generate_password(self.password_length);
        self.update_password(name, &password).await?;
        Ok(password)
    }

    /// Delete the tenant folder, then its database and user
    pub async fn remove(&self, name: &TenantName) -> Result<()> {
        info!("Removing tenant folder {}", self.store.tenant_path(name).display());
        self.store.remove(name)?;

        let credentials = self.provisioner.credentials_for(&self.db_prefix, name, "");
        self.provisioner.drop(&credentials).await?;

        info!("Tenant {} removed", name);
        Ok(())
    }

    /// Remove every named tenant, continuing past failures
    pub async fn remove_many<S: AsRef<str>>(&self, names: &[S]) -> RemovalSummary {
        let mut summary = RemovalSummary::default();

        for raw in names {
            let raw = raw.as_ref();
            let result = match TenantName::parse(raw) {
                Ok(name) => self.remove(&name).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(()) => summary.removed.push(raw.to_string()),
                Err(err) => {
                    error!("Failed to remove {}: {}", raw, err);
                    summary.failed.push((raw.to_string(), err));
                }
            }
        }

        summary
    }
}

/// Freshly copied tenant folder, deleted on drop unless kept.
///
/// Also covers the `add` future being dropped mid-flight, e.g. on Ctrl+C.
struct NewTenantDir {
    path: PathBuf,
    keep: bool,
}

impl NewTenantDir {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for NewTenantDir {
    fn drop(&mut self) {
        if self.keep || !self.path.exists() {
            return;
        }
        warn!("Removing incomplete tenant folder {}", self.path.display());
        if let Err(err) = fs::remove_dir_all(&self.path) {
            warn!("Failed to remove {}: {}", self.path.display(), err);
        }
    }
}

fn validate_password(password: &str) -> Result<&str> {
    if password.is_empty() {
        return Err(TenancyError::validation("password cannot be empty"));
    }
    if password.chars().any(char::is_control) {
        return Err(TenancyError::validation(
            "password cannot contain control characters",
        ));
    }
    Ok(password)
}
