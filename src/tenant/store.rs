// file: src/tenant/store.rs
// version: 1.0.0
// guid: 6f3a1c8d-9e27-4b04-b5d9-3c7e0a2f8b61

//! On-disk tenant directories

use super::name::TenantName;
use crate::error::TenancyError;
use crate::Result;
use fs_extra::dir::CopyOptions;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// The tenants directory: one sub-directory per tenant plus the template
#[derive(Debug, Clone)]
pub struct TenantStore {
    root: PathBuf,
    template: String,
    config_file: String,
}

impl TenantStore {
    pub fn new(
        root: impl Into<PathBuf>,
        template: impl Into<String>,
        config_file: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            template: template.into(),
            config_file: config_file.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the template tenant
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_template(&self, name: &TenantName) -> bool {
        name.as_str() == self.template
    }

    pub fn tenant_path(&self, name: &TenantName) -> PathBuf {
        self.root.join(name.as_str())
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.join(&self.template)
    }

    pub fn config_path(&self, name: &TenantName) -> PathBuf {
        self.tenant_path(name).join(&self.config_file)
    }

    pub fn exists(&self, name: &TenantName) -> bool {
        self.tenant_path(name).exists()
    }

    /// Tenant directory names, sorted, without the template and hidden entries
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(TenancyError::config(format!(
                "Tenants directory {} does not exist",
                self.root.display()
            )));
        }

        let mut tenants = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            // follows symlinked tenant folders
            if !entry.path().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if name == self.template || name.starts_with('.') {
                continue;
            }
            tenants.push(name);
        }

        tenants.sort();
        Ok(tenants)
    }

    /// Clone the template into a new tenant directory
    pub fn create_from_template(&self, name: &TenantName) -> Result<PathBuf> {
        let target = self.tenant_path(name);
        if target.exists() {
            return Err(TenancyError::TenantExists(name.to_string()));
        }

        let template = self.template_path();
        if !template.is_dir() {
            return Err(TenancyError::TenantNotFound(self.template.clone()));
        }

        let mut options = CopyOptions::new();
        options.copy_inside = true;

        debug!("Copying {} to {}", template.display(), target.display());
        if let Err(err) = fs_extra::dir::copy(&template, &target, &options) {
            if target.exists() {
                if let Err(cleanup) = fs::remove_dir_all(&target) {
                    warn!(
                        "Failed to clean up partial copy {}: {}",
                        target.display(),
                        cleanup
                    );
                }
            }
            return Err(TenancyError::copy(format!(
                "{} -> {}: {}",
                template.display(),
                target.display(),
                err
            )));
        }

        Ok(target)
    }

    /// Delete a tenant directory; the template is refused
    pub fn remove(&self, name: &TenantName) -> Result<()> {
        if self.is_template(name) {
            return Err(TenancyError::ProtectedTenant(name.to_string()));
        }

        let target = self.tenant_path(name);
        if !target.is_dir() {
            return Err(TenancyError::TenantNotFound(name.to_string()));
        }

        debug!("Removing {}", target.display());
        fs::remove_dir_all(&target)?;
        Ok(())
    }
}
