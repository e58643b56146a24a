// file: src/tenant/database.rs
// version: 1.0.0
// guid: 8a2d6f0c-51e9-4c37-b8a4-d7e3c9f15b26

//! Tenant database provisioning

use super::name::TenantName;
use crate::config::PanelConfig;
use crate::panel::{PanelClient, ALL_PRIVILEGES};
use crate::Result;
use std::fmt;
use tracing::{info, warn};

/// Database settings of one tenant
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    /// Name as passed to creation calls (`{prefix}{tenant}`)
    pub local_name: String,
    /// Database name written to the tenant config
    pub name: String,
    /// Database user written to the tenant config
    pub user: String,
    pub password: String,
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("local_name", &self.local_name)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Backend that owns tenant databases
#[derive(Debug, Clone)]
pub enum DatabaseProvisioner {
    /// Databases live on a cPanel account
    Panel(PanelClient),
    /// No panel configured; config files are still rewritten
    Disabled,
}

impl DatabaseProvisioner {
    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        if config.enabled {
            Ok(DatabaseProvisioner::Panel(PanelClient::new(config)?))
        } else {
            Ok(DatabaseProvisioner::Disabled)
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, DatabaseProvisioner::Panel(_))
    }

    /// Names the tenant's database and user.
    ///
    /// The panel stores both as `{account}_{prefix}{tenant}`; without a panel
    /// the unqualified name is used.
    pub fn credentials_for(
        &self,
        prefix: &str,
        tenant: &TenantName,
        password: &str,
    ) -> DatabaseCredentials {
        let local_name = format!("{}{}", prefix, tenant);
        let name = match self {
            DatabaseProvisioner::Panel(client) => client.qualified(&local_name),
            DatabaseProvisioner::Disabled => local_name.clone(),
        };

        DatabaseCredentials {
            user: name.clone(),
            name,
            local_name,
            password: password.to_string(),
        }
    }

    pub async fn create(&self, credentials: &DatabaseCredentials) -> Result<()> {
        match self {
            DatabaseProvisioner::Panel(client) => {
                info!("Creating database {}", credentials.name);
                client
                    .create_database(
                        &credentials.local_name,
                        &credentials.local_name,
                        &credentials.password,
                        ALL_PRIVILEGES,
                    )
                    .await
            }
            DatabaseProvisioner::Disabled => {
                warn!(
                    "Panel disabled, database {} was not created",
                    credentials.name
                );
                Ok(())
            }
        }
    }

    pub async fn update_password(&self, credentials: &DatabaseCredentials) -> Result<()> {
        match self {
            DatabaseProvisioner::Panel(client) => {
                info!("Updating password of database user {}", credentials.user);
                client
                    .update_database_user(
                        &credentials.local_name,
                        &credentials.local_name,
                        &credentials.password,
                    )
                    .await
            }
            DatabaseProvisioner::Disabled => {
                warn!(
                    "Panel disabled, database user {} was not updated",
                    credentials.user
                );
                Ok(())
            }
        }
    }

    pub async fn drop(&self, credentials: &DatabaseCredentials) -> Result<()> {
        match self {
            DatabaseProvisioner::Panel(client) => {
                info!("Dropping database {}", credentials.name);
                client
                    .remove_database_and_user(&credentials.local_name, &credentials.local_name)
                    .await
            }
            DatabaseProvisioner::Disabled => {
                warn!(
                    "Panel disabled, database {} was not dropped",
                    credentials.name
                );
                Ok(())
            }
        }
    }
}
