// file: src/cli/commands.rs
// version: 2.0.0
// guid: g7h8i9j0-k1l2-3456-7890-123456ghijkl

//! Command implementations for the CLI

use crate::{
    config::{ResponseFormat, TenancyConfig},
    error::TenancyError,
    panel::PanelClient,
    tenant::{TenantManager, TenantName},
    Result,
};
use tracing::{error, info};

/// Print every tenant, one per line
pub async fn list_command(config: &TenancyConfig) -> Result<()> {
    let manager = TenantManager::from_config(config)?;
    let tenants = manager.list()?;

    if tenants.is_empty() {
        info!("No tenants found in {}", manager.store().root().display());
        return Ok(());
    }

    for tenant in tenants {
        println!("{}", tenant);
    }
    Ok(())
}

/// Create a tenant from the template
pub async fn add_command(config: &TenancyConfig, name: &str, password: Option<&str>) -> Result<()> {
    let name = TenantName::parse(name)?;
    let manager = TenantManager::from_config(config)?;

    info!("Adding tenant {}", name);
    let credentials = manager.add(&name, password).await?;

    println!("Tenant:   {}", name);
    println!("Database: {}", credentials.name);
    println!("User:     {}", credentials.user);
    if password.is_none() {
        println!("Password: {}", credentials.password);
    }
    Ok(())
}

/// Remove tenants, reporting each failure before failing overall
pub async fn remove_command(config: &TenancyConfig, names: &[String]) -> Result<()> {
    let manager = TenantManager::from_config(config)?;
    let summary = manager.remove_many(names).await;

    for name in &summary.removed {
        println!("Removed {}", name);
    }

    if summary.is_success() {
        return Ok(());
    }

    for (name, err) in &summary.failed {
        error!("{}: {}", name, err);
    }
    let failed: Vec<&str> = summary.failed.iter().map(|(n, _)| n.as_str()).collect();
    Err(TenancyError::validation(format!(
        "Failed to remove {} of {} tenants: {}",
        failed.len(),
        names.len(),
        failed.join(", ")
    )))
}

/// Set a tenant's database password
pub async fn update_command(config: &TenancyConfig, name: &str, password: &str) -> Result<()> {
    let name = TenantName::parse(name)?;
    let manager = TenantManager::from_config(config)?;

    info!("Updating password of tenant {}", name);
    manager.update_password(&name, password).await
}

/// Generate and set a new password, then print it
pub async fn reset_command(config: &TenancyConfig, name: &str) -> Result<()> {
    let name = TenantName::parse(name)?;
    let manager = TenantManager::from_config(config)?;

    info!("Resetting password of tenant {}", name);
    let password = manager.reset_password(&name).await?;

    println!("New password for {}: {}", name, password);
    Ok(())
}

/// Call a panel function and print the reply in the requested shape
pub async fn query_command(
    config: &TenancyConfig,
    function: &str,
    params: &[(String, String)],
    format: Option<ResponseFormat>,
) -> Result<()> {
    if !config.panel.enabled {
        return Err(TenancyError::config(
            "panel.enabled is false, set it in the configuration to query the panel",
        ));
    }

    let client = PanelClient::new(&config.panel)?;
    let client = match format {
        Some(format) => client.with_format(format),
        None => client,
    };

    info!("Querying {} as {}", function, client.format().as_str());
    let response = client.query(function, params).await?;
    println!("{}", response.render()?);
    Ok(())
}
