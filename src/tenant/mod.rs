// file: src/tenant/mod.rs
// version: 1.0.0
// guid: 5c1f8e3b-a294-4d7e-b06c-f2a9d7e4c813

//! Tenant folders, config files and databases

pub mod config_file;
pub mod database;
pub mod manager;
pub mod name;
pub mod store;

pub use config_file::{ConfigKey, TenantConfigFile};
pub use database::{DatabaseCredentials, DatabaseProvisioner};
pub use manager::{RemovalSummary, TenantManager};
pub use name::TenantName;
pub use store::TenantStore;
