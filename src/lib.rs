// file: src/lib.rs
// version: 3.0.0
// guid: d82472d1-7f0f-4eb4-b0a3-6e1547103eb4

//! # Tenancy Agent
//!
//! Provisions isolated application tenants: each tenant is a copy of the
//! template tenant directory with its own config file, database and database
//! user. Databases are managed through the cPanel/WHM XML and JSON APIs.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod panel;
pub mod tenant;
pub mod utils;

pub use error::{Result, TenancyError};

/// Version information for the utility
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
