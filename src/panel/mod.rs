// file: src/panel/mod.rs
// version: 1.0.0
// guid: 0d8c5b7a-4e2f-4193-8a6d-b1e9f3c7d250

//! cPanel/WHM remote API client

pub mod auth;
pub mod client;
pub mod mysql;
pub mod response;
pub mod subdomain;
pub mod xml;

pub use crate::config::{Protocol, ResponseFormat};
pub use auth::Credentials;
pub use client::PanelClient;
pub use mysql::ALL_PRIVILEGES;
pub use response::ApiResponse;
pub use xml::XmlElement;
