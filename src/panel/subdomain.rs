// file: src/panel/subdomain.rs
// version: 1.0.0
// guid: 9b4e2d7c-a613-4f58-8c0e-3d71f6a9b2e5

//! Subdomains through the cPanel API1 `SubDomain` module

use super::client::PanelClient;
use crate::Result;
use tracing::debug;

impl PanelClient {
    /// Add `{label}.{root_domain}` to the account
    pub async fn add_subdomain(&self, label: &str, root_domain: &str) -> Result<()> {
        debug!("Adding subdomain {}.{}", label, root_domain);
        self.api1_query("SubDomain", "addsubdomain", &[label, root_domain])
            .await?
            .ensure_success()
    }
}
