// file: src/panel/mysql.rs
// version: 1.0.0
// guid: f1a6e3b8-2d4c-4b97-a05e-9c8d7b3e2f14

//! MySQL database and user management through the cPanel API1 `Mysql` module.
//!
//! cPanel prefixes database and user names with the account name on
//! creation, so creation calls take bare names while calls that reference
//! existing objects take [`PanelClient::qualified`] names.

use super::client::PanelClient;
use crate::Result;
use tracing::{debug, warn};

/// Privilege set granting everything ("alter drop create delete insert update lock")
pub const ALL_PRIVILEGES: &str = "all";

impl PanelClient {
    /// Name as stored by the panel: `{account}_{name}`
    pub fn qualified(&self, name: &str) -> String {
        format!("{}_{}", self.user(), name)
    }

    pub async fn add_database(&self, db_name: &str) -> Result<()> {
        debug!("Adding database {}", db_name);
        self.api1_query("Mysql", "adddb", &[db_name])
            .await?
            .ensure_success()
    }

    pub async fn add_database_user(&self, db_user: &str, db_pass: &str) -> Result<()> {
        debug!("Adding database user {}", db_user);
        self.api1_query("Mysql", "adduser", &[db_user, db_pass])
            .await?
            .ensure_success()
    }

    pub async fn remove_database(&self, db_name: &str) -> Result<()> {
        debug!("Removing database {}", db_name);
        self.api1_query("Mysql", "deldb", &[self.qualified(db_name).as_str()])
            .await?
            .ensure_success()
    }

    pub async fn remove_database_user(&self, db_user: &str) -> Result<()> {
        debug!("Removing database user {}", db_user);
        self.api1_query("Mysql", "deluser", &[self.qualified(db_user).as_str()])
            .await?
            .ensure_success()
    }

    /// Grant a user privileges on a database
    pub async fn attach_database_user(
        &self,
        db_name: &str,
        db_user: &str,
        privileges: &str,
    ) -> Result<()> {
        debug!("Granting {} on {} to {}", privileges, db_name, db_user);
        let db_name = self.qualified(db_name);
        let db_user = self.qualified(db_user);
        self.api1_query("Mysql", "adduserdb", &[db_name.as_str(), db_user.as_str(), privileges])
            .await?
            .ensure_success()
    }

    /// Create a database, create its user and grant the user access.
    ///
    /// When a later step fails, whatever this call already created is
    /// removed again. A failed `adddb` removes nothing.
    pub async fn create_database(
        &self,
        db_name: &str,
        db_user: &str,
        db_pass: &str,
        privileges: &str,
    ) -> Result<()> {
        self.add_database(db_name).await?;

        if let Err(err) = self.add_database_user(db_user, db_pass).await {
            self.undo_create(db_name, None).await;
            return Err(err);
        }

        if let Err(err) = self.attach_database_user(db_name, db_user, privileges).await {
            self.undo_create(db_name, Some(db_user)).await;
            return Err(err);
        }

        Ok(())
    }

    async fn undo_create(&self, db_name: &str, db_user: Option<&str>) {
        warn!("Rolling back database {}", self.qualified(db_name));
        if let Err(err) = self.remove_database(db_name).await {
            warn!("Failed to remove database {}: {}", self.qualified(db_name), err);
        }
        if let Some(db_user) = db_user {
            if let Err(err) = self.remove_database_user(db_user).await {
                warn!("Failed to remove database user {}: {}", self.qualified(db_user), err);
            }
        }
    }

    /// Replace a user's password.
    ///
    /// The API1 module has no password change call, so the user is dropped
    /// and recreated, which also drops its grant on `db_name`.
    pub async fn update_database_user(
        &self,
        db_name: &str,
        db_user: &str,
        new_password: &str,
    ) -> Result<()> {
        self.remove_database_user(db_user).await?;
        self.add_database_user(db_user, new_password).await?;
        self.attach_database_user(db_name, db_user, ALL_PRIVILEGES).await
    }

    pub async fn remove_database_and_user(&self, db_name: &str, db_user: &str) -> Result<()> {
        self.remove_database(db_name).await?;
        self.remove_database_user(db_user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PanelConfig, Protocol};
    use crate::error::TenancyError;
    use httpmock::prelude::*;

    const OK: &str = "<cpanelresult><event><result>1</result></event></cpanelresult>";

    fn client_for(server: &MockServer) -> PanelClient {
        PanelClient::new(&PanelConfig {
            enabled: true,
            host: server.host(),
            port: server.port(),
            protocol: Some(Protocol::Http),
            user: "acme".to_string(),
            password: Some("pw".to_string()),
            ..PanelConfig::default()
        })
        .unwrap()
    }

    fn api1_body(func: &str, args: &[&str]) -> String {
        let mut params = vec![
            ("cpanel_xmlapi_user".to_string(), "acme".to_string()),
            ("cpanel_xmlapi_module".to_string(), "Mysql".to_string()),
            ("cpanel_xmlapi_func".to_string(), func.to_string()),
            ("cpanel_xmlapi_apiversion".to_string(), "1".to_string()),
        ];
        for (i, arg) in args.iter().enumerate() {
            params.push((format!("arg-{}", i), arg.to_string()));
        }
        PanelClient::encode_params(&params)
    }

    #[tokio::test]
    async fn test_create_database_sequence() {
        let server = MockServer::start_async().await;
        let adddb = server
            .mock_async(|when, then| {
                when.method(POST).path("/xml-api/cpanel").body(api1_body("adddb", &["shop"]));
                then.status(200).body(OK);
            })
            .await;
        let adduser = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("adduser", &["shop", "pw123456"]));
                then.status(200).body(OK);
            })
            .await;
        let attach = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("adduserdb", &["acme_shop", "acme_shop", "all"]));
                then.status(200).body(OK);
            })
            .await;

        let client = client_for(&server);
        client
            .create_database("shop", "shop", "pw123456", ALL_PRIVILEGES)
            .await
            .unwrap();

        adddb.assert_async().await;
        adduser.assert_async().await;
        attach.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_database_stops_on_first_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/xml-api/cpanel").body(api1_body("adddb", &["shop"]));
                then.status(200).body(
                    "<cpanelresult><data><result>0</result><reason>Database exists</reason></data></cpanelresult>",
                );
            })
            .await;
        let adduser = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("adduser", &["shop", "pw"]));
                then.status(200).body(OK);
            })
            .await;

        let client = client_for(&server);
        let err = client
            .create_database("shop", "shop", "pw", ALL_PRIVILEGES)
            .await
            .unwrap_err();

        assert!(matches!(err, TenancyError::Panel(ref msg) if msg == "Database exists"));
        adduser.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_create_database_drops_database_when_user_is_rejected() {
        let server = MockServer::start_async().await;
        let adddb = server
            .mock_async(|when, then| {
                when.method(POST).path("/xml-api/cpanel").body(api1_body("adddb", &["shop"]));
                then.status(200).body(OK);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("adduser", &["shop", "weak"]));
                then.status(200)
                    .body("<cpanelresult><error>Password too weak</error></cpanelresult>");
            })
            .await;
        let deldb = server
            .mock_async(|when, then| {
                when.method(POST).path("/xml-api/cpanel").body(api1_body("deldb", &["acme_shop"]));
                then.status(200).body(OK);
            })
            .await;
        let deluser = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("deluser", &["acme_shop"]));
                then.status(200).body(OK);
            })
            .await;

        let client = client_for(&server);
        let err = client
            .create_database("shop", "shop", "weak", ALL_PRIVILEGES)
            .await
            .unwrap_err();

        assert!(matches!(err, TenancyError::Panel(ref msg) if msg == "Password too weak"));
        adddb.assert_calls_async(1).await;
        deldb.assert_calls_async(1).await;
        deluser.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_create_database_drops_both_when_grant_fails() {
        let server = MockServer::start_async().await;
        for (func, args) in [("adddb", vec!["shop"]), ("adduser", vec!["shop", "pw123456"])] {
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/xml-api/cpanel").body(api1_body(func, &args));
                    then.status(200).body(OK);
                })
                .await;
        }
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("adduserdb", &["acme_shop", "acme_shop", "all"]));
                then.status(500);
            })
            .await;
        let deldb = server
            .mock_async(|when, then| {
                when.method(POST).path("/xml-api/cpanel").body(api1_body("deldb", &["acme_shop"]));
                then.status(200).body(OK);
            })
            .await;
        let deluser = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("deluser", &["acme_shop"]));
                then.status(200).body(OK);
            })
            .await;

        let client = client_for(&server);
        assert!(client
            .create_database("shop", "shop", "pw123456", ALL_PRIVILEGES)
            .await
            .is_err());

        deldb.assert_calls_async(1).await;
        deluser.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_remove_database_and_user_uses_qualified_names() {
        let server = MockServer::start_async().await;
        let deldb = server
            .mock_async(|when, then| {
                when.method(POST).path("/xml-api/cpanel").body(api1_body("deldb", &["acme_shop"]));
                then.status(200).body(OK);
            })
            .await;
        let deluser = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("deluser", &["acme_shop"]));
                then.status(200).body(OK);
            })
            .await;

        let client = client_for(&server);
        client.remove_database_and_user("shop", "shop").await.unwrap();

        deldb.assert_async().await;
        deluser.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_database_user_regrants() {
        let server = MockServer::start_async().await;
        let deluser = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("deluser", &["acme_shop"]));
                then.status(200).body(OK);
            })
            .await;
        let adduser = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("adduser", &["shop", "newpass1"]));
                then.status(200).body(OK);
            })
            .await;
        let attach = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/xml-api/cpanel")
                    .body(api1_body("adduserdb", &["acme_shop", "acme_shop", "all"]));
                then.status(200).body(OK);
            })
            .await;

        let client = client_for(&server);
        client
            .update_database_user("shop", "shop", "newpass1")
            .await
            .unwrap();

        deluser.assert_async().await;
        adduser.assert_async().await;
        attach.assert_async().await;
    }

    #[test]
    fn test_qualified() {
        let client = PanelClient::new(&PanelConfig {
            enabled: true,
            host: "h".to_string(),
            user: "acme".to_string(),
            password: Some("pw".to_string()),
            ..PanelConfig::default()
        })
        .unwrap();
        assert_eq!(client.qualified("shop"), "acme_shop");
    }
}
