// file: src/panel/client.rs
// version: 1.0.0
// guid: b9f2c4d6-3e71-4a08-9c5b-e0d7a6f1c382

//! HTTP client for the cPanel/WHM remote API

use super::auth::Credentials;
use super::response::ApiResponse;
use crate::config::{PanelConfig, Protocol, ResponseFormat};
use crate::error::TenancyError;
use crate::Result;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Client for the panel's XML and JSON APIs
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: Client,
    protocol: Protocol,
    host: String,
    port: u16,
    credentials: Credentials,
    format: ResponseFormat,
}

impl PanelClient {
    /// Create a client from validated panel settings
    pub fn new(config: &PanelConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            protocol: config.resolved_protocol(),
            host: config.host.trim().to_string(),
            port: config.port,
            credentials: Credentials::from_config(config)?,
            format: config.output,
        })
    }

    /// Same client, answering in another format
    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Account the client authenticates as
    pub fn user(&self) -> &str {
        self.credentials.user()
    }

    /// Endpoint for an API function in the current format
    pub fn url_for(&self, function: &str) -> String {
        format!(
            "{}://{}:{}/{}/{}",
            self.protocol.as_str(),
            self.host,
            self.port,
            self.format.api_path(),
            function
        )
    }

    /// URL-encode request parameters, keeping their order
    pub fn encode_params(params: &[(String, String)]) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish()
    }

    /// Call an API function
    pub async fn query(&self, function: &str, params: &[(String, String)]) -> Result<ApiResponse> {
        if function.trim().is_empty() {
            return Err(TenancyError::validation(
                "a panel query requires a function name",
            ));
        }

        let url = self.url_for(function);
        let body = Self::encode_params(params);

        debug!("URL: {}", url);
        debug!(
            "Params: {}",
            params.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>().join(", ")
        );
        debug!("Authentication scheme: {}", self.credentials.scheme());

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.credentials.header_value())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Response ({}): {}", status, text);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TenancyError::authentication(format!(
                "panel rejected credentials for '{}' ({})",
                self.user(),
                status
            )));
        }

        if !status.is_success() {
            return Err(TenancyError::panel(format!(
                "{} returned HTTP {}",
                function, status
            )));
        }

        ApiResponse::from_body(self.format, &text)
    }

    /// Call a cPanel API1 function; arguments are positional
    pub async fn api1_query(
        &self,
        module: &str,
        function: &str,
        args: &[&str],
    ) -> Result<ApiResponse> {
        let mut params = self.cpanel_call_params(module, function, 1);
        params.extend(
            args.iter()
                .enumerate()
                .map(|(i, arg)| (format!("arg-{}", i), arg.to_string())),
        );
        self.query("cpanel", &params).await
    }

    /// Call a cPanel API2 function; arguments are named
    pub async fn api2_query(
        &self,
        module: &str,
        function: &str,
        args: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let mut params: Vec<(String, String)> = args
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.extend(self.cpanel_call_params(module, function, 2));
        self.query("cpanel", &params).await
    }

    fn cpanel_call_params(&self, module: &str, function: &str, version: u8) -> Vec<(String, String)> {
        let api = match self.format {
            ResponseFormat::Json => "jsonapi",
            _ => "xmlapi",
        };
        vec![
            (format!("cpanel_{}_user", api), self.user().to_string()),
            (format!("cpanel_{}_module", api), module.to_string()),
            (format!("cpanel_{}_func", api), function.to_string()),
            (format!("cpanel_{}_apiversion", api), version.to_string()),
        ]
    }

    /// Panel version
    pub async fn version(&self) -> Result<ApiResponse> {
        self.query("version", &[]).await
    }

    /// Server hostname
    pub async fn gethostname(&self) -> Result<ApiResponse> {
        self.query("gethostname", &[]).await
    }

    /// Functions available to the authenticated account
    pub async fn applist(&self) -> Result<ApiResponse> {
        self.query("applist", &[]).await
    }

    /// Server load average
    pub async fn loadavg(&self) -> Result<ApiResponse> {
        self.query("loadavg", &[]).await
    }
}
