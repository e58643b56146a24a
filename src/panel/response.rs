// file: src/panel/response.rs
// version: 1.0.0
// guid: 5a7d0c3e-91b2-4f68-8d4e-c6b3a1f09e27

//! Panel responses shaped into the requested [`ResponseFormat`]

use super::xml::XmlElement;
use crate::config::ResponseFormat;
use crate::error::TenancyError;
use crate::Result;
use serde_json::Value;

/// A panel reply in one of the four output shapes
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Xml(String),
    Element(XmlElement),
    Array(Value),
}

impl ApiResponse {
    /// Shape a raw response body.
    ///
    /// Older panels answer failed logins with an HTML page and status 200,
    /// so any HTML body is rejected before parsing.
    pub fn from_body(format: ResponseFormat, body: &str) -> Result<Self> {
        reject_html(body)?;

        match format {
            ResponseFormat::Json => Ok(Self::Json(serde_json::from_str(body)?)),
            ResponseFormat::Xml => Ok(Self::Xml(body.to_string())),
            ResponseFormat::Element => Ok(Self::Element(XmlElement::parse(body)?)),
            ResponseFormat::Array => Ok(Self::Array(XmlElement::parse(body)?.to_value())),
        }
    }

    pub fn format(&self) -> ResponseFormat {
        match self {
            Self::Json(_) => ResponseFormat::Json,
            Self::Xml(_) => ResponseFormat::Xml,
            Self::Element(_) => ResponseFormat::Element,
            Self::Array(_) => ResponseFormat::Array,
        }
    }

    /// Nested-map view of the response regardless of its shape
    pub fn to_value(&self) -> Result<Value> {
        match self {
            Self::Json(value) | Self::Array(value) => Ok(value.clone()),
            Self::Xml(body) => Ok(XmlElement::parse(body)?.to_value()),
            Self::Element(root) => Ok(root.to_value()),
        }
    }

    /// Fail when the panel reported an error inside an otherwise valid reply
    pub fn ensure_success(&self) -> Result<()> {
        match failure_reason(&self.to_value()?) {
            Some(reason) => Err(TenancyError::panel(reason)),
            None => Ok(()),
        }
    }

    /// Human-readable rendering for the CLI
    pub fn render(&self) -> Result<String> {
        match self {
            Self::Json(value) | Self::Array(value) => Ok(serde_json::to_string_pretty(value)?),
            Self::Xml(body) => Ok(body.clone()),
            Self::Element(root) => Ok(root.to_string()),
        }
    }
}

fn reject_html(body: &str) -> Result<()> {
    let lower = body.to_ascii_lowercase();
    if !lower.contains("<html") {
        return Ok(());
    }

    if lower.contains("login attempt failed") {
        return Err(TenancyError::authentication("login attempt failed"));
    }
    if lower.contains("action=\"/login/\"") {
        return Err(TenancyError::authentication(
            "panel answered with its login page",
        ));
    }

    Err(TenancyError::panel("unexpected HTML response from panel"))
}

/// Error reported inside a normalized reply.
///
/// Covers the three shapes panels use: a top-level `error` string,
/// `event.result`/`data.result` of 0 (cPanel API1/API2) and `result.status`
/// of 0 (WHM). JSON replies wrap everything in `cpanelresult`.
fn failure_reason(value: &Value) -> Option<String> {
    let value = value.get("cpanelresult").unwrap_or(value);

    if let Some(error) = value.get("error").and_then(scalar_text) {
        if !error.is_empty() {
            return Some(error);
        }
    }

    // API2 returns one <data> element per row, normalized to a list
    let rows: Vec<&Value> = match value.get("data") {
        Some(Value::Array(rows)) => rows.iter().collect(),
        Some(row) => vec![row],
        None => Vec::new(),
    };

    if let Some(failed) = rows
        .iter()
        .find(|row| row.get("result").is_some_and(is_zero))
    {
        return Some(row_reason(failed).unwrap_or_else(|| "request failed".to_string()));
    }

    if value.pointer("/event/result").is_some_and(is_zero) {
        return Some(
            rows.iter()
                .find_map(|row| row_reason(row))
                .unwrap_or_else(|| "request failed".to_string()),
        );
    }

    if value.pointer("/result/status").is_some_and(is_zero) {
        return Some(
            value
                .pointer("/result/statusmsg")
                .and_then(scalar_text)
                .unwrap_or_else(|| "request failed".to_string()),
        );
    }

    None
}

fn row_reason(row: &Value) -> Option<String> {
    row.get("reason")
        .and_then(scalar_text)
        .filter(|r| !r.is_empty())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim() == "0",
        Value::Number(n) => n.as_i64() == Some(0),
        Value::Bool(b) => !b,
        _ => false,
    }
}
