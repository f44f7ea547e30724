//! Request and response records exchanged with the network layer

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One captured or sent HTTP request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    /// Unique record identifier
    pub id: Uuid,

    /// Full request URL, used for scope classification
    pub url: String,

    /// HTTP method as captured
    pub method: String,

    /// Raw request text as shown in the editor
    pub raw_request: String,

    /// Whether the request goes over TLS
    pub use_https: bool,

    /// Derived out-of-scope flag, recomputed whenever pattern lists change
    #[serde(rename = "isOOS", default)]
    pub is_oos: bool,

    /// When the request was captured
    pub captured_at: chrono::DateTime<chrono::Utc>,
}

impl RequestRecord {
    /// Create a new, not yet classified record
    pub fn new(method: impl Into<String>, url: impl Into<String>, raw_request: impl Into<String>, use_https: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            method: method.into(),
            raw_request: raw_request.into(),
            use_https,
            is_oos: false,
            captured_at: chrono::Utc::now(),
        }
    }
}

/// Options handed to the network executor alongside the URL
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteOptions {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Response returned by the network executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedResponse {
    pub status: u16,
    pub status_text: String,
    /// Round-trip time in milliseconds
    pub duration: u64,
    /// Body size in bytes
    pub size: u64,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// A request recorded in history right before it was sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub raw_request: String,
    pub use_https: bool,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

impl HistoryEntry {
    pub fn new(raw_request: impl Into<String>, use_https: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_request: raw_request.into(),
            use_https,
            recorded_at: chrono::Utc::now(),
        }
    }
}
