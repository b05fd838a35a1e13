//! Backend response envelope
//!
//! Every endpoint of the ERP backend wraps its payload in a fixed JSON
//! envelope: `{success, code, message, data?, timestamp}`. The `success`
//! flag signals a business-level outcome independent of the HTTP status;
//! a 200 with `success: false` is still a failure, and `message` carries
//! the human-readable reason. List endpoints nest a pagination envelope
//! inside `data`.

use serde::{Deserialize, Serialize};

/// The backend's uniform response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Business-level outcome, independent of the transport status code.
    pub success: bool,
    /// Backend result code (mirrors HTTP status on most endpoints).
    pub code: i32,
    #[serde(default)]
    pub message: String,
    /// Payload on success; absent on failures and on unit-returning endpoints.
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: String,
}

/// Server-side pagination envelope, nested inside `ApiResponse::data`
/// on list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
}
