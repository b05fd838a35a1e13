//! Token refresh exchange
//!
//! Posts the stored refresh token to `/auth/refresh` with a plain HTTP
//! client, outside the authenticated pipeline: if the exchange itself went
//! through the pipeline, a 401 on it would trigger another refresh,
//! recursively. A 401/403 here means the refresh token is dead and the
//! session cannot be recovered.

use serde::{Deserialize, Serialize};
use tracing::debug;

use common::ApiResponse;

use crate::endpoints::REFRESH_PATH;
use crate::error::{Error, Result};

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Payload of a successful `/auth/refresh` exchange. Both tokens rotate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Seconds until the new access token expires (delta, not absolute)
    pub expires_in: u64,
}

/// The signed-in user as returned by `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
    #[serde(default)]
    pub role_name: Option<String>,
}

/// Payload of a successful `/auth/login` exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: u64,
    pub user: UserInfo,
    #[serde(default)]
    pub password_expired: bool,
    #[serde(default)]
    pub password_remaining_days: Option<i64>,
    #[serde(default)]
    pub password_change_required: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Exchange a refresh token for a new credential pair.
///
/// The exchange carries the same per-request deadline as every other call;
/// a hung refresh endpoint must not park callers indefinitely.
///
/// Returns `InvalidCredentials` on 401/403 (the refresh token was rejected),
/// `TokenRefresh` on other non-success statuses, envelope failures, and
/// malformed bodies, and `Http` when the request never completed.
pub async fn refresh_token(
    client: &reqwest::Client,
    base_url: &str,
    refresh: &str,
    timeout: std::time::Duration,
) -> Result<TokenResponse> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH);
    debug!(url = %url, "exchanging refresh token");

    let response = client
        .post(&url)
        .timeout(timeout)
        .json(&RefreshRequest {
            refresh_token: refresh,
        })
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::InvalidCredentials(format!(
                "refresh token rejected ({status}): {body}"
            )));
        }
        return Err(Error::TokenRefresh(format!(
            "refresh endpoint returned {status}: {body}"
        )));
    }

    let envelope: ApiResponse<TokenResponse> = response
        .json()
        .await
        .map_err(|e| Error::TokenRefresh(format!("invalid refresh response: {e}")))?;

    if !envelope.success {
        return Err(Error::TokenRefresh(envelope.message));
    }
    envelope
        .data
        .ok_or_else(|| Error::TokenRefresh("refresh response missing data".into()))
}

/// Convert an `expiresIn` seconds delta into an absolute unix timestamp in
/// milliseconds, the form the credential store persists.
pub fn absolute_expiry(expires_in: u64) -> u64 {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    now_ms + expires_in * 1000
}
