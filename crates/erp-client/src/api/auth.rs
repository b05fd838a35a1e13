//! Authentication API
//!
//! Login goes through the pipeline like any other call, so rejected
//! credentials surface the same way a dead session does. On success the
//! returned pair is stored, which arms the bearer injection and the
//! refresh coordinator for everything that follows.

use serde_json::json;
use tracing::warn;

use erp_auth::{
    CHANGE_PASSWORD_PATH, Credential, LOGIN_PATH, LOGOUT_PATH, LoginResponse, absolute_expiry,
};

use crate::error::{Error, Result};
use crate::pipeline::ApiClient;

/// Sign in and store the returned credential pair.
pub async fn login(client: &ApiClient, username: &str, password: &str) -> Result<LoginResponse> {
    let response: LoginResponse = client
        .post(
            LOGIN_PATH,
            Some(json!({"username": username, "password": password})),
        )
        .await?;

    let expires = absolute_expiry(response.expires_in);
    client
        .credential_store()
        .set(Credential {
            token_type: response.token_type.clone(),
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires,
        })
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;

    Ok(response)
}

/// Sign out. The backend call is best-effort; local credentials are
/// cleared even when it fails, matching what users expect of a sign-out
/// button on a flaky network.
pub async fn logout(client: &ApiClient) -> Result<()> {
    if let Err(e) = client.post_unit(LOGOUT_PATH, None).await {
        warn!(error = %e, "backend logout failed, clearing local session anyway");
    }
    client
        .credential_store()
        .clear()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;
    Ok(())
}

/// Change the signed-in user's password.
pub async fn change_password(
    client: &ApiClient,
    user_id: i64,
    old_password: &str,
    new_password: &str,
) -> Result<()> {
    client
        .post_unit(
            CHANGE_PASSWORD_PATH,
            Some(json!({
                "userId": user_id,
                "oldPassword": old_password,
                "newPassword": new_password,
            })),
        )
        .await
}
