//! Authenticated request pipeline
//!
//! Every backend call goes through [`ApiClient::execute`]: attach the
//! current bearer token, send, unwrap the response envelope, and on an
//! authentication failure coordinate a single token refresh and replay the
//! call exactly once with the refreshed token. The two credential exchanges
//! (login and refresh) are never recovered; a 401 from them tears the
//! session down immediately. There is never a third attempt.
//!
//! Recovery applies only to HTTP 401 on regular endpoints. Envelope
//! failures (`success: false`) and transport failures propagate directly,
//! after exactly one user-visible notice through the session hooks.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use common::ApiResponse;
use erp_auth::CredentialStore;

use crate::config::Config;
use crate::error::{self, Error, Result, transport_message};
use crate::refresh::TokenRefresher;
use crate::session::SessionHooks;
use crate::telemetry;

/// Immutable descriptor of one logical backend call.
///
/// Replays rebuild the request from this descriptor with a fresh token;
/// nothing on it changes between the first attempt and the replay.
#[derive(Debug, Clone)]
struct Call {
    method: Method,
    path: String,
    query: Option<Value>,
    body: Option<Value>,
}

/// Outcome of a single transport attempt, before recovery policy applies.
enum Attempt {
    /// Envelope unwrapped; the `data` payload (`Null` when absent).
    Ok(Value),
    /// 401 on a regular endpoint: eligible for refresh-and-replay.
    AuthExpired,
    /// Classified terminal error, propagated as-is.
    Fatal(Error),
}

/// HTTP client for the ERP backend with token refresh built in.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    store: Arc<CredentialStore>,
    refresher: TokenRefresher,
    hooks: Arc<dyn SessionHooks>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        store: Arc<CredentialStore>,
        hooks: Arc<dyn SessionHooks>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        let refresher = TokenRefresher::new(
            http.clone(),
            base_url.clone(),
            timeout,
            store.clone(),
            hooks.clone(),
        );
        Ok(Self {
            http,
            base_url,
            timeout,
            store,
            refresher,
            hooks,
        })
    }

    /// Build a client from loaded configuration, opening the credential file.
    pub async fn from_config(config: &Config, hooks: Arc<dyn SessionHooks>) -> Result<Self> {
        let store = CredentialStore::load(config.credentials.path.clone())
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Self::new(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_secs),
            Arc::new(store),
            hooks,
        )
    }

    /// The credential store backing this client.
    pub fn credential_store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Option<Value>) -> Result<T> {
        self.request(Call {
            method: Method::GET,
            path: path.into(),
            query,
            body: None,
        })
        .await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        self.request(Call {
            method: Method::POST,
            path: path.into(),
            query: None,
            body,
        })
        .await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        self.request(Call {
            method: Method::PUT,
            path: path.into(),
            query: None,
            body,
        })
        .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Call {
            method: Method::DELETE,
            path: path.into(),
            query: None,
            body: None,
        })
        .await
    }

    /// POST for unit-returning endpoints; any `data` payload is ignored.
    pub async fn post_unit(&self, path: &str, body: Option<Value>) -> Result<()> {
        self.execute(&Call {
            method: Method::POST,
            path: path.into(),
            query: None,
            body,
        })
        .await
        .map(|_| ())
    }

    /// DELETE for unit-returning endpoints.
    pub async fn delete_unit(&self, path: &str) -> Result<()> {
        self.execute(&Call {
            method: Method::DELETE,
            path: path.into(),
            query: None,
            body: None,
        })
        .await
        .map(|_| ())
    }

    async fn request<T: DeserializeOwned>(&self, call: Call) -> Result<T> {
        let data = self.execute(&call).await?;
        serde_json::from_value(data).map_err(|e| {
            let err = Error::Transport(format!("failed to decode response payload: {e}"));
            self.surface(err)
        })
    }

    /// Run one logical call through the full recovery policy.
    async fn execute(&self, call: &Call) -> Result<Value> {
        let request_id = format!("req_{}", Uuid::new_v4().simple());
        let token = self.store.get().await.map(|c| c.access_token);

        match self.attempt(call, token.as_deref(), &request_id).await {
            Attempt::Ok(data) => Ok(data),
            Attempt::Fatal(err) => Err(self.surface(err)),
            Attempt::AuthExpired => {
                debug!(request_id, "access token rejected, acquiring a fresh one");
                let fresh = match self.refresher.acquire().await {
                    Ok(token) => token,
                    // The coordinator already terminated the session
                    Err(err) => return Err(err),
                };
                // One replay, with the token current at refresh settlement
                match self.attempt(call, Some(&fresh), &request_id).await {
                    Attempt::Ok(data) => Ok(data),
                    Attempt::Fatal(err) => Err(self.surface(err)),
                    Attempt::AuthExpired => {
                        warn!(request_id, "replay rejected again, terminating session");
                        self.terminate_session().await;
                        Err(Error::SessionExpired(
                            "credentials rejected after refresh".into(),
                        ))
                    }
                }
            }
        }
    }

    /// One transport attempt: send, classify the status, unwrap the envelope.
    async fn attempt(&self, call: &Call, token: Option<&str>, request_id: &str) -> Attempt {
        let url = format!("{}{}", self.base_url, call.path);
        let mut request = self
            .http
            .request(call.method.clone(), &url)
            .timeout(self.timeout);
        if let Some(query) = &call.query {
            request = request.query(query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        // Signed out means no header, not an error; the backend decides
        // which endpoints require authentication
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        debug!(request_id, method = %call.method, path = %call.path, "dispatching request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else {
                    "other"
                };
                telemetry::record_transport_error(kind);
                warn!(request_id, error = %e, "request failed before a response arrived");
                return Attempt::Fatal(error::from_reqwest(&e));
            }
        };

        let status = response.status();
        telemetry::record_request(status.as_u16(), call.method.as_str());

        if status.as_u16() == 401 {
            if erp_auth::is_auth_exchange(&call.path) {
                warn!(request_id, path = %call.path, "credential exchange rejected");
                self.terminate_session().await;
                return Attempt::Fatal(Error::SessionExpired(
                    "authentication rejected by the backend".into(),
                ));
            }
            return Attempt::AuthExpired;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Attempt::Fatal(Error::Transport(transport_message(status.as_u16(), &body)));
        }

        let envelope: ApiResponse<Value> = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) => {
                return Attempt::Fatal(Error::Transport(format!("invalid response body: {e}")));
            }
        };

        if !envelope.success {
            debug!(request_id, code = envelope.code, "envelope reported failure");
            return Attempt::Fatal(Error::Business {
                code: envelope.code,
                message: envelope.message,
            });
        }

        Attempt::Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// Emit the single user-visible notice for errors that get one.
    fn surface(&self, err: Error) -> Error {
        match &err {
            Error::Business { message, .. } => self.hooks.notify_error(message),
            Error::Transport(message) => self.hooks.notify_error(message),
            // Terminal auth failures speak through on_session_expired instead
            Error::SessionExpired(_) => {}
        }
        err
    }

    /// Clear stored credentials and tell the application the session is gone.
    async fn terminate_session(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear credential store");
        }
        telemetry::record_session_expired();
        self.hooks.on_session_expired();
    }
}
