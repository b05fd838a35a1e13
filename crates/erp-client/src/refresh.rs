//! Single-flight token refresh
//!
//! When several in-flight calls discover a rejected access token at the same
//! time, exactly one refresh exchange runs. Every caller, the one that found
//! the coordinator idle included, enqueues a oneshot waiter and awaits it;
//! the exchange itself runs in a spawned task, so cancelling a caller
//! (timeout, abort) can never strand the queue. The task settles the state
//! in one step: clear the in-flight flag, take the waiters, and deliver the
//! outcome in enqueue order. After settlement the coordinator is idle again
//! for a later, independent attempt after a fresh sign-in.
//!
//! A failed exchange is terminal for the whole queue: the task clears the
//! credential store and fires the session-expired hook exactly once, then
//! hands every waiter the same `SessionExpired` error. There is no
//! automatic retry of the exchange itself.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

use erp_auth::{Credential, CredentialStore, absolute_expiry};

use crate::error::{Error, Result};
use crate::session::SessionHooks;
use crate::telemetry;

type Delivery = Result<String>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<Delivery>>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    store: Arc<CredentialStore>,
    hooks: Arc<dyn SessionHooks>,
    state: Mutex<RefreshState>,
}

/// Coordinator that deduplicates concurrent token refreshes.
pub struct TokenRefresher {
    inner: Arc<Inner>,
}

impl TokenRefresher {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        timeout: Duration,
        store: Arc<CredentialStore>,
        hooks: Arc<dyn SessionHooks>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                timeout,
                store,
                hooks,
                state: Mutex::new(RefreshState::default()),
            }),
        }
    }

    /// Obtain a fresh access token.
    ///
    /// The caller that finds the coordinator idle starts the exchange;
    /// everyone else just joins the queue. All of them receive the same
    /// settled outcome, the token value current at settlement.
    pub async fn acquire(&self) -> Result<String> {
        let rx = {
            let mut state = self.inner.state.lock().await;
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            if state.in_flight {
                debug!("refresh already in flight, joining its queue");
            } else {
                state.in_flight = true;
                let inner = self.inner.clone();
                // Detached so the exchange settles even if every caller
                // has been cancelled by then
                tokio::spawn(async move {
                    inner.run_exchange().await;
                });
            }
            rx
        };

        match rx.await {
            Ok(outcome) => outcome,
            // Only reachable if the exchange task panicked
            Err(_) => Err(Error::SessionExpired("token refresh abandoned".into())),
        }
    }
}

impl Inner {
    /// Run one exchange to settlement and fan the outcome out.
    async fn run_exchange(&self) {
        let outcome = self.refresh_once().await;

        let waiters = {
            let mut state = self.state.lock().await;
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        debug!(waiters = waiters.len(), "delivering refresh outcome");
        for waiter in waiters {
            // A waiter that gave up (dropped its receiver) is fine to skip
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Perform exactly one refresh exchange and persist the new pair as a
    /// unit.
    ///
    /// On failure the session is terminated here, once, regardless of how
    /// many calls are queued behind the exchange.
    async fn refresh_once(&self) -> Result<String> {
        let Some(credential) = self.store.get().await else {
            warn!("refresh requested with no stored credential");
            self.terminate().await;
            return Err(Error::SessionExpired("no refresh token stored".into()));
        };

        match erp_auth::refresh_token(
            &self.http,
            &self.base_url,
            &credential.refresh_token,
            self.timeout,
        )
        .await
        {
            Ok(token) => {
                let expires = absolute_expiry(token.expires_in);
                let access_token = token.access_token.clone();
                if let Err(e) = self
                    .store
                    .set(Credential {
                        token_type: token.token_type,
                        access_token: token.access_token,
                        refresh_token: token.refresh_token,
                        expires,
                    })
                    .await
                {
                    // The in-memory pair is still updated; persistence
                    // catches up on the next successful write
                    warn!(error = %e, "failed to persist refreshed credential");
                }
                telemetry::record_refresh("success");
                info!("token refresh succeeded");
                Ok(access_token)
            }
            Err(e) => {
                telemetry::record_refresh("failure");
                warn!(error = %e, "token refresh failed, terminating session");
                self.terminate().await;
                Err(Error::SessionExpired(e.to_string()))
            }
        }
    }

    async fn terminate(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear credential store");
        }
        telemetry::record_session_expired();
        self.hooks.on_session_expired();
    }
}
