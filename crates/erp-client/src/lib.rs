//! Client SDK for the retail/ERP admin backend
//!
//! The heart of the crate is the authenticated request pipeline: every call
//! carries the current bearer token, an authentication failure triggers a
//! single-flight token refresh shared by all concurrent calls, and each
//! failed call is replayed exactly once with the refreshed token. Typed
//! wrappers in [`api`] cover the backend surface.
//!
//! Session flow:
//!
//! 1. [`api::auth::login`] stores the returned credential pair
//! 2. [`ApiClient`] verbs attach the access token per call
//! 3. A 401 parks the call on the refresh coordinator; one exchange runs
//!    no matter how many calls hit it at once
//! 4. Replays carry the refreshed token; terminal failures clear the store
//!    and invoke [`SessionHooks::on_session_expired`]

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod refresh;
pub mod session;
pub mod telemetry;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::ApiClient;
pub use refresh::TokenRefresher;
pub use session::{LoggingHooks, SessionHooks};
