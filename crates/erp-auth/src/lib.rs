//! Authentication primitives for the ERP backend
//!
//! Covers the pieces the request pipeline builds on: the persisted
//! credential pair, the auth endpoint paths, and the raw token-refresh
//! exchange. The exchange deliberately lives outside the pipeline so a
//! rejected refresh can never recurse into another refresh.

pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod token;

pub use credentials::{Credential, CredentialStore};
pub use endpoints::{
    CHANGE_PASSWORD_PATH, LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH, is_auth_exchange,
};
pub use error::{Error, Result};
pub use token::{LoginResponse, TokenResponse, UserInfo, absolute_expiry, refresh_token};
