//! Error types for authentication operations

use thiserror::Error;

/// Errors from credential storage and the token-refresh exchange.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request to the backend failed (network, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Token refresh exchange failed (non-auth status or envelope failure)
    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    /// The refresh token was rejected by the backend (401/403)
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Credential file parsing or serialization failed
    #[error("Credential parse error: {0}")]
    CredentialParse(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_display() {
        let err = Error::InvalidCredentials("refresh token rejected (401)".into());
        assert_eq!(
            err.to_string(),
            "Invalid credentials: refresh token rejected (401)"
        );
    }

    #[test]
    fn variants_are_distinguishable() {
        let rejected = Error::InvalidCredentials("401".into());
        let transport = Error::Http("connection refused".into());
        assert!(matches!(rejected, Error::InvalidCredentials(_)));
        assert!(matches!(transport, Error::Http(_)));
    }
}
