//! Error taxonomy for the request pipeline
//!
//! Callers see exactly three classes of failure. A business failure means
//! the backend processed the request and said no; it is never retried. A
//! session-expired failure is terminal: the credential pair is gone and the
//! user must sign in again. Everything else is transport. The recoverable
//! "access token expired" state never escapes the pipeline; by the time an
//! error reaches a caller, refresh-and-replay has already run its course.
//!
//! The type is `Clone` so a single refresh outcome can fan out to every
//! queued waiter.

use thiserror::Error;

use common::ApiResponse;

/// A request pipeline failure.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Transport succeeded but the response envelope reported failure.
    /// Carries the backend's own message, suitable for display as-is.
    #[error("{message}")]
    Business { code: i32, message: String },

    /// Terminal authentication failure; the session has been torn down.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Network failure, timeout, or an unrecoverable HTTP status.
    #[error("{0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fixed user-facing message for an unrecoverable HTTP status.
///
/// Unmapped statuses fall back to the backend's envelope message when the
/// body carries one, then to a generic message.
pub fn transport_message(status: u16, body: &str) -> String {
    match status {
        400 => "Invalid request parameters".into(),
        401 => "Unauthorized, please sign in again".into(),
        403 => "Insufficient permissions for this operation".into(),
        404 => "Requested resource not found".into(),
        500 => "Internal server error".into(),
        502 => "Bad gateway".into(),
        503 => "Service temporarily unavailable".into(),
        504 => "Gateway timeout".into(),
        _ => envelope_message(body)
            .unwrap_or_else(|| format!("Request failed with status {status}")),
    }
}

/// Pull the backend message out of an error body, if it parses as the
/// standard envelope.
fn envelope_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .map(|envelope| envelope.message)
        .filter(|message| !message.is_empty())
}

/// Classify a reqwest-level failure (the request never produced a response).
pub(crate) fn from_reqwest(err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Transport("Request timed out, please try again later".into())
    } else if err.is_connect() {
        Error::Transport("Network connection error, check your connection".into())
    } else {
        Error::Transport(format!("Request failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_statuses_use_fixed_messages() {
        assert_eq!(transport_message(400, ""), "Invalid request parameters");
        assert_eq!(
            transport_message(401, ""),
            "Unauthorized, please sign in again"
        );
        assert_eq!(
            transport_message(403, ""),
            "Insufficient permissions for this operation"
        );
        assert_eq!(transport_message(404, ""), "Requested resource not found");
        assert_eq!(transport_message(500, ""), "Internal server error");
        assert_eq!(transport_message(502, ""), "Bad gateway");
        assert_eq!(
            transport_message(503, ""),
            "Service temporarily unavailable"
        );
        assert_eq!(transport_message(504, ""), "Gateway timeout");
    }

    #[test]
    fn unmapped_status_prefers_backend_message() {
        let body = r#"{"success": false, "code": 409, "message": "version conflict"}"#;
        assert_eq!(transport_message(409, body), "version conflict");
    }

    #[test]
    fn unmapped_status_with_opaque_body_is_generic() {
        assert_eq!(
            transport_message(418, "<html>teapot</html>"),
            "Request failed with status 418"
        );
        assert_eq!(transport_message(418, ""), "Request failed with status 418");
    }

    #[test]
    fn business_error_displays_backend_message() {
        let err = Error::Business {
            code: 400,
            message: "SKU duplicate".into(),
        };
        assert_eq!(err.to_string(), "SKU duplicate");
    }

    #[test]
    fn errors_clone_for_waiter_fanout() {
        let err = Error::SessionExpired("refresh token rejected".into());
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
