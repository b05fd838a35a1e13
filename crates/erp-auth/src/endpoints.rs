//! Backend authentication endpoint paths

/// Username/password login, returns a credential pair.
pub const LOGIN_PATH: &str = "/auth/login";

/// Server-side session invalidation.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Exchanges a refresh token for a new credential pair.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Password change for the signed-in user.
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

/// Whether a request path is one of the two credential exchanges.
///
/// A 401 from login or refresh means the submitted credentials themselves
/// were rejected; refreshing and replaying cannot succeed, so the pipeline
/// terminates the session instead.
pub fn is_auth_exchange(path: &str) -> bool {
    path.contains(LOGIN_PATH) || path.contains(REFRESH_PATH)
}
