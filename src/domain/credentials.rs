use std::fmt;

/// Connection credentials issued by the poll handshake.
///
/// Valid for a single vote attempt; the access token is short-lived on the
/// service side, so these are never cached between attempts.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    /// WebSocket endpoint the vote exchange connects to.
    pub endpoint: String,
    pub access_token: String,
}

// Keep the token out of debug logs.
impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
