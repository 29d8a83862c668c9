// Domain-level errors for the handshake and the vote exchange.
use std::fmt;

/// Coarse failure taxonomy used when reporting an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    HttpFailure,
    TransportFailure,
    ProtocolRejection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    UnexpectedStatus(u16),
    MissingAccessToken,
    MissingEndpoint,
    // Request never produced a response (DNS, TLS, connect, client timeout).
    Request(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::UnexpectedStatus(status) => {
                write!(f, "unexpected status code: {status}")
            }
            SettingsError::MissingAccessToken => {
                write!(f, "access token not found in response headers")
            }
            SettingsError::MissingEndpoint => {
                write!(f, "websocket url not found in response headers")
            }
            SettingsError::Request(message) => write!(f, "handshake request failed: {message}"),
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastVoteError {
    Connect(String),
    Transport(String),
    Encode(String),
    ConnectionClosed,
    TimedOut,
    AuthenticationRejected(Option<String>),
    VoteRejected(Option<String>),
}

impl CastVoteError {
    /// Server-supplied reason for protocol rejections.
    pub fn reason(&self) -> Option<&str> {
        match self {
            CastVoteError::AuthenticationRejected(reason) | CastVoteError::VoteRejected(reason) => {
                reason.as_deref()
            }
            _ => None,
        }
    }
}

fn reason_or_unknown(reason: &Option<String>) -> &str {
    reason.as_deref().unwrap_or("unknown reason")
}

impl fmt::Display for CastVoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastVoteError::Connect(message) => write!(f, "websocket connect failed: {message}"),
            CastVoteError::Transport(message) => write!(f, "websocket error: {message}"),
            CastVoteError::Encode(message) => write!(f, "failed to encode message: {message}"),
            CastVoteError::ConnectionClosed => {
                write!(f, "connection closed before acknowledgment")
            }
            CastVoteError::TimedOut => write!(f, "timed out waiting for acknowledgment"),
            CastVoteError::AuthenticationRejected(reason) => {
                write!(f, "Authentication failed: {}", reason_or_unknown(reason))
            }
            CastVoteError::VoteRejected(reason) => {
                write!(f, "Vote failed: {}", reason_or_unknown(reason))
            }
        }
    }
}

impl std::error::Error for CastVoteError {}

/// Failure of one fetch-then-cast attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    Settings(SettingsError),
    CastVote(CastVoteError),
}

impl AttemptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttemptError::Settings(_) => ErrorKind::HttpFailure,
            AttemptError::CastVote(
                CastVoteError::AuthenticationRejected(_) | CastVoteError::VoteRejected(_),
            ) => ErrorKind::ProtocolRejection,
            AttemptError::CastVote(_) => ErrorKind::TransportFailure,
        }
    }
}

impl From<SettingsError> for AttemptError {
    fn from(err: SettingsError) -> Self {
        AttemptError::Settings(err)
    }
}

impl From<CastVoteError> for AttemptError {
    fn from(err: CastVoteError) -> Self {
        AttemptError::CastVote(err)
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Settings(err) => write!(f, "{err}"),
            AttemptError::CastVote(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AttemptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttemptError::Settings(err) => Some(err),
            AttemptError::CastVote(err) => Some(err),
        }
    }
}
