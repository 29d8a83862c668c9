use async_trait::async_trait;

use crate::domain::ballot::OutboundMessage;
use crate::domain::errors::{CastVoteError, SettingsError};
use crate::domain::exchange::InboundFrame;

/// Raw handshake response, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeReply {
    pub status: u16,
    pub access_token: Option<String>,
    pub websocket_url: Option<String>,
}

// Port for the HTTP handshake used by the settings use case.
#[async_trait]
pub trait HandshakeGateway: Send + Sync {
    async fn request_handshake(&self) -> Result<HandshakeReply, SettingsError>;
}

/// Events surfaced by an open vote connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Frame(InboundFrame),
    Error(String),
    Closed,
}

// One open message connection. Owned by a single vote attempt.
#[async_trait]
pub trait VoteConnection: Send {
    async fn send(&mut self, message: &OutboundMessage) -> Result<(), CastVoteError>;
    async fn next_event(&mut self) -> ConnectionEvent;
    /// Idempotent; closing an already closed connection is a no-op.
    async fn close(&mut self);
}

// Port for opening vote connections.
#[async_trait]
pub trait VoteConnector: Send + Sync {
    type Connection: VoteConnection;

    async fn connect(&self, endpoint: &str) -> Result<Self::Connection, CastVoteError>;
}

// Port for human-readable progress output.
pub trait ProgressLog: Send + Sync {
    fn append_line(&self, line: &str);
}
