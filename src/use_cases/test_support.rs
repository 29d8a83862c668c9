use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::ballot::{COMMAND_AUTHENTICATE, COMMAND_VOTE, MESSAGE_TYPE_RESPONSE};
use crate::domain::errors::{CastVoteError, SettingsError};
use crate::domain::exchange::{Acknowledgment, InboundFrame};
use crate::domain::ports::{
    ConnectionEvent, HandshakeGateway, HandshakeReply, VoteConnection, VoteConnector,
};
use crate::domain::{OutboundMessage, SessionCredentials};

// Handshake gateway returning a canned result.
pub(crate) struct StubGateway {
    result: Result<HandshakeReply, SettingsError>,
    pub calls: Arc<AtomicUsize>,
}

impl StubGateway {
    pub(crate) fn replying(reply: HandshakeReply) -> Self {
        Self {
            result: Ok(reply),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn failing(error: SettingsError) -> Self {
        Self {
            result: Err(error),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn accepting() -> Self {
        Self::replying(HandshakeReply {
            status: 200,
            access_token: Some("token-1".to_string()),
            websocket_url: Some("wss://poll.test/ws".to_string()),
        })
    }
}

#[async_trait]
impl HandshakeGateway for StubGateway {
    async fn request_handshake(&self) -> Result<HandshakeReply, SettingsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub(crate) fn credentials() -> SessionCredentials {
    SessionCredentials {
        endpoint: "wss://poll.test/ws".to_string(),
        access_token: "token-1".to_string(),
    }
}

pub(crate) fn ack_frame(command_id: u32, success: bool, reason: Option<&str>) -> ConnectionEvent {
    ConnectionEvent::Frame(InboundFrame {
        raw: format!("{{\"messageType\":2,\"commandId\":{command_id}}}"),
        ack: Some(Acknowledgment {
            message_type: MESSAGE_TYPE_RESPONSE,
            command_id,
            success,
            reason: reason.map(str::to_string),
        }),
    })
}

pub(crate) fn auth_ack(success: bool, reason: Option<&str>) -> ConnectionEvent {
    ack_frame(COMMAND_AUTHENTICATE, success, reason)
}

pub(crate) fn vote_ack(success: bool, reason: Option<&str>) -> ConnectionEvent {
    ack_frame(COMMAND_VOTE, success, reason)
}

// Everything a scripted connection observed, shared with the test body.
#[derive(Clone, Default)]
pub(crate) struct ConnectionRecorder {
    pub connects: Arc<Mutex<Vec<String>>>,
    pub sent: Arc<Mutex<Vec<OutboundMessage>>>,
    pub closes: Arc<AtomicUsize>,
}

impl ConnectionRecorder {
    pub(crate) fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

// Connector whose connections replay a fixed event script. Once the script is
// exhausted the connection goes silent.
pub(crate) struct ScriptedConnector {
    script: Vec<ConnectionEvent>,
    connect_error: Option<CastVoteError>,
    stall_connect: bool,
    send_error: Option<CastVoteError>,
    pub recorder: ConnectionRecorder,
}

impl ScriptedConnector {
    pub(crate) fn new(script: Vec<ConnectionEvent>) -> Self {
        Self {
            script,
            connect_error: None,
            stall_connect: false,
            send_error: None,
            recorder: ConnectionRecorder::default(),
        }
    }

    pub(crate) fn refusing(error: CastVoteError) -> Self {
        Self {
            connect_error: Some(error),
            ..Self::new(Vec::new())
        }
    }

    // Connect never completes.
    pub(crate) fn stalling() -> Self {
        Self {
            stall_connect: true,
            ..Self::new(Vec::new())
        }
    }

    pub(crate) fn with_send_error(mut self, error: CastVoteError) -> Self {
        self.send_error = Some(error);
        self
    }
}

pub(crate) struct ScriptedConnection {
    events: VecDeque<ConnectionEvent>,
    send_error: Option<CastVoteError>,
    recorder: ConnectionRecorder,
}

#[async_trait]
impl VoteConnector for ScriptedConnector {
    type Connection = ScriptedConnection;

    async fn connect(&self, endpoint: &str) -> Result<Self::Connection, CastVoteError> {
        self.recorder
            .connects
            .lock()
            .expect("connects mutex poisoned")
            .push(endpoint.to_string());
        if let Some(error) = &self.connect_error {
            return Err(error.clone());
        }
        if self.stall_connect {
            std::future::pending::<()>().await;
        }
        Ok(ScriptedConnection {
            events: self.script.iter().cloned().collect(),
            send_error: self.send_error.clone(),
            recorder: self.recorder.clone(),
        })
    }
}

#[async_trait]
impl VoteConnection for ScriptedConnection {
    async fn send(&mut self, message: &OutboundMessage) -> Result<(), CastVoteError> {
        if let Some(error) = &self.send_error {
            return Err(error.clone());
        }
        self.recorder
            .sent
            .lock()
            .expect("sent mutex poisoned")
            .push(message.clone());
        Ok(())
    }

    async fn next_event(&mut self) -> ConnectionEvent {
        match self.events.pop_front() {
            Some(event) => event,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.recorder.closes.fetch_add(1, Ordering::SeqCst);
    }
}
