// Authenticate-then-vote state machine. Pure: the caller owns the connection
// and performs whatever `Step` the machine asks for.

use crate::domain::ballot::{
    Ballot, COMMAND_AUTHENTICATE, COMMAND_VOTE, MESSAGE_TYPE_RESPONSE, OutboundMessage,
};
use crate::domain::errors::CastVoteError;

/// Decoded server acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgment {
    pub message_type: u32,
    pub command_id: u32,
    pub success: bool,
    pub reason: Option<String>,
}

impl Acknowledgment {
    fn answers(&self, command_id: u32) -> bool {
        self.message_type == MESSAGE_TYPE_RESPONSE && self.command_id == command_id
    }
}

/// One inbound text frame: the raw payload plus its acknowledgment shape, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    pub raw: String,
    pub ack: Option<Acknowledgment>,
}

impl InboundFrame {
    pub fn unrecognized(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ack: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    AwaitingAuthAck,
    AwaitingVoteAck,
    Terminated,
}

/// What the connection owner must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Send(OutboundMessage),
    /// Event did not apply to the current phase; keep waiting.
    Ignored,
    /// Final outcome. Emitted at most once per exchange.
    Resolve(Result<(), CastVoteError>),
}

#[derive(Debug)]
pub struct VoteExchange {
    phase: Phase,
    access_token: String,
    ballot: Ballot,
}

impl VoteExchange {
    pub fn new(access_token: impl Into<String>, ballot: Ballot) -> Self {
        Self {
            phase: Phase::Connecting,
            access_token: access_token.into(),
            ballot,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    pub fn on_open(&mut self) -> Step {
        if self.phase != Phase::Connecting {
            return Step::Ignored;
        }
        self.phase = Phase::AwaitingAuthAck;
        Step::Send(OutboundMessage::Authenticate {
            access_token: self.access_token.clone(),
        })
    }

    pub fn on_frame(&mut self, frame: &InboundFrame) -> Step {
        let Some(ack) = &frame.ack else {
            return Step::Ignored;
        };

        match self.phase {
            Phase::AwaitingAuthAck if ack.answers(COMMAND_AUTHENTICATE) => {
                if ack.success {
                    self.phase = Phase::AwaitingVoteAck;
                    Step::Send(OutboundMessage::Vote(self.ballot.clone()))
                } else {
                    self.resolve(Err(CastVoteError::AuthenticationRejected(
                        ack.reason.clone(),
                    )))
                }
            }
            Phase::AwaitingVoteAck if ack.answers(COMMAND_VOTE) => {
                if ack.success {
                    self.resolve(Ok(()))
                } else {
                    self.resolve(Err(CastVoteError::VoteRejected(ack.reason.clone())))
                }
            }
            // Out-of-phase acknowledgments are treated like any unknown message.
            _ => Step::Ignored,
        }
    }

    /// Ends the exchange with a transport-level failure (error, close, timeout).
    pub fn abort(&mut self, error: CastVoteError) -> Step {
        if self.is_terminated() {
            return Step::Ignored;
        }
        self.resolve(Err(error))
    }

    fn resolve(&mut self, outcome: Result<(), CastVoteError>) -> Step {
        self.phase = Phase::Terminated;
        Step::Resolve(outcome)
    }
}
