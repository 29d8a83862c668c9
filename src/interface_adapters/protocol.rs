// Wire DTOs for the poll service WebSocket protocol. Field names follow the
// service's camelCase JSON.

use crate::domain::ballot::{
    Ballot, COMMAND_AUTHENTICATE, COMMAND_VOTE, MESSAGE_TYPE_REQUEST, OutboundMessage,
    SCOPE_RIDDLE,
};
use crate::domain::exchange::{Acknowledgment, InboundFrame};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationMessageDto<'a> {
    pub message_type: u32,
    pub command_id: u32,
    pub access_token: &'a str,
}

impl<'a> AuthenticationMessageDto<'a> {
    pub fn new(access_token: &'a str) -> Self {
        Self {
            message_type: MESSAGE_TYPE_REQUEST,
            command_id: COMMAND_AUTHENTICATE,
            access_token,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteMessageDto<'a> {
    // Always null; the service assigns ids itself.
    pub id: Option<u64>,
    pub message_type: u32,
    pub command_id: u32,
    pub scope: u32,
    pub fwd: Vec<ForwardedEventDto<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardedEventDto<'a> {
    pub riddle_id: u64,
    pub message_type: u32,
    pub command_id: u32,
    pub category: &'a str,
    pub label: &'a str,
}

impl<'a> From<&'a Ballot> for VoteMessageDto<'a> {
    fn from(ballot: &'a Ballot) -> Self {
        Self {
            id: None,
            message_type: MESSAGE_TYPE_REQUEST,
            command_id: COMMAND_VOTE,
            scope: SCOPE_RIDDLE,
            fwd: ballot
                .events
                .iter()
                .map(|event| ForwardedEventDto {
                    riddle_id: ballot.riddle_id,
                    message_type: MESSAGE_TYPE_REQUEST,
                    command_id: COMMAND_VOTE,
                    category: &event.category,
                    label: &event.label,
                })
                .collect(),
        }
    }
}

/// Acknowledgment as sent by the service. `success` may be absent or null,
/// which reads as a rejection. Tags are kept as JSON numbers so `2` and
/// `2.0` compare equal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgmentDto {
    pub message_type: Number,
    pub command_id: Number,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AcknowledgmentDto {
    /// `None` when either tag is not a whole number in `u32` range.
    pub fn into_acknowledgment(self) -> Option<Acknowledgment> {
        Some(Acknowledgment {
            message_type: tag_value(&self.message_type)?,
            command_id: tag_value(&self.command_id)?,
            success: self.success.unwrap_or(false),
            reason: self.reason,
        })
    }
}

fn tag_value(number: &Number) -> Option<u32> {
    if let Some(value) = number.as_u64() {
        return u32::try_from(value).ok();
    }
    let value = number.as_f64()?;
    (value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value)).then_some(value as u32)
}

pub fn encode_outbound(message: &OutboundMessage) -> Result<String, serde_json::Error> {
    match message {
        OutboundMessage::Authenticate { access_token } => {
            serde_json::to_string(&AuthenticationMessageDto::new(access_token))
        }
        OutboundMessage::Vote(ballot) => serde_json::to_string(&VoteMessageDto::from(ballot)),
    }
}

/// Classifies a text frame. Anything that is not an acknowledgment-shaped
/// object is kept as an unrecognized frame.
pub fn decode_inbound(raw: &str) -> InboundFrame {
    // Parse as a value first: serde would also accept a JSON array for the struct.
    let ack = serde_json::from_str::<Value>(raw)
        .ok()
        .filter(Value::is_object)
        .and_then(|value| serde_json::from_value::<AcknowledgmentDto>(value).ok())
        .and_then(AcknowledgmentDto::into_acknowledgment);
    InboundFrame {
        raw: raw.to_string(),
        ack,
    }
}
