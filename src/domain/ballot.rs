// Ballot contents and the outbound messages built from them.

/// `messageType` for client-originated requests.
pub const MESSAGE_TYPE_REQUEST: u32 = 1;
/// `messageType` for server acknowledgments.
pub const MESSAGE_TYPE_RESPONSE: u32 = 2;
pub const COMMAND_VOTE: u32 = 1;
pub const COMMAND_AUTHENTICATE: u32 = 2;
/// Vote scope understood by the poll service (single riddle).
pub const SCOPE_RIDDLE: u32 = 1;

pub const CATEGORY_CORE_METRICS: &str = "core_metrics";
pub const LABEL_START: &str = "start";
pub const CATEGORY_ANSWER: &str = "answer";

/// One forwarded event inside a vote submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotEvent {
    pub category: String,
    pub label: String,
}

impl BallotEvent {
    pub fn new(category: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            label: label.into(),
        }
    }
}

/// Everything needed to describe one answer submission for one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub riddle_id: u64,
    /// Forwarded events, sent in order.
    pub events: Vec<BallotEvent>,
}

impl Ballot {
    /// Standard submission: a metrics-start event followed by the answer.
    pub fn answer(riddle_id: u64, answer: impl Into<String>) -> Self {
        Self {
            riddle_id,
            events: vec![
                BallotEvent::new(CATEGORY_CORE_METRICS, LABEL_START),
                BallotEvent::new(CATEGORY_ANSWER, answer),
            ],
        }
    }

    /// Label of the answer event, if the ballot carries one.
    pub fn answer_label(&self) -> Option<&str> {
        self.events
            .iter()
            .find(|event| event.category == CATEGORY_ANSWER)
            .map(|event| event.label.as_str())
    }
}

/// Messages the client sends over the vote connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Authenticate { access_token: String },
    Vote(Ballot),
}
