// Domain layer: vote exchange model and the ports it depends on.

pub mod ballot;
pub mod credentials;
pub mod errors;
pub mod exchange;
pub mod ports;

pub use ballot::{Ballot, BallotEvent, OutboundMessage};
pub use credentials::SessionCredentials;
pub use errors::{AttemptError, CastVoteError, ErrorKind, SettingsError};
pub use exchange::{Acknowledgment, InboundFrame, Phase, Step, VoteExchange};
pub use ports::{
    ConnectionEvent, HandshakeGateway, HandshakeReply, ProgressLog, VoteConnection, VoteConnector,
};
