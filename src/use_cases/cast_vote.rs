use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};

use crate::domain::errors::CastVoteError;
use crate::domain::exchange::{Step, VoteExchange};
use crate::domain::ports::{ConnectionEvent, ProgressLog, VoteConnection, VoteConnector};
use crate::domain::{Ballot, OutboundMessage, SessionCredentials};

// Vote use case: drives one `VoteExchange` over one connection.
pub struct CastVoteUseCase<C> {
    pub connector: C,
    pub ballot: Ballot,
    /// Upper bound for connect plus both acknowledgments.
    pub exchange_timeout: Duration,
    pub log: Arc<dyn ProgressLog>,
}

impl<C> CastVoteUseCase<C>
where
    C: VoteConnector,
{
    pub async fn execute(&self, credentials: &SessionCredentials) -> Result<(), CastVoteError> {
        self.log.append_line("Casting vote...");
        let deadline = Instant::now() + self.exchange_timeout;

        let connect = self.connector.connect(&credentials.endpoint);
        let mut connection = match timeout_at(deadline, connect).await {
            Ok(Ok(connection)) => connection,
            Ok(Err(e)) => return Err(self.report(e)),
            Err(_) => return Err(self.report(CastVoteError::TimedOut)),
        };
        self.log.append_line("WebSocket connection established.");

        let mut exchange = VoteExchange::new(credentials.access_token.clone(), self.ballot.clone());
        let outcome = self.drive(&mut connection, &mut exchange, deadline).await;

        // Single close point for every outcome.
        connection.close().await;
        self.log.append_line("WebSocket connection closed.");

        if let Err(e) = &outcome {
            tracing::debug!(error = %e, phase = ?exchange.phase(), "vote exchange failed");
        }
        outcome
    }

    async fn drive<T>(
        &self,
        connection: &mut T,
        exchange: &mut VoteExchange,
        deadline: Instant,
    ) -> Result<(), CastVoteError>
    where
        T: VoteConnection,
    {
        let mut step = exchange.on_open();
        loop {
            match step {
                Step::Send(message) => {
                    if let Err(e) = self.send(connection, &message, deadline).await {
                        step = exchange.abort(self.report(e));
                        continue;
                    }
                }
                Step::Ignored => {}
                Step::Resolve(outcome) => {
                    if outcome.is_ok() {
                        self.log.append_line("Vote successful.");
                    }
                    return outcome;
                }
            }

            step = match timeout_at(deadline, connection.next_event()).await {
                Ok(ConnectionEvent::Frame(frame)) => {
                    let step = exchange.on_frame(&frame);
                    match &step {
                        Step::Ignored => {
                            self.log
                                .append_line(&format!("Received unknown message: {}", frame.raw));
                        }
                        Step::Send(OutboundMessage::Vote(_)) => {
                            self.log.append_line("Authentication successful.");
                        }
                        _ => {}
                    }
                    step
                }
                Ok(ConnectionEvent::Error(message)) => {
                    self.log.append_line(&format!("WebSocket error: {message}"));
                    exchange.abort(CastVoteError::Transport(message))
                }
                Ok(ConnectionEvent::Closed) => exchange.abort(CastVoteError::ConnectionClosed),
                Err(_) => exchange.abort(self.report(CastVoteError::TimedOut)),
            };
        }
    }

    // Connection-level failures share one progress line format.
    fn report(&self, error: CastVoteError) -> CastVoteError {
        self.log.append_line(&format!("WebSocket error: {error}"));
        error
    }

    async fn send<T>(
        &self,
        connection: &mut T,
        message: &OutboundMessage,
        deadline: Instant,
    ) -> Result<(), CastVoteError>
    where
        T: VoteConnection,
    {
        timeout_at(deadline, connection.send(message))
            .await
            .map_err(|_| CastVoteError::TimedOut)??;

        match message {
            OutboundMessage::Authenticate { .. } => {
                self.log.append_line("Authentication message sent.")
            }
            OutboundMessage::Vote(_) => self.log.append_line("Vote message sent."),
        }
        Ok(())
    }
}
