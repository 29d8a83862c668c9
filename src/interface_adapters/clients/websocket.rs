use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::domain::errors::CastVoteError;
use crate::domain::exchange::InboundFrame;
use crate::domain::ports::{ConnectionEvent, VoteConnection, VoteConnector};
use crate::domain::OutboundMessage;
use crate::interface_adapters::protocol::{decode_inbound, encode_outbound};

// Opens tokio-tungstenite connections to the endpoint issued by the handshake.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    // Set once the stream has ended or `close` has run.
    closed: bool,
}

#[async_trait]
impl VoteConnector for WsConnector {
    type Connection = WsConnection;

    async fn connect(&self, endpoint: &str) -> Result<Self::Connection, CastVoteError> {
        let url = Url::parse(endpoint)
            .map_err(|e| CastVoteError::Connect(format!("invalid websocket url: {e}")))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(CastVoteError::Connect(format!(
                "unsupported websocket scheme: {}",
                url.scheme()
            )));
        }

        let (stream, response) = connect_async(url.as_str())
            .await
            .map_err(|e| CastVoteError::Connect(e.to_string()))?;
        tracing::debug!(status = %response.status(), "websocket upgraded");

        Ok(WsConnection {
            stream,
            closed: false,
        })
    }
}

#[async_trait]
impl VoteConnection for WsConnection {
    async fn send(&mut self, message: &OutboundMessage) -> Result<(), CastVoteError> {
        let text = encode_outbound(message).map_err(|e| CastVoteError::Encode(e.to_string()))?;
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| CastVoteError::Transport(e.to_string()))
    }

    async fn next_event(&mut self) -> ConnectionEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return ConnectionEvent::Frame(decode_inbound(text.as_str()));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    return ConnectionEvent::Frame(InboundFrame::unrecognized(format!(
                        "<{} bytes of binary data>",
                        bytes.len()
                    )));
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "server closed websocket");
                    // The close reply is only queued here; `close` flushes it.
                    return ConnectionEvent::Closed;
                }
                // Ping/pong are answered by tungstenite.
                Some(Ok(_)) => continue,
                Some(Err(e)) => return ConnectionEvent::Error(e.to_string()),
                None => {
                    self.closed = true;
                    return ConnectionEvent::Closed;
                }
            }
        }
    }

    async fn close(&mut self) {
        // Only a finished stream skips this; after a peer close the call still
        // flushes the queued close reply.
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "websocket close failed");
        }
    }
}
