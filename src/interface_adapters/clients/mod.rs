// The clients defined here talk to the third-party poll service.

pub mod handshake;
pub mod websocket;

pub use handshake::{HandshakeClient, HandshakeSettings};
pub use websocket::{WsConnection, WsConnector};
