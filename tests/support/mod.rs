// Local stand-in for the poll service: handshake route plus WebSocket route.
use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

// Token the mock issues and later expects in the authentication message.
pub const ISSUED_TOKEN: &str = "mock-token-1";

// Knobs for the scenarios the integration tests exercise.
#[derive(Debug, Clone, Copy)]
pub struct MockBehavior {
    pub status: StatusCode,
    pub issue_token: bool,
    pub issue_endpoint: bool,
    pub accept_auth: bool,
    pub accept_vote: bool,
    // Send an unrelated frame before acknowledging the vote.
    pub noise_before_vote_ack: bool,
    // Start the closing handshake instead of acknowledging authentication.
    pub close_after_auth: bool,
    // Never answer the authentication message.
    pub silent_after_auth: bool,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            issue_token: true,
            issue_endpoint: true,
            accept_auth: true,
            accept_vote: true,
            noise_before_vote_ack: false,
            close_after_auth: false,
            silent_after_auth: false,
        }
    }
}

// Everything the mock observed, for assertions.
#[derive(Debug, Default)]
pub struct Recorded {
    pub handshake_riddle_ids: Vec<u64>,
    pub handshake_headers: Vec<HeaderMap>,
    pub ws_messages: Vec<Value>,
    pub client_closed: bool,
}

struct MockState {
    behavior: MockBehavior,
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
}

pub struct MockPoll {
    // Base handshake URL, without the riddle id.
    pub handshake_base_url: String,
    pub recorded: Arc<Mutex<Recorded>>,
}

impl MockPoll {
    pub fn ws_messages(&self) -> Vec<Value> {
        self.recorded.lock().expect("recorded mutex").ws_messages.clone()
    }

    pub fn handshake_headers(&self) -> Vec<HeaderMap> {
        self.recorded
            .lock()
            .expect("recorded mutex")
            .handshake_headers
            .clone()
    }

    pub fn handshake_riddle_ids(&self) -> Vec<u64> {
        self.recorded
            .lock()
            .expect("recorded mutex")
            .handshake_riddle_ids
            .clone()
    }

    // The close frame races the test body, so poll for it briefly.
    pub async fn wait_for_client_close(&self) -> bool {
        for _ in 0..100 {
            if self.recorded.lock().expect("recorded mutex").client_closed {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

// Start the mock on an ephemeral port inside the current test runtime.
pub async fn spawn_mock_poll(behavior: MockBehavior) -> MockPoll {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    let recorded = Arc::new(Mutex::new(Recorded::default()));

    let state = Arc::new(MockState {
        behavior,
        addr,
        recorded: recorded.clone(),
    });
    let app = Router::new()
        .route(
            "/embed/ws/handshake/access-token/{riddle_id}",
            get(handshake),
        )
        .route("/ws", get(ws_upgrade))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock poll server");
    });

    MockPoll {
        handshake_base_url: format!("http://{addr}/embed/ws/handshake/access-token"),
        recorded,
    }
}

async fn handshake(
    State(state): State<Arc<MockState>>,
    Path(riddle_id): Path<u64>,
    headers: HeaderMap,
) -> impl IntoResponse {
    {
        let mut recorded = state.recorded.lock().expect("recorded mutex");
        recorded.handshake_riddle_ids.push(riddle_id);
        recorded.handshake_headers.push(headers);
    }

    let mut response_headers = HeaderMap::new();
    if state.behavior.issue_token {
        response_headers.insert("x-access-token", HeaderValue::from_static(ISSUED_TOKEN));
    }
    if state.behavior.issue_endpoint {
        let endpoint = format!("ws://{}/ws", state.addr);
        response_headers.insert(
            "x-websocket-url",
            HeaderValue::from_str(&endpoint).expect("endpoint header"),
        );
    }
    (state.behavior.status, response_headers)
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<MockState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_vote(socket, state))
}

async fn serve_vote(mut socket: WebSocket, state: Arc<MockState>) {
    let behavior = state.behavior;
    while let Some(Ok(message)) = socket.recv().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => {
                state.recorded.lock().expect("recorded mutex").client_closed = true;
                break;
            }
            _ => continue,
        };
        let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
            continue;
        };
        state
            .recorded
            .lock()
            .expect("recorded mutex")
            .ws_messages
            .push(value.clone());

        let mut replies = Vec::new();
        match value["commandId"].as_u64() {
            Some(2) if behavior.close_after_auth => {
                if socket.send(Message::Close(None)).await.is_err() {
                    return;
                }
                // Keep reading so the client's close reply is observed.
                continue;
            }
            Some(2) if behavior.silent_after_auth => continue,
            Some(2) => {
                if behavior.accept_auth && value["accessToken"] == ISSUED_TOKEN {
                    replies.push(json!({"messageType": 2, "commandId": 2, "success": true}));
                } else {
                    replies.push(json!({
                        "messageType": 2,
                        "commandId": 2,
                        "success": false,
                        "reason": "bad_token"
                    }));
                }
            }
            Some(1) => {
                if behavior.noise_before_vote_ack {
                    replies.push(json!({"messageType": 3, "commandId": 7, "stats": [1, 2]}));
                }
                if behavior.accept_vote {
                    replies.push(json!({"messageType": 2, "commandId": 1, "success": true}));
                } else {
                    replies.push(json!({
                        "messageType": 2,
                        "commandId": 1,
                        "success": false,
                        "reason": "poll_closed"
                    }));
                }
            }
            _ => continue,
        }

        for reply in replies {
            if socket
                .send(Message::Text(reply.to_string().into()))
                .await
                .is_err()
            {
                return;
            }
        }
    }
}
