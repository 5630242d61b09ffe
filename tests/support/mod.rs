// Shared stub game server for client integration tests: one axum WebSocket
// endpoint per test, with channels to observe what the client sends and to
// script what the server does.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use tokio::sync::{Mutex, mpsc};

/// One scripted server step.
pub enum ServerAction {
    /// Deliver a text frame to the connected client.
    Send(String),
    /// Close the current socket.
    Close,
}

#[derive(Clone)]
struct StubState {
    frames_tx: mpsc::Sender<String>,
    actions: Arc<Mutex<mpsc::Receiver<ServerAction>>>,
    connects_tx: mpsc::Sender<()>,
}

pub struct StubServer {
    pub url: String,
    /// Text frames received from the client, in arrival order.
    pub frames: mpsc::Receiver<String>,
    /// Script input for the currently connected socket.
    pub actions: mpsc::Sender<ServerAction>,
    /// One item per accepted WebSocket connection.
    pub connects: mpsc::Receiver<()>,
}

/// Binds an ephemeral port and serves the stub until the test process exits.
pub async fn spawn_stub() -> StubServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");

    let (frames_tx, frames_rx) = mpsc::channel(64);
    let (actions_tx, actions_rx) = mpsc::channel(64);
    let (connects_tx, connects_rx) = mpsc::channel(8);
    let state = StubState {
        frames_tx,
        actions: Arc::new(Mutex::new(actions_rx)),
        connects_tx,
    };
    let app = Router::new().route("/ws", get(upgrade)).with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server failed");
    });

    StubServer {
        url: format!("ws://{addr}/ws"),
        frames: frames_rx,
        actions: actions_tx,
        connects: connects_rx,
    }
}

async fn upgrade(State(state): State<StubState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| conversation(socket, state))
}

async fn conversation(mut socket: WebSocket, state: StubState) {
    let _ = state.connects_tx.send(()).await;
    // Reconnecting clients reuse the same script channel; only one socket is
    // live at a time in these tests.
    let mut actions = state.actions.lock().await;
    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = state.frames_tx.send(text.to_string()).await;
                }
                Some(Ok(_)) => {}
                _ => return,
            },
            action = actions.recv() => match action {
                Some(ServerAction::Send(text)) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        return;
                    }
                }
                Some(ServerAction::Close) | None => {
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                }
            },
        }
    }
}

/// Receives one client frame or fails the test after `within`.
pub async fn recv_frame(frames: &mut mpsc::Receiver<String>, within: Duration) -> String {
    tokio::time::timeout(within, frames.recv())
        .await
        .expect("timed out waiting for a client frame")
        .expect("stub frame channel closed")
}

/// Receives the next structured (JSON) frame, skipping heartbeats.
pub async fn recv_json_frame(
    frames: &mut mpsc::Receiver<String>,
    within: Duration,
) -> serde_json::Value {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        let remaining = deadline
            .checked_duration_since(tokio::time::Instant::now())
            .expect("timed out waiting for a structured frame");
        let frame = recv_frame(frames, remaining).await;
        if frame.starts_with('{') {
            return serde_json::from_str(&frame).expect("client sent invalid JSON");
        }
    }
}
