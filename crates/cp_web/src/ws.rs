use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use tracing::{debug, info};

use crate::AppState;

pub async fn progress_socket(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| forward_progress(socket, state))
}

/// Relay hub messages to one client until either side goes away.
async fn forward_progress(mut socket: WebSocket, state: Arc<AppState>) {
    let (id, mut events) = state.hub.subscribe_channel().await;
    info!(%id, "🔌 Progress subscriber connected");

    loop {
        tokio::select! {
            outbound = events.recv() => match outbound {
                Some(text) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Client chatter is ignored.
                Some(Ok(_)) => {}
            },
        }
    }

    state.hub.unsubscribe(id).await;
    debug!(%id, "Progress subscriber gone");
}
