use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::application::services::ChannelObserver;
use crate::presentation::state::AppState;

/// Per-connection buffer of pending job snapshots.
const OBSERVER_BUFFER: usize = 64;

pub async fn transcriptions_ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| observe(socket, state))
}

async fn observe(socket: WebSocket, state: AppState) {
    let (observer, mut updates) = ChannelObserver::new(OBSERVER_BUFFER);
    let observer_id = state.observers.register(Arc::new(observer));
    tracing::info!(observer_id = observer_id.as_u64(), "Observer connected");

    let (mut sender, mut receiver) = socket.split();

    let forward = tokio::spawn(async move {
        while let Some(payload) = updates.recv().await {
            if let Err(e) = sender.send(Message::Text(payload.as_ref().into())).await {
                tracing::debug!(error = %e, "Observer send failed");
                break;
            }
        }
    });

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                tracing::debug!(observer_id = observer_id.as_u64(), message = %text.as_str(), "Observer message received");
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Observer receive failed");
                break;
            }
        }
    }

    state.observers.unregister(observer_id);
    forward.abort();
    tracing::info!(observer_id = observer_id.as_u64(), "Observer disconnected");
}
