use crate::state::AppState;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use posesync_protocol::{ClientMessage, ParticipantId};
use tokio::sync::mpsc;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    upgrade(ws, state)
}

pub(crate) fn upgrade(ws: WebSocketUpgrade, state: AppState) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for outbound messages
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Registration queues the setId notice ahead of any broadcast
    let participant_id = state.relay.register(tx).await;
    tracing::info!("Participant {} joined", participant_id);

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_sample(&state, &participant_id, text.as_str()).await;
            }
            Ok(Message::Binary(data)) => match std::str::from_utf8(&data) {
                Ok(text) => handle_sample(&state, &participant_id, text).await,
                Err(e) => {
                    tracing::warn!("Non UTF-8 frame from {}: {}", participant_id, e);
                }
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::warn!("WebSocket error for {}: {}", participant_id, e);
                break;
            }
            _ => {}
        }
    }

    // Cleanup on disconnect
    state.relay.unregister(&participant_id).await;

    send_task.abort();

    tracing::info!("Participant {} left", participant_id);
}

async fn handle_sample(state: &AppState, participant_id: &ParticipantId, text: &str) {
    match ClientMessage::parse(text) {
        Ok(sample) => state.relay.submit(participant_id, sample).await,
        Err(e) => {
            tracing::warn!("Dropping invalid sample from {}: {}", participant_id, e);
        }
    }
}
