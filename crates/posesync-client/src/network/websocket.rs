use futures_util::{SinkExt, StreamExt};
use posesync_protocol::{ClientMessage, ParticipantId, Sample, ServerMessage};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::error::ClientError;
use crate::state::{ConnectionState, ConnectionTracker, SharedView};

/// Where the capture loop hands finished samples
pub trait SampleSink: Send + Sync {
    /// Queue a sample for the relay without waiting for it to be written
    fn send_sample(&self, sample: &Sample) -> Result<(), ClientError>;
}

pub struct RelayClient {
    id: ParticipantId,
    sender: mpsc::UnboundedSender<String>,
    tracker: ConnectionTracker,
}

impl RelayClient {
    /// Connect and wait for the relay to assign our id.
    ///
    /// Any failure before the id arrives is returned as an error; after
    /// that, transport loss only moves the connection to `Closed`.
    pub async fn connect(url: &str, view: SharedView) -> Result<Self, ClientError> {
        let tracker = ConnectionTracker::new();

        let (ws_stream, _) = connect_async(url).await?;
        let (mut write, mut read) = ws_stream.split();

        // The first message must be the identity notice
        let id = loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => match ServerMessage::parse(&text) {
                    Ok(ServerMessage::SetId { id }) => break id,
                    Ok(other) => {
                        return Err(ClientError::Handshake(format!(
                            "expected setId first, got {:?}",
                            other
                        )));
                    }
                    Err(e) => {
                        return Err(ClientError::Handshake(format!(
                            "unreadable identity notice: {}",
                            e
                        )));
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    return Err(ClientError::Handshake(
                        "connection closed before identification".to_string(),
                    ));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return Err(e.into());
                }
            }
        };

        tracker.advance(ConnectionState::Identified);
        tracing::info!("Relay assigned participant id {}", id);

        // Spawn task to handle outgoing samples
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let write_tracker = tracker.clone();
        tokio::spawn(async move {
            while let Some(json) = rx.recv().await {
                if let Err(e) = write.send(Message::Text(json.into())).await {
                    tracing::warn!("Failed to send sample: {}", e);
                    write_tracker.advance(ConnectionState::Closed);
                    return;
                }
            }
            // Every sender is gone, say goodbye
            let _ = write.close().await;
        });

        // Spawn task to handle incoming notices
        let read_tracker = tracker.clone();
        tokio::spawn(async move {
            while let Some(result) = read.next().await {
                match result {
                    Ok(Message::Text(text)) => match ServerMessage::parse(&text) {
                        Ok(ServerMessage::Landmarks { landmarks }) => {
                            read_tracker.advance(ConnectionState::Streaming);
                            view.replace(landmarks).await;
                        }
                        Ok(ServerMessage::SetId { id }) => {
                            tracing::warn!("Ignoring repeated id assignment ({})", id);
                        }
                        Err(e) => {
                            tracing::warn!("Skipping malformed notice: {}", e);
                        }
                    },
                    Ok(Message::Close(_)) => {
                        tracing::info!("Relay closed the connection");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Relay connection error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            read_tracker.advance(ConnectionState::Closed);
        });

        Ok(Self {
            id,
            sender: tx,
            tracker,
        })
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.tracker.current()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.tracker.subscribe()
    }
}

impl SampleSink for RelayClient {
    fn send_sample(&self, sample: &Sample) -> Result<(), ClientError> {
        if self.tracker.current() == ConnectionState::Closed {
            return Err(ClientError::Closed);
        }

        let json = ClientMessage::encode(sample)?;
        self.sender.send(json).map_err(|_| ClientError::Closed)?;
        self.tracker.advance(ConnectionState::Streaming);
        Ok(())
    }
}
