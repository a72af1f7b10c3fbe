use tokio::sync::watch;

/// Lifecycle of one relay connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    /// Received our participant id
    Identified,
    /// Samples and notices are flowing
    Streaming,
    /// Terminal
    Closed,
}

impl ConnectionState {
    pub fn can_advance_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Connecting, Identified)
                | (Connecting, Closed)
                | (Identified, Streaming)
                | (Identified, Closed)
                | (Streaming, Closed)
        )
    }
}

/// Publishes the connection state and refuses illegal transitions
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    state: std::sync::Arc<watch::Sender<ConnectionState>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        Self {
            state: std::sync::Arc::new(state),
        }
    }

    /// Move to `next` if that is a legal step; returns whether it moved
    pub fn advance(&self, next: ConnectionState) -> bool {
        self.state.send_if_modified(|current| {
            if current.can_advance_to(next) {
                tracing::debug!("Relay connection {:?} -> {:?}", current, next);
                *current = next;
                true
            } else {
                false
            }
        })
    }

    pub fn current(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let tracker = ConnectionTracker::new();
        assert!(tracker.advance(ConnectionState::Identified));
        assert!(tracker.advance(ConnectionState::Streaming));
        assert!(tracker.advance(ConnectionState::Closed));
        assert_eq!(tracker.current(), ConnectionState::Closed);
    }

    #[test]
    fn test_identified_only_once() {
        let tracker = ConnectionTracker::new();
        assert!(tracker.advance(ConnectionState::Identified));
        assert!(!tracker.advance(ConnectionState::Identified));
        assert!(tracker.advance(ConnectionState::Streaming));
        assert!(!tracker.advance(ConnectionState::Identified));
    }

    #[test]
    fn test_closed_is_terminal() {
        let tracker = ConnectionTracker::new();
        assert!(tracker.advance(ConnectionState::Closed));
        for next in [
            ConnectionState::Connecting,
            ConnectionState::Identified,
            ConnectionState::Streaming,
            ConnectionState::Closed,
        ] {
            assert!(!tracker.advance(next));
        }
    }

    #[test]
    fn test_cannot_stream_before_identified() {
        let tracker = ConnectionTracker::new();
        assert!(!tracker.advance(ConnectionState::Streaming));
        assert_eq!(tracker.current(), ConnectionState::Connecting);
    }
}
