use std::fmt;

use tokio::sync::mpsc;

use crate::events::BroadcastEvent;

/// Opaque identifier for one client connection, unique for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a non-blocking push into a sink failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SinkPushError {
    /// Queue at capacity; the consumer is too slow
    Full,
    /// The consumer side was dropped
    Closed,
}

/// Registry-side half of one client connection.
///
/// Holds the sending end of the connection's bounded queue. Dropping it
/// closes the queue, which wakes a blocked [`EventStream::next_event`].
pub(crate) struct ClientSink {
    tx: mpsc::Sender<BroadcastEvent>,
}

impl ClientSink {
    /// Create the sink and its transport-side stream, sharing a bounded queue
    pub(crate) fn channel(id: ConnectionId, capacity: usize) -> (Self, EventStream) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, EventStream { id, rx })
    }

    /// Enqueue an event without blocking
    pub(crate) fn push(&self, event: BroadcastEvent) -> Result<(), SinkPushError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkPushError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkPushError::Closed,
        })
    }
}

/// Transport-side half of one client connection.
///
/// The connection's write loop drains this stream and frames each event for
/// its client. Returned by `EventBroadcaster::connect`.
pub struct EventStream {
    id: ConnectionId,
    rx: mpsc::Receiver<BroadcastEvent>,
}

impl EventStream {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the connection was deregistered and all queued
    /// events have been drained.
    pub async fn next_event(&mut self) -> Option<BroadcastEvent> {
        self.rx.recv().await
    }
}
