use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use crate::error::{BroadcasterError, Result};
use crate::events::BroadcastEvent;
use crate::sink::{ClientSink, ConnectionId, EventStream, SinkPushError};

/// Live mapping of connection id to client sink.
///
/// The map is the one piece of shared mutable state in the crate. The lock is
/// held only across non-blocking work: inserting or removing a sink, and the
/// enqueue-or-evict pass of [`broadcast`](Self::broadcast). A slow consumer
/// can therefore never stall producers or other clients.
pub struct ConnectionRegistry {
    sinks: Mutex<HashMap<ConnectionId, ClientSink>>,
    next_id: AtomicU64,
    queue_capacity: usize,
    max_connections: Option<usize>,
}

impl ConnectionRegistry {
    pub fn new(queue_capacity: usize, max_connections: Option<usize>) -> Self {
        Self {
            sinks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            queue_capacity,
            max_connections,
        }
    }

    /// Register a new client sink and return its transport-side stream
    pub async fn register(&self) -> Result<EventStream> {
        let mut sinks = self.sinks.lock().await;

        if let Some(limit) = self.max_connections {
            if sinks.len() >= limit {
                tracing::warn!(limit, "Connection rejected, registry full");
                return Err(BroadcasterError::ConnectionRejected { limit });
            }
        }

        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sink, stream) = ClientSink::channel(id, self.queue_capacity);
        sinks.insert(id, sink);

        tracing::info!(connection_id = %id, clients = sinks.len(), "Client registered");
        Ok(stream)
    }

    /// Remove a sink if present. Returns whether it was registered.
    ///
    /// Removing an unknown id is a no-op, so double-deregistration is safe.
    pub async fn deregister(&self, id: ConnectionId) -> bool {
        let mut sinks = self.sinks.lock().await;
        let removed = sinks.remove(&id).is_some();
        if removed {
            tracing::info!(connection_id = %id, clients = sinks.len(), "Client deregistered");
        }
        removed
    }

    /// Deliver a copy of `event` to every registered sink, evicting dead ones.
    ///
    /// A sink whose queue is full or whose consumer is gone is removed in the
    /// same pass; the remaining sinks still receive the event.
    pub async fn broadcast(&self, event: BroadcastEvent) {
        let mut sinks = self.sinks.lock().await;
        let mut evicted = Vec::new();

        for (id, sink) in sinks.iter() {
            match sink.push(event.clone()) {
                Ok(()) => {}
                Err(SinkPushError::Full) => {
                    tracing::warn!(connection_id = %id, "Client queue full, evicting slow consumer");
                    evicted.push(*id);
                }
                Err(SinkPushError::Closed) => {
                    tracing::warn!(connection_id = %id, "Client stream dropped, evicting");
                    evicted.push(*id);
                }
            }
        }

        for id in evicted {
            sinks.remove(&id);
            tracing::info!(connection_id = %id, clients = sinks.len(), "Removed dead client");
        }
    }

    /// Number of live connections
    pub async fn count(&self) -> usize {
        self.sinks.lock().await.len()
    }

    /// Remove every sink (shutdown path). Returns how many were closed.
    pub async fn clear(&self) -> usize {
        let mut sinks = self.sinks.lock().await;
        let closed = sinks.len();
        sinks.clear();
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_register_and_count() {
        let registry = ConnectionRegistry::new(8, None);
        assert_eq!(registry.count().await, 0);

        let _a = assert_ok!(registry.register().await);
        let _b = assert_ok!(registry.register().await);
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_register_unique_ids() {
        let registry = ConnectionRegistry::new(8, None);
        let a = registry.register().await.unwrap();
        let b = registry.register().await.unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_max_connections_limit() {
        let registry = ConnectionRegistry::new(8, Some(1));
        let _a = registry.register().await.unwrap();

        let rejected = registry.register().await;
        assert!(matches!(
            rejected,
            Err(BroadcasterError::ConnectionRejected { limit: 1 })
        ));

        // Rejection must not leak a registry slot
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_deregister_idempotent() {
        let registry = ConnectionRegistry::new(8, None);
        let stream = registry.register().await.unwrap();
        let id = stream.id();

        assert!(registry.deregister(id).await);
        assert!(!registry.deregister(id).await);
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_sinks() {
        let registry = ConnectionRegistry::new(8, None);
        let mut a = registry.register().await.unwrap();
        let mut b = registry.register().await.unwrap();

        registry.broadcast(BroadcastEvent::summary_ready("v1")).await;

        assert_eq!(a.next_event().await.unwrap().kind(), "summary.ready");
        assert_eq!(b.next_event().await.unwrap().kind(), "summary.ready");
    }

    #[tokio::test]
    async fn test_full_queue_evicts_sink() {
        let registry = ConnectionRegistry::new(1, None);
        let _stalled = registry.register().await.unwrap();

        registry.broadcast(BroadcastEvent::heartbeat()).await;
        assert_eq!(registry.count().await, 1);

        // Second event overflows the capacity-1 queue; the sink is evicted
        // instead of the broadcast blocking.
        registry.broadcast(BroadcastEvent::heartbeat()).await;
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_dropped_stream_evicted_on_broadcast() {
        let registry = ConnectionRegistry::new(8, None);
        let stream = registry.register().await.unwrap();
        drop(stream);

        registry.broadcast(BroadcastEvent::heartbeat()).await;
        assert_eq!(registry.count().await, 0);
    }
}
