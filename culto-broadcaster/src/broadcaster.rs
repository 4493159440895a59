use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::Result;
use crate::events::BroadcastEvent;
use crate::heartbeat::HeartbeatScheduler;
use crate::registry::ConnectionRegistry;
use crate::sink::{ConnectionId, EventStream};

/// Configuration for the broadcast service
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    /// Per-client queue bound; a client that falls this far behind is evicted
    pub queue_capacity: usize,
    /// Optional cap on simultaneous connections
    pub max_connections: Option<usize>,
    /// Cadence of heartbeat events
    pub heartbeat_interval: Duration,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            max_connections: None,
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

impl BroadcasterConfig {
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn max_connections(mut self, limit: usize) -> Self {
        self.max_connections = Some(limit);
        self
    }

    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }
}

/// Snapshot returned by [`EventBroadcaster::health`]
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub connected_clients: usize,
}

/// Event fan-out service for connected stream clients.
///
/// Owns the connection registry and the heartbeat scheduler. Constructed
/// explicitly and handed to whatever accepts connections and whatever
/// produces events; there is no process-wide instance.
pub struct EventBroadcaster {
    registry: Arc<ConnectionRegistry>,
    heartbeat: HeartbeatScheduler,
    config: BroadcasterConfig,
}

impl EventBroadcaster {
    /// Create a broadcaster with default configuration
    pub fn new() -> Self {
        Self::with_config(BroadcasterConfig::default())
    }

    pub fn with_config(config: BroadcasterConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(
            config.queue_capacity,
            config.max_connections,
        ));
        let heartbeat = HeartbeatScheduler::new(Arc::clone(&registry));

        Self {
            registry,
            heartbeat,
            config,
        }
    }

    /// Start emitting heartbeats. No-op if already started.
    pub async fn start(&self) {
        self.heartbeat.start(self.config.heartbeat_interval).await;
    }

    /// Register a new client connection.
    ///
    /// Returns the stream its transport loop drains. Fails only when a
    /// configured connection limit is reached.
    pub async fn connect(&self) -> Result<EventStream> {
        self.registry.register().await
    }

    /// Tear down one client connection. Safe to call more than once.
    pub async fn disconnect(&self, id: ConnectionId) {
        self.registry.deregister(id).await;
    }

    /// Deliver an event to every connected client.
    ///
    /// Safe to call from any number of concurrent producers. A failing client
    /// is evicted; the failure never reaches the caller.
    pub async fn broadcast_event(&self, event: BroadcastEvent) {
        self.registry.broadcast(event).await;
    }

    /// Broadcast a `video.status` event
    pub async fn broadcast_video_status(
        &self,
        video_id: impl Into<String>,
        status: impl Into<String>,
        progress: Option<u8>,
        message: Option<String>,
    ) {
        self.broadcast_event(BroadcastEvent::video_status(
            video_id, status, progress, message,
        ))
        .await;
    }

    /// Broadcast a `summary.ready` event
    pub async fn broadcast_summary_ready(&self, video_id: impl Into<String>) {
        self.broadcast_event(BroadcastEvent::summary_ready(video_id))
            .await;
    }

    /// Broadcast an `error` event
    pub async fn broadcast_error(&self, message: impl Into<String>) {
        self.broadcast_event(BroadcastEvent::error(message)).await;
    }

    /// Get current client count
    pub async fn client_count(&self) -> usize {
        self.registry.count().await
    }

    /// Health snapshot for monitoring endpoints
    pub async fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy",
            connected_clients: self.registry.count().await,
        }
    }

    /// Stop the heartbeat scheduler, then close every client connection.
    ///
    /// Heartbeats stop first so nothing pushes into a sink mid-teardown.
    pub async fn shutdown(&self) {
        self.heartbeat.stop().await;
        let closed = self.registry.clear().await;
        tracing::info!(closed_connections = closed, "Broadcaster shut down");
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BroadcasterConfig::default();
        assert_eq!(config.queue_capacity, 64);
        assert!(config.max_connections.is_none());
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_config_builder() {
        let config = BroadcasterConfig::default()
            .queue_capacity(4)
            .max_connections(100)
            .heartbeat_interval(Duration::from_secs(15));
        assert_eq!(config.queue_capacity, 4);
        assert_eq!(config.max_connections, Some(100));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_health_reports_client_count() {
        let broadcaster = EventBroadcaster::new();
        let health = broadcaster.health().await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.connected_clients, 0);

        let _stream = broadcaster.connect().await.unwrap();
        assert_eq!(broadcaster.health().await.connected_clients, 1);
    }

    #[tokio::test]
    async fn test_health_serializes_for_monitoring() {
        let broadcaster = EventBroadcaster::new();
        let json = serde_json::to_string(&broadcaster.health().await).unwrap();
        assert_eq!(json, r#"{"status":"healthy","connected_clients":0}"#);
    }

    #[tokio::test]
    async fn test_shutdown_wakes_blocked_stream() {
        let broadcaster = EventBroadcaster::new();
        let mut stream = broadcaster.connect().await.unwrap();

        let waiter = tokio::spawn(async move { stream.next_event().await });
        broadcaster.shutdown().await;

        assert!(waiter.await.unwrap().is_none());
        assert_eq!(broadcaster.client_count().await, 0);
    }
}
