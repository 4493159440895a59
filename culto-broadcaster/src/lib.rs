//! Event broadcast core for the CultoTranscript platform
//!
//! This crate fans out structured events (video status, summaries, errors,
//! heartbeats) from the transcription pipeline to many concurrently connected
//! stream clients. It manages connection lifecycle, per-client queues with
//! slow-consumer eviction, and a periodic heartbeat.
//!
//! # Features
//!
//! - Per-connection bounded queues drained by the transport's write loop
//! - Non-blocking broadcast; a slow or dead client is evicted, never waited on
//! - Per-client FIFO ordering of events
//! - Periodic heartbeat events for connection liveness
//! - Health snapshot (`status` + connected client count) for monitoring
//!
//! # Event Kinds
//!
//! - `video.status` - transcription pipeline progress for one video
//! - `summary.ready` - AI summary finished for a video
//! - `error` - pipeline error surfaced to clients
//! - `heartbeat` - periodic liveness signal
//!
//! # Example Usage
//!
//! ```no_run
//! use culto_broadcaster::{BroadcasterConfig, EventBroadcaster};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broadcaster = EventBroadcaster::with_config(
//!         BroadcasterConfig::default().max_connections(1024),
//!     );
//!     broadcaster.start().await;
//!
//!     // A client opens a stream; its transport loop drains the events
//!     let mut stream = broadcaster.connect().await?;
//!     let id = stream.id();
//!     tokio::spawn(async move {
//!         while let Some(event) = stream.next_event().await {
//!             // frame and write to the client here
//!             let _line = event.to_json_line();
//!         }
//!     });
//!
//!     // The pipeline reports progress
//!     broadcaster
//!         .broadcast_video_status("v1", "PROCESSING", Some(50), None)
//!         .await;
//!     broadcaster.broadcast_summary_ready("v1").await;
//!
//!     // Transport teardown
//!     broadcaster.disconnect(id).await;
//!
//!     broadcaster.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod broadcaster;
pub mod error;
pub mod events;
pub mod heartbeat;
pub mod registry;
pub mod sink;

// Re-exports
pub use broadcaster::{BroadcasterConfig, EventBroadcaster, HealthStatus};
pub use error::{BroadcasterError, Result};
pub use events::BroadcastEvent;
pub use heartbeat::HeartbeatScheduler;
pub use registry::ConnectionRegistry;
pub use sink::{ConnectionId, EventStream};
