use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event types broadcast to connected stream clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum BroadcastEvent {
    /// Transcription pipeline progress for one video
    #[serde(rename = "video.status")]
    VideoStatus {
        video_id: String,
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        progress: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// AI summary finished for a video
    #[serde(rename = "summary.ready")]
    SummaryReady {
        video_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Pipeline error surfaced to clients
    #[serde(rename = "error")]
    Error {
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// Periodic liveness signal
    #[serde(rename = "heartbeat")]
    Heartbeat { timestamp: DateTime<Utc> },
}

impl BroadcastEvent {
    /// Create a `video.status` event stamped with the current time
    pub fn video_status(
        video_id: impl Into<String>,
        status: impl Into<String>,
        progress: Option<u8>,
        message: Option<String>,
    ) -> Self {
        Self::VideoStatus {
            video_id: video_id.into(),
            status: status.into(),
            progress,
            message,
            timestamp: Utc::now(),
        }
    }

    /// Create a `summary.ready` event stamped with the current time
    pub fn summary_ready(video_id: impl Into<String>) -> Self {
        Self::SummaryReady {
            video_id: video_id.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an `error` event stamped with the current time
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error_message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a `heartbeat` event stamped with the current time
    pub fn heartbeat() -> Self {
        Self::Heartbeat {
            timestamp: Utc::now(),
        }
    }

    /// Wire tag used for client-side dispatch
    pub fn kind(&self) -> &'static str {
        match self {
            Self::VideoStatus { .. } => "video.status",
            Self::SummaryReady { .. } => "summary.ready",
            Self::Error { .. } => "error",
            Self::Heartbeat { .. } => "heartbeat",
        }
    }

    /// Creation time of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::VideoStatus { timestamp, .. }
            | Self::SummaryReady { timestamp, .. }
            | Self::Error { timestamp, .. }
            | Self::Heartbeat { timestamp } => *timestamp,
        }
    }

    /// Convert event to JSON string with newline
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}
