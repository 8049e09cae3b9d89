use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Seek,
    Paused,
    Resumed,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Seek => "seek",
            ActionKind::Paused => "paused",
            ActionKind::Resumed => "resumed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Seconds after the session started, not wall-clock time, so two
    /// structurally identical sessions compare equal regardless of when
    /// they were played.
    pub since_started: f64,
    pub kind: ActionKind,
    /// Playback percentage at the time of the action. None for
    /// livestreams, which have no percent position.
    pub percentage: Option<f64>,
}

/// One continuous play of a single media path, reconstructed from raw
/// events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Local filesystem path or URL.
    pub path: String,
    pub is_stream: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Total seconds spent paused. Accumulated during reconstruction and
    /// never renormalized afterwards.
    pub pause_duration: f64,
    pub media_duration: Option<f64>,
    pub media_title: Option<String>,
    pub actions: Vec<Action>,
    /// Tag metadata reported by the player, verbatim.
    pub metadata: Map<String, Value>,
}

impl Session {
    /// How much data this record carries. Used to pick between duplicate
    /// records for the same path.
    pub fn score(&self) -> f64 {
        let mut score = 0usize;
        if self.media_title.is_some() {
            score += 1;
        }
        if self.media_duration.is_some() {
            score += 1;
        }
        if self.pause_duration > 1.0 {
            score += 1;
        }
        score += self.metadata.len() / 4;
        score += self.actions.len() / 8;
        score as f64
    }

    /// Seconds actually spent playing: wall time minus accumulated pauses.
    pub fn listen_time(&self) -> f64 {
        let wall = (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0;
        wall - self.pause_duration
    }
}
