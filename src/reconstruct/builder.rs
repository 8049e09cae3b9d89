use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::models::session::{Action, ActionKind, Session};

/// A pause/seek/resume observed at an absolute POSIX timestamp. Converted
/// to a start-relative [`Action`] during extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawAction {
    pub timestamp: f64,
    pub kind: ActionKind,
    pub percentage: Option<f64>,
}

/// Accumulator for the in-progress session while events stream past.
///
/// Every field is optional until the stream proves it; [`RawSession::extract`]
/// is the checked conversion that enforces the required set.
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    pub playlist_pos: Option<i64>,
    /// POSIX seconds. May stay unset when the source identifier carries no
    /// launch time and no `socket-added` event arrived.
    pub start_time: Option<f64>,
    pub path: Option<String>,
    pub is_stream: bool,
    pub media_duration: Option<f64>,
    pub media_title: Option<String>,
    pub metadata: Map<String, Value>,
}

impl SessionBuilder {
    /// A record is worth emitting once all three of these are known.
    pub fn has_required_fields(&self) -> bool {
        self.playlist_pos.is_some() && self.start_time.is_some() && self.path.is_some()
    }

    pub fn finish(self, end_time: f64, pause_duration: f64, actions: Vec<RawAction>) -> RawSession {
        RawSession {
            fields: self,
            end_time,
            pause_duration,
            actions,
        }
    }
}

/// A finalized but not yet validated session record.
#[derive(Debug, Clone)]
pub struct RawSession {
    pub fields: SessionBuilder,
    pub end_time: f64,
    pub pause_duration: f64,
    pub actions: Vec<RawAction>,
}

impl RawSession {
    /// Validate required fields and convert into the typed record, turning
    /// absolute action timestamps into offsets from the session start.
    ///
    /// An end time before the start time is an anomaly worth logging, but
    /// the record is kept.
    pub fn extract(self) -> Option<Session> {
        let SessionBuilder {
            playlist_pos,
            start_time,
            path,
            is_stream,
            media_duration,
            media_title,
            metadata,
        } = self.fields;
        let (Some(_pos), Some(start), Some(path)) = (playlist_pos, start_time, path) else {
            debug!("[extract] record is missing required fields, dropping");
            return None;
        };

        let start_time = datetime_from_secs(start);
        let end_time = datetime_from_secs(self.end_time);
        if end_time < start_time {
            warn!(
                "[extract] end time {} precedes start time {} for {}",
                end_time, start_time, path
            );
        }

        let actions = self
            .actions
            .iter()
            .map(|a| Action {
                since_started: a.timestamp - start,
                kind: a.kind,
                percentage: a.percentage,
            })
            .collect();

        Some(Session {
            path,
            is_stream,
            start_time,
            end_time,
            pause_duration: self.pause_duration,
            media_duration,
            media_title,
            actions,
            metadata,
        })
    }
}

/// Fractional POSIX seconds to a UTC instant, millisecond precision.
pub fn datetime_from_secs(secs: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
