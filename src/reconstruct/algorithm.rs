use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::event::{ActionPayload, Event};
use crate::models::session::ActionKind;
use crate::reconstruct::builder::{RawAction, RawSession, SessionBuilder};
use crate::reconstruct::config::ReconstructConfig;
use crate::{log_debug, log_warn};

const ENABLE_LOGS: bool = true;

/// Reconstruct raw (unvalidated) sessions from one stream's event document.
///
/// `source` is the identifier of the stream: for per-instance files the
/// base filename embeds the player's launch time as nanoseconds since
/// epoch, which becomes the first session's start time. Events are
/// processed in ascending timestamp order regardless of key order in the
/// document.
///
/// A timestamp key that doesn't parse as a number means the document is
/// corrupt, and that is a hard error.
pub fn reconstruct_stream(
    events: &Map<String, Value>,
    source: &str,
    config: &ReconstructConfig,
) -> Result<Vec<RawSession>> {
    let mut ordered: Vec<(f64, &Value)> = Vec::with_capacity(events.len());
    for (key, entry) in events {
        let timestamp: f64 = key
            .parse()
            .with_context(|| format!("invalid timestamp key {key:?} in {source}"))?;
        ordered.push((timestamp, entry));
    }
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

    log_debug!("[reconstruct] reading {} events from {}", ordered.len(), source);

    let mut state = StreamState::new(source, config);
    let mut sessions = Vec::new();
    let mut most_recent = 0.0_f64;
    for (timestamp, entry) in ordered {
        most_recent = timestamp;
        let Some((name, payload)) = entry.as_object().and_then(|obj| obj.iter().next()) else {
            log_warn!(
                "[reconstruct] entry at {timestamp} in {source} is not a single-entry object, skipping"
            );
            continue;
        };
        match state.apply(timestamp, Event::decode(name, payload)) {
            Step::Continue => {}
            Step::Emit(raw) => sessions.push(raw),
            Step::Finish(raw) => {
                sessions.extend(raw);
                return Ok(sessions);
            }
        }
    }

    sessions.extend(state.salvage(most_recent));
    Ok(sessions)
}

/// What a single transition produced.
enum Step {
    Continue,
    Emit(RawSession),
    /// Terminal event: optionally emit, then stop consuming the stream.
    Finish(Option<RawSession>),
}

/// Reconstruction state for one event stream.
struct StreamState<'a> {
    config: &'a ReconstructConfig,
    /// When the player instance launched, recovered from the source
    /// identifier (or `socket-added` as a fallback).
    launch_time: Option<f64>,
    builder: SessionBuilder,
    working_dir: PathBuf,
    /// The first `playlist-pos` takes its start time from the launch time
    /// rather than its own timestamp, since the daemon's socket scan can
    /// lag the real start by several seconds.
    first_position: bool,
    playing: bool,
    pause_start: Option<f64>,
    pause_duration: f64,
    actions: Vec<RawAction>,
    /// Streams carrying `is-paused` don't need the legacy resume-grace
    /// heuristic.
    seen_pause_event: bool,
}

impl<'a> StreamState<'a> {
    fn new(source: &str, config: &'a ReconstructConfig) -> Self {
        let launch_time = launch_time_from_source(source);
        if launch_time.is_none() {
            log_warn!("[reconstruct] no launch time in source identifier {source:?}");
        }
        Self {
            config,
            launch_time,
            builder: SessionBuilder::default(),
            working_dir: config.working_dir.clone(),
            first_position: true,
            playing: true,
            pause_start: None,
            pause_duration: 0.0,
            actions: Vec::new(),
            seen_pause_event: false,
        }
    }

    fn apply(&mut self, timestamp: f64, event: Event) -> Step {
        match event {
            Event::PlaylistPos(pos) => self.on_playlist_pos(timestamp, pos),
            Event::SocketAdded(secs) => {
                if self.launch_time.is_none() {
                    self.launch_time = Some(secs.trunc());
                }
            }
            Event::WorkingDirectory(dir) => self.working_dir = PathBuf::from(dir),
            Event::IsPaused(paused) => {
                self.seen_pause_event = true;
                // Paused when the daemon connected: assume it has been
                // paused since close to the launch.
                if paused {
                    self.playing = false;
                    self.pause_start = self.launch_time;
                }
            }
            Event::Path(path) => self.on_path(&path),
            Event::Metadata(metadata) => self.builder.metadata = metadata,
            Event::MediaTitle(title) => self.builder.media_title = Some(title),
            Event::Duration(duration) => self.builder.media_duration = Some(duration),
            Event::Seek(payload) => self.on_playback_action(timestamp, ActionKind::Seek, payload),
            Event::Paused(payload) => {
                self.on_playback_action(timestamp, ActionKind::Paused, payload)
            }
            Event::Resumed(payload) => {
                self.on_playback_action(timestamp, ActionKind::Resumed, payload)
            }
            Event::Eof => return Step::Emit(self.finalize(timestamp)),
            Event::Quit => {
                // Without an eof, a quit closes whatever is in flight.
                let emitted = self
                    .builder
                    .has_required_fields()
                    .then(|| self.finalize(timestamp));
                return Step::Finish(emitted);
            }
            Event::Ignored => {}
            Event::Unknown(name) => {
                log_warn!("[reconstruct] unexpected event name {name:?}, skipping");
            }
        }
        Step::Continue
    }

    fn on_playlist_pos(&mut self, timestamp: f64, pos: i64) {
        if self.builder.playlist_pos == Some(pos) {
            log_debug!("[reconstruct] got playlist position {pos} twice, keeping current record");
            return;
        }
        self.builder.playlist_pos = Some(pos);
        if self.first_position {
            self.builder.start_time = self.launch_time;
            self.first_position = false;
        } else {
            self.builder.start_time = Some(timestamp);
        }
    }

    fn on_path(&mut self, raw: &str) {
        if let Some(rest) = raw.strip_prefix("ytdl://") {
            self.builder.path = Some(rest.to_string());
            self.builder.is_stream = true;
        } else if is_urlish(raw) {
            self.builder.path = Some(raw.to_string());
            self.builder.is_stream = true;
        } else {
            self.builder.is_stream = false;
            let path = Path::new(raw);
            let resolved = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.working_dir.join(path)
            };
            self.builder.path = Some(resolved.to_string_lossy().into_owned());
        }
    }

    fn on_playback_action(&mut self, timestamp: f64, kind: ActionKind, payload: ActionPayload) {
        if payload.has_percent_pos {
            match kind {
                ActionKind::Seek | ActionKind::Paused => {
                    self.record_action(timestamp, kind, payload.percent_pos)
                }
                ActionKind::Resumed => {
                    if self.suppress_resume(timestamp) {
                        log_debug!(
                            "[reconstruct] ignoring the resume fired when a socket first connects"
                        );
                    } else {
                        self.record_action(timestamp, kind, payload.percent_pos);
                    }
                }
            }
        }

        match kind {
            ActionKind::Paused => {
                if self.playing {
                    self.playing = false;
                    self.pause_start = Some(timestamp);
                }
            }
            ActionKind::Resumed => {
                if !self.playing {
                    self.playing = true;
                    // An unknown pause start means the player was paused
                    // before the daemon ever connected; nothing to add.
                    if let Some(started) = self.pause_start.take() {
                        self.pause_duration += timestamp - started;
                    }
                }
            }
            ActionKind::Seek => {}
        }
    }

    /// Whether a resume event is the spurious one mpv fires when a socket
    /// first connects to an already-playing instance.
    fn suppress_resume(&self, timestamp: f64) -> bool {
        if self.seen_pause_event {
            // The stream reports explicit pause state, so the only resume
            // to ignore is the connect-time one: already playing, nothing
            // recorded yet.
            self.playing && self.actions.is_empty()
        } else {
            // Legacy stream: guess. Within the grace window of the launch
            // (double the old daemon's scan time), already playing, and no
            // actions yet. Kept as-is for compatibility with historical
            // data even though it is an imperfect heuristic.
            match self.launch_time {
                Some(start) => {
                    timestamp - start <= self.config.resume_grace_secs
                        && self.playing
                        && self.actions.is_empty()
                }
                None => false,
            }
        }
    }

    fn record_action(&mut self, timestamp: f64, kind: ActionKind, percentage: Option<f64>) {
        let action = RawAction {
            timestamp,
            kind,
            percentage,
        };
        match self.actions.iter_mut().find(|a| a.timestamp == timestamp) {
            Some(existing) => *existing = action,
            None => self.actions.push(action),
        }
    }

    /// Close the in-progress session at `end_time`: flush an open pause
    /// interval, hand the accumulator over, and reset for the next item.
    ///
    /// The playing flag and pause start survive the reset: a player paused
    /// across an eof boundary is still paused for the next item.
    fn finalize(&mut self, end_time: f64) -> RawSession {
        if !self.playing {
            if let Some(started) = self.pause_start {
                self.pause_duration += end_time - started;
            }
        }
        let builder = std::mem::take(&mut self.builder);
        let actions = std::mem::take(&mut self.actions);
        let pause_duration = self.pause_duration;
        self.pause_duration = 0.0;
        builder.finish(end_time, pause_duration, actions)
    }

    /// The stream ended without an eof/quit. Emit what is in flight as a
    /// best-effort session if it is complete and has been open long enough
    /// to be a real play rather than a truncated write.
    fn salvage(mut self, most_recent: f64) -> Option<RawSession> {
        if !self.builder.has_required_fields() {
            log_debug!("[reconstruct] leftover data lacks required fields, ignoring");
            return None;
        }
        let start = self.builder.start_time?;
        if most_recent - start.trunc() > self.config.allow_if_playing_for_secs {
            log_debug!("[reconstruct] stream ended without a terminal event, emitting anyways");
            Some(self.finalize(most_recent))
        } else {
            None
        }
    }
}

/// Per-instance sockets are named `$(date +%s%N)`, so the filename stem is
/// the player's launch time in nanoseconds since epoch.
fn launch_time_from_source(source: &str) -> Option<f64> {
    let stem = Path::new(source).file_stem()?.to_str()?;
    let nanos: i64 = stem.parse().ok()?;
    Some(nanos as f64 / 1e9)
}

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:http|ftp)s?://",
        r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)",
        r"|localhost",
        r"|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
        r"(?::\d+)?",
        r"(?:/?|[/?]\S+)$",
    ))
    .expect("url pattern is valid")
});

fn is_urlish(path: &str) -> bool {
    URL_RE.is_match(path)
}
