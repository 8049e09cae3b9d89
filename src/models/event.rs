use serde_json::{Map, Value};

/// Payload of a `seek` / `paused` / `resumed` event.
///
/// An action is only worth archiving when the payload object carried a
/// `percent-pos` key at all; livestreams report the key with a null value,
/// which becomes an action without a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionPayload {
    pub has_percent_pos: bool,
    pub percent_pos: Option<f64>,
}

impl ActionPayload {
    fn decode(payload: &Value) -> Self {
        match payload.as_object() {
            Some(obj) if obj.contains_key("percent-pos") => Self {
                has_percent_pos: true,
                percent_pos: obj.get("percent-pos").and_then(Value::as_f64),
            },
            _ => Self::default(),
        }
    }
}

/// One decoded player IPC event.
///
/// Raw documents store one event per timestamp key as a single-entry
/// `{name: payload}` object; this is the typed vocabulary the reconstructor
/// consumes. Names we don't recognize (and known names whose payload is
/// unusable) come through as [`Event::Unknown`] so the stream survives
/// additions to the daemon's vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Playlist position changed; marks the start of a session.
    PlaylistPos(i64),
    /// POSIX seconds when the daemon attached to this socket.
    SocketAdded(f64),
    /// The player's working directory, used to resolve relative paths.
    WorkingDirectory(String),
    /// Explicit pause state reported when the daemon connects.
    IsPaused(bool),
    Path(String),
    Metadata(Map<String, Value>),
    MediaTitle(String),
    Duration(f64),
    Seek(ActionPayload),
    Paused(ActionPayload),
    Resumed(ActionPayload),
    /// End of file; always precedes the next item's data.
    Eof,
    /// `mpv-quit` or `final-write`; nothing after it is consulted.
    Quit,
    /// `playlist` / `playlist-count`; carry nothing we archive.
    Ignored,
    /// Unrecognized name, or a recognized name with an unusable payload.
    Unknown(String),
}

impl Event {
    pub fn decode(name: &str, payload: &Value) -> Event {
        let unknown = || Event::Unknown(name.to_string());
        match name {
            "playlist-pos" => payload.as_i64().map(Event::PlaylistPos).unwrap_or_else(unknown),
            "socket-added" => number_like(payload).map(Event::SocketAdded).unwrap_or_else(unknown),
            "working-directory" => payload
                .as_str()
                .map(|s| Event::WorkingDirectory(s.to_string()))
                .unwrap_or_else(unknown),
            "is-paused" => payload.as_bool().map(Event::IsPaused).unwrap_or_else(unknown),
            "path" => payload
                .as_str()
                .map(|s| Event::Path(s.to_string()))
                .unwrap_or_else(unknown),
            "metadata" => payload
                .as_object()
                .map(|m| Event::Metadata(m.clone()))
                .unwrap_or_else(unknown),
            "media-title" => payload
                .as_str()
                .map(|s| Event::MediaTitle(s.to_string()))
                .unwrap_or_else(unknown),
            "duration" => number_like(payload).map(Event::Duration).unwrap_or_else(unknown),
            "seek" => Event::Seek(ActionPayload::decode(payload)),
            "paused" => Event::Paused(ActionPayload::decode(payload)),
            "resumed" => Event::Resumed(ActionPayload::decode(payload)),
            "eof" => Event::Eof,
            "mpv-quit" | "final-write" => Event::Quit,
            "playlist" | "playlist-count" => Event::Ignored,
            _ => unknown(),
        }
    }
}

/// The daemon writes most numbers as JSON numbers, but older files carry a
/// few as decimal strings.
fn number_like(payload: &Value) -> Option<f64> {
    match payload {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
