use std::path::PathBuf;

/// Tunable thresholds and ambient context for event-stream reconstruction.
#[derive(Debug, Clone)]
pub struct ReconstructConfig {
    /// A stream that ends without an eof/quit event is salvaged as a
    /// best-effort session only if it has been open at least this long.
    pub allow_if_playing_for_secs: f64,

    /// Legacy streams (written before the `is-paused` event existed): a
    /// resume this close to the session start, while already playing with
    /// no prior actions, is assumed to be the spurious resume fired when a
    /// socket first connects.
    pub resume_grace_secs: f64,

    /// Base directory for resolving relative media paths until the stream
    /// reports its own `working-directory`.
    pub working_dir: PathBuf,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            allow_if_playing_for_secs: 60.0,
            resume_grace_secs: 20.0,
            working_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")),
        }
    }
}
