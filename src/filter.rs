use std::path::Path;

use log::{debug, warn};

use crate::models::session::Session;

/// Strategy seam deciding which sessions count as listening history.
///
/// [`ListenedFilter`] is the default; [`MediaMatcher`] carves history down
/// by location and file type instead.
pub trait RelevanceFilter {
    fn is_relevant(&self, session: &Session) -> bool;
}

/// Heuristic for whether a session was actually watched or listened to,
/// rather than skipped after a few seconds.
#[derive(Debug, Clone)]
pub struct ListenedFilter {
    /// Media shorter than ten minutes (probably a song) must have been
    /// played through at least this fraction of its duration.
    pub require_listened_to_percent: f64,
    /// Everything else just needs this much listen time, in seconds.
    pub min_listen_secs: f64,
}

impl Default for ListenedFilter {
    fn default() -> Self {
        Self {
            require_listened_to_percent: 0.75,
            min_listen_secs: 60.0,
        }
    }
}

impl RelevanceFilter for ListenedFilter {
    fn is_relevant(&self, session: &Session) -> bool {
        // Local device streams (camera, capture devices) are never history.
        if !session.is_stream && session.path.starts_with("/dev/") {
            return false;
        }
        let listen_time = session.listen_time();
        if let Some(duration) = session.media_duration {
            if duration != 0.0 && duration < 600.0 {
                return listen_time / duration > self.require_listened_to_percent;
            }
        }
        listen_time > self.min_listen_secs
    }
}

/// Prefix/extension-based media filter: keep history to the directories and
/// file types that are actually music or video, and optionally drop
/// streams.
#[derive(Debug, Clone)]
pub struct MediaMatcher {
    pub allow_prefixes: Vec<String>,
    /// Checked only when no allow prefix matched.
    pub ignore_prefixes: Vec<String>,
    /// When non-empty, only these extensions are allowed.
    pub allow_extensions: Vec<String>,
    pub ignore_extensions: Vec<String>,
    pub allow_stream: bool,
    /// With allow prefixes configured, warn about and reject paths that
    /// match neither list instead of letting them through.
    pub strict: bool,
}

impl Default for MediaMatcher {
    fn default() -> Self {
        Self {
            allow_prefixes: Vec::new(),
            ignore_prefixes: vec!["/tmp".to_string(), "/dev".to_string()],
            allow_extensions: Vec::new(),
            ignore_extensions: Vec::new(),
            allow_stream: false,
            strict: true,
        }
    }
}

impl MediaMatcher {
    pub fn is_allowed(&self, session: &Session) -> bool {
        if !self.allow_stream && session.is_stream {
            debug!("[matcher] {} is a stream, ignoring", session.path);
            return false;
        }

        if let Some(ext) = extension_of(&session.path) {
            if self.ignore_extensions.iter().any(|e| fix_extension(e) == ext) {
                debug!("[matcher] {} has ignored extension {ext}", session.path);
                return false;
            }
            if !self.allow_extensions.is_empty()
                && !self.allow_extensions.iter().any(|e| fix_extension(e) == ext)
            {
                warn!(
                    "[matcher] {} has extension {ext} not in the allowed set",
                    session.path
                );
                return false;
            }
        }

        if self.allow_prefixes.iter().any(|p| session.path.starts_with(p)) {
            return true;
        }
        if self.ignore_prefixes.iter().any(|p| session.path.starts_with(p)) {
            debug!("[matcher] {} is under an ignored prefix", session.path);
            return false;
        }
        if !self.allow_prefixes.is_empty() && self.strict {
            warn!(
                "[matcher] {} matches no allowed prefix; add it to allow_prefixes or \
                 ignore_prefixes, or disable strict mode",
                session.path
            );
            return false;
        }

        true
    }
}

impl RelevanceFilter for MediaMatcher {
    fn is_relevant(&self, session: &Session) -> bool {
        self.is_allowed(session)
    }
}

/// Lowercased, dot-prefixed extension of a path, with any URL query string
/// stripped (`.ext?query=1` is `.ext`).
fn extension_of(path: &str) -> Option<String> {
    let ext = Path::new(path).extension()?.to_str()?.to_lowercase();
    let ext = match ext.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => ext,
    };
    Some(format!(".{ext}"))
}

fn fix_extension(ext: &str) -> String {
    let ext = ext.to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}
