//! Reconstructs media-playback sessions from the JSON event files written
//! by an mpv IPC daemon, and merges many per-instance files into one
//! canonical archival store.
//!
//! The daemon itself (the loop that watches `/tmp/mpvsockets` and appends
//! timestamped events) lives elsewhere; this crate does the batch side:
//!
//! - [`history::parse_file`] / [`history::all_sessions`] turn event files
//!   into typed [`Session`] records via a per-stream state machine,
//!   required-field validation, and per-file deduplication.
//! - [`history::history`] applies a [`RelevanceFilter`] on top, keeping
//!   only sessions that were plausibly watched or listened to.
//! - [`merge::merge_files`] unions raw and already-merged files into one
//!   `{"mapping": {...}}` store, skipping raw files the daemon may still
//!   be writing.

pub mod filter;
pub mod history;
pub mod merge;
pub mod models;
pub mod reconstruct;
pub mod serialize;
pub mod utils;

pub use filter::{ListenedFilter, MediaMatcher, RelevanceFilter};
pub use history::{all_sessions, history, parse_document, parse_file};
pub use merge::{merge_documents, merge_files, MergeResult, SourceDocument};
pub use models::session::{Action, ActionKind, Session};
pub use reconstruct::ReconstructConfig;
