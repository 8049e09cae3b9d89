//! File-level tests: event files on disk through parsing, the history and
//! all-sessions views, and merging.

use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;

use mpv_history::serialize::parse_json_file;
use mpv_history::{all_sessions, history, merge_files, parse_file, ListenedFilter, ReconstructConfig};

const T0: f64 = 1_600_000_000.0;

fn config() -> ReconstructConfig {
    ReconstructConfig {
        working_dir: PathBuf::from("/home/user"),
        ..Default::default()
    }
}

/// Write a document under a socket-style name embedding T0 as nanoseconds.
fn write_doc(dir: &TempDir, name: &str, doc: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(doc).unwrap()).unwrap();
    path
}

fn two_session_doc() -> Value {
    json!({
        format!("{}", T0 + 1.0): {"playlist-pos": 0},
        format!("{}", T0 + 1.1): {"path": "/media/a.mp3"},
        format!("{}", T0 + 1.2): {"duration": 180.0},
        format!("{}", T0 + 1.3): {"seek": {"percent-pos": 0.0}},
        format!("{}", T0 + 170.0): {"eof": null},
        format!("{}", T0 + 170.5): {"playlist-pos": 1},
        format!("{}", T0 + 170.6): {"path": "/media/b.mp3"},
        format!("{}", T0 + 170.7): {"duration": 240.0},
        format!("{}", T0 + 400.0): {"eof": null},
        format!("{}", T0 + 400.1): {"mpv-quit": null},
    })
}

#[test]
fn end_to_end_two_sessions_from_one_file() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "1600000000000000000.json", &two_session_doc());

    let sessions = parse_file(&path, &config()).unwrap();
    assert_eq!(sessions.len(), 2);

    assert_eq!(sessions[0].path, "/media/a.mp3");
    assert_eq!(sessions[0].media_duration, Some(180.0));
    assert_eq!(sessions[0].actions.len(), 1);
    assert_eq!(
        sessions[0].start_time,
        chrono::DateTime::from_timestamp(1_600_000_000, 0).unwrap()
    );

    assert_eq!(sessions[1].path, "/media/b.mp3");
    assert_eq!(sessions[1].media_duration, Some(240.0));
    assert!(sessions[1].actions.is_empty());
}

#[test]
fn history_view_drops_a_glance_at_a_long_video() {
    let dir = TempDir::new().unwrap();
    // 5 seconds into a 3000-second video, then quit.
    let doc = json!({
        format!("{}", T0 + 0.5): {"playlist-pos": 0},
        format!("{}", T0 + 0.6): {"path": "/media/movie.mkv"},
        format!("{}", T0 + 0.7): {"duration": 3000.0},
        format!("{}", T0 + 5.0): {"mpv-quit": null},
    });
    let path = write_doc(&dir, "1600000000000000000.json", &doc);

    let everything = all_sessions(&[&path], &config()).unwrap();
    assert_eq!(everything.len(), 1);

    let listened = history(&[&path], &config(), &ListenedFilter::default()).unwrap();
    assert!(listened.is_empty());
}

#[test]
fn merged_stores_parse_like_their_source_files() {
    let dir = TempDir::new().unwrap();
    let merged = json!({"mapping": {"1600000000000000000.json": two_session_doc()}});
    let path = write_doc(&dir, "merged.json", &merged);

    let sessions = parse_file(&path, &config()).unwrap();
    assert_eq!(sessions.len(), 2);
    // The inner stream keeps its own launch time, not the merged file's name.
    assert_eq!(
        sessions[0].start_time,
        chrono::DateTime::from_timestamp(1_600_000_000, 0).unwrap()
    );
}

#[test]
fn merge_files_then_parse_is_equivalent() {
    let dir = TempDir::new().unwrap();
    let raw = write_doc(&dir, "1600000000000000000.json", &two_session_doc());

    // Threshold zero: even a just-written file counts as stale.
    let result = merge_files(&[&raw], 0.0).unwrap();
    assert_eq!(result.consumed, vec![raw.clone()]);

    let store_path = write_doc(&dir, "merged.json", &result.merged);
    let merged_sessions = parse_file(&store_path, &config()).unwrap();
    let raw_sessions = parse_file(&raw, &config()).unwrap();
    assert_eq!(merged_sessions.len(), raw_sessions.len());
    assert_eq!(merged_sessions[0].path, raw_sessions[0].path);
    assert_eq!(merged_sessions[0].start_time, raw_sessions[0].start_time);
}

#[test]
fn remerging_a_merged_store_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let raw = write_doc(&dir, "1600000000000000000.json", &two_session_doc());
    let first = merge_files(&[&raw], 0.0).unwrap();

    let store_path = write_doc(&dir, "merged.json", &first.merged);
    let second = merge_files(&[&store_path, &store_path], 3600.0).unwrap();
    assert_eq!(second.merged, first.merged);
    assert_eq!(second.consumed, vec![store_path.clone(), store_path]);
}

#[test]
fn fresh_raw_files_are_not_merged() {
    let dir = TempDir::new().unwrap();
    let raw = write_doc(&dir, "1600000000000000000.json", &two_session_doc());

    // Just written, so a one-hour threshold excludes it everywhere.
    let result = merge_files(&[&raw], 3600.0).unwrap();
    assert!(result.consumed.is_empty());
    assert_eq!(result.merged, json!({"mapping": {}}));
}

#[test]
fn corrupt_files_fail_the_whole_call() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{definitely not json").unwrap();

    assert!(parse_json_file(&path).is_err());
    assert!(parse_file(&path, &config()).is_err());
    assert!(merge_files(&[&path], 0.0).is_err());
}
