use std::collections::HashMap;

use log::debug;

use crate::models::session::Session;

/// Collapse duplicate paths within one source stream's extracted sessions,
/// keeping the record that carries the most data.
///
/// The same path can show up twice in a stream (youtube-dl occasionally
/// reports an item again), so the path is treated as the primary key. Ties
/// keep the earlier record, and the output preserves first-seen-path
/// insertion order.
pub fn dedup_sessions(sessions: Vec<Session>) -> Vec<Session> {
    let mut index_by_path: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Session> = Vec::new();

    for session in sessions {
        match index_by_path.get(&session.path) {
            Some(&idx) => {
                if session.score() > kept[idx].score() {
                    debug!(
                        "[dedup] replacing record for {} (score {} -> {})",
                        session.path,
                        kept[idx].score(),
                        session.score()
                    );
                    kept[idx] = session;
                }
            }
            None => {
                index_by_path.insert(session.path.clone(), kept.len());
                kept.push(session);
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::{Action, ActionKind};
    use chrono::DateTime;
    use serde_json::{json, Map};

    fn session(path: &str, title: Option<&str>, action_count: usize) -> Session {
        Session {
            path: path.to_string(),
            is_stream: false,
            start_time: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
            end_time: DateTime::from_timestamp(1_600_000_100, 0).unwrap(),
            pause_duration: 0.0,
            media_duration: None,
            media_title: title.map(str::to_string),
            actions: (0..action_count)
                .map(|i| Action {
                    since_started: i as f64,
                    kind: ActionKind::Seek,
                    percentage: Some(1.0),
                })
                .collect(),
            metadata: Map::new(),
        }
    }

    #[test]
    fn higher_score_wins() {
        // score 3 vs score 5.
        let mut poor = session("/media/a.mp3", Some("a"), 8);
        poor.media_duration = Some(100.0);
        let mut rich = session("/media/a.mp3", Some("a"), 8);
        rich.media_duration = Some(100.0);
        rich.pause_duration = 2.0;
        for key in ["t", "a", "b", "g"] {
            rich.metadata.insert(key.to_string(), json!("x"));
        }
        assert_eq!(poor.score(), 3.0);
        assert_eq!(rich.score(), 5.0);

        let kept = dedup_sessions(vec![poor, rich]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score(), 5.0);
    }

    #[test]
    fn ties_keep_the_earlier_record() {
        let first = session("/media/a.mp3", Some("first seen"), 0);
        let second = session("/media/a.mp3", Some("second seen"), 0);
        let kept = dedup_sessions(vec![first, second]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].media_title.as_deref(), Some("first seen"));
    }

    #[test]
    fn output_preserves_first_seen_order() {
        let kept = dedup_sessions(vec![
            session("/media/c.mp3", None, 0),
            session("/media/a.mp3", None, 0),
            session("/media/c.mp3", Some("richer"), 0),
            session("/media/b.mp3", None, 0),
        ]);
        let paths: Vec<&str> = kept.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/media/c.mp3", "/media/a.mp3", "/media/b.mp3"]);
        assert_eq!(kept[0].media_title.as_deref(), Some("richer"));
    }
}
