use serde_json::{Map, Value};

/// Title/album/artist triple pulled from a session's metadata mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicMetadata {
    pub title: String,
    pub album: String,
    pub artist: String,
}

/// Extract music metadata when all three tags are present and non-empty.
pub fn music_metadata(data: &Map<String, Value>, strip_whitespace: bool) -> Option<MusicMetadata> {
    let field = |key: &str| data.get(key).and_then(Value::as_str);
    let (title, album, artist) = (field("title")?, field("album")?, field("artist")?);
    if title.is_empty() || album.is_empty() || artist.is_empty() {
        return None;
    }
    let clean = |value: &str| {
        if strip_whitespace {
            value.trim().to_string()
        } else {
            value.to_string()
        }
    };
    Some(MusicMetadata {
        title: clean(title),
        album: clean(album),
        artist: clean(artist),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blob(title: &str, album: &str, artist: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title".to_string(), json!(title));
        map.insert("album".to_string(), json!(album));
        map.insert("artist".to_string(), json!(artist));
        map
    }

    #[test]
    fn requires_all_three_tags() {
        let mut incomplete = blob("Song", "LP", "Band");
        incomplete.remove("album");
        assert_eq!(music_metadata(&incomplete, false), None);
        assert_eq!(music_metadata(&blob("", "LP", "Band"), false), None);

        let meta = music_metadata(&blob("Song", "LP", "Band"), false).unwrap();
        assert_eq!(meta.artist, "Band");
    }

    #[test]
    fn optionally_strips_whitespace() {
        let tagged = blob(" Song ", "LP", "Band\n");
        assert_eq!(music_metadata(&tagged, false).unwrap().title, " Song ");
        let stripped = music_metadata(&tagged, true).unwrap();
        assert_eq!(stripped.title, "Song");
        assert_eq!(stripped.artist, "Band");
    }
}
