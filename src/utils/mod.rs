pub mod logging;
pub mod metadata;

pub use metadata::{music_metadata, MusicMetadata};
