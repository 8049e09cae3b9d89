pub mod algorithm;
pub mod builder;
pub mod config;
pub mod dedup;

pub use algorithm::reconstruct_stream;
pub use builder::{RawAction, RawSession, SessionBuilder};
pub use config::ReconstructConfig;
pub use dedup::dedup_sessions;
