pub mod event;
pub mod session;

pub use event::{ActionPayload, Event};
pub use session::{Action, ActionKind, Session};
