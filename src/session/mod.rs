pub mod backend;
pub mod controller;
pub mod error;
pub mod state;

pub use backend::AtmBackend;
pub use controller::{JournalEntry, Notice, NoticeLevel, SessionController};
pub use error::SessionError;
pub use state::{SessionEvent, SessionState, transition};
