//! Session command and query handlers.

mod check_conflicts;
mod create_session;

pub(crate) use check_conflicts::find_conflicts;
pub use check_conflicts::CheckConflictsHandler;
pub use create_session::{CreateSessionCommand, CreateSessionHandler};
