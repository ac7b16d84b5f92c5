//! Test execution engine
//!
//! Session ownership, the sequential orchestrator and its progress events.

mod events;
mod orchestrator;
mod session;

pub use events::{EventEmitter, ExecutionEvent};
pub use orchestrator::{ExecutionTiming, Orchestrator, RunOutcome};
pub use session::{Session, SessionSnapshot};
