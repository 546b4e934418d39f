//! Core domain types for Warden - no IO, no async.
//!
//! Everything the hook binaries pass between crates lives here: the raw
//! payload a host runtime writes to stdin, the normalized event the gate
//! reasons about, and the decision that comes back out.

mod decision;
mod event;

pub use decision::Decision;
pub use event::{HookPayload, ToolAction, ToolEvent, ToolInput};
