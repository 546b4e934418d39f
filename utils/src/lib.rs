//! Shared utilities for Warden: atomic IO, marker-file search.

mod atomic_write;
mod find_up;

pub use atomic_write::atomic_write;
pub use find_up::find_up;
