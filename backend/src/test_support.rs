//! Test utilities for the directory crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and for dependants that enable the `test-support`
//! feature.

pub mod memory_store;
pub mod retry;

pub use memory_store::{InMemoryStore, Table};
pub use retry::{FixedClock, ImmediateSleeper, NoJitter, RecordingSleeper};
