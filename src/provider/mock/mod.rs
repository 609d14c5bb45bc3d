//! Mock implementations for testing without a real `/proc`.
//!
//! `MockFs` backs the procfs provider with in-memory file contents;
//! `MockProvider` scripts whole provider responses for sampler tests.

mod filesystem;
mod provider;

pub use filesystem::MockFs;
pub use provider::{CallCounts, MockProvider, perc_with_user};
