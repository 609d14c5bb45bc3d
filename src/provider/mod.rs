//! OS-stats provider abstraction.
//!
//! This module defines the `StatsProvider` trait that the sampler consumes.
//! Two implementations exist:
//! - `ProcfsProvider`: real per-core readings computed from `/proc`
//! - `MockProvider`: scripted responses for tests
//!
//! The real provider's NaN glitch (all-NaN readings under rapid repeated
//! polling) cannot be reproduced on demand, so the trait seam exists first
//! and foremost to let tests substitute a deterministic double.

pub mod mock;
mod parser;
mod procfs;
mod traits;

pub use mock::{MockFs, MockProvider};
pub use parser::ParseError;
pub use procfs::ProcfsProvider;
pub use traits::{ProcFs, RealFs};

use serde::{Deserialize, Serialize};

/// Error types that can occur while querying the provider.
#[derive(Debug)]
pub enum ProviderError {
    /// I/O error while reading the underlying stats source.
    Io(std::io::Error),
    /// The stats source returned data that could not be parsed.
    Parse(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Io(e) => write!(f, "I/O error: {}", e),
            ProviderError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<std::io::Error> for ProviderError {
    fn from(e: std::io::Error) -> Self {
        ProviderError::Io(e)
    }
}

/// One CPU topology record as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuInfoRecord {
    /// Number of logical cores on the host.
    pub total_cores: i32,
    /// Number of physical CPU sockets on the host.
    pub total_sockets: i32,
}

/// One core's fractional time breakdown as reported by the provider.
///
/// Each field is a fraction of elapsed time, nominally in `[0.0, 1.0]`
/// (the provider does not enforce the range). The provider's failure mode
/// is all-or-nothing: either all six fields are finite or all six are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuPercRecord {
    pub user: f64,
    pub sys: f64,
    pub nice: f64,
    pub wait: f64,
    pub idle: f64,
    pub irq: f64,
}

impl CpuPercRecord {
    /// A record with every field set to NaN, the provider's degraded-mode
    /// reading.
    pub fn all_nan() -> Self {
        Self {
            user: f64::NAN,
            sys: f64::NAN,
            nice: f64::NAN,
            wait: f64::NAN,
            idle: f64::NAN,
            irq: f64::NAN,
        }
    }
}

/// Abstraction over the OS-stats source.
///
/// Methods take `&mut self` because real providers keep per-call session
/// state (the procfs provider remembers its previous tick sample to compute
/// deltas). The sampler serializes access behind a mutex, so implementations
/// do not need internal locking.
pub trait StatsProvider {
    /// Queries CPU topology.
    ///
    /// Returns one record per physical package in provider order; callers
    /// conventionally use the first. An empty vector means the topology could
    /// not be determined.
    fn cpu_info(&mut self) -> Result<Vec<CpuInfoRecord>, ProviderError>;

    /// Queries the current per-core fractional time breakdown.
    ///
    /// Returns one record per logical core, in a stable provider-defined
    /// order. An empty vector means no data is currently available.
    fn cpu_perc_list(&mut self) -> Result<Vec<CpuPercRecord>, ProviderError>;
}
