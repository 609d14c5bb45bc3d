//! cpumetrics - Host CPU utilization and topology gauges.
//!
//! This library samples per-core CPU time breakdowns and CPU topology from
//! the operating system and exposes them as pollable Prometheus gauges:
//! - `provider` - OS-stats provider abstraction (real `/proc` backed, or mock)
//! - `sampler` - the CPU sampler with the NaN-retry workaround
//! - `metrics` - Prometheus collector and gauge registration
//! - `util` - shutdown token for interrupting the retry delay

pub mod metrics;
pub mod provider;
pub mod sampler;
pub mod util;

pub use metrics::{CpuGaugeCollector, register};
pub use provider::{ProviderError, StatsProvider};
pub use sampler::{CpuSampler, CpuTime, CpuTopology};
pub use util::Shutdown;
