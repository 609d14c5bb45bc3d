//! Utility modules for cpumetrics.

mod shutdown;

pub use shutdown::Shutdown;
