//! Scripted stats provider for sampler tests.
//!
//! The real provider's all-NaN glitch only appears under rapid polling on a
//! live host, so sampler behavior is verified against a deterministic double
//! that replays a queued sequence of valid, invalid, and empty responses.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::provider::{CpuInfoRecord, CpuPercRecord, ProviderError, StatsProvider};

/// Call counters for a `MockProvider`.
///
/// Clones share the same counters, so a test can keep a handle after the
/// provider itself has been moved into a sampler.
#[derive(Debug, Clone, Default)]
pub struct CallCounts {
    info: Arc<AtomicUsize>,
    perc: Arc<AtomicUsize>,
}

impl CallCounts {
    /// Number of `cpu_info` calls received so far.
    pub fn info(&self) -> usize {
        self.info.load(Ordering::SeqCst)
    }

    /// Number of `cpu_perc_list` calls received so far.
    pub fn perc(&self) -> usize {
        self.perc.load(Ordering::SeqCst)
    }
}

/// Stats provider that replays scripted responses.
///
/// Responses are consumed in FIFO order, one per call. When a queue runs
/// dry, further calls return `Ok(vec![])` (provider-unavailable).
#[derive(Debug, Default)]
pub struct MockProvider {
    info_responses: VecDeque<Result<Vec<CpuInfoRecord>, ProviderError>>,
    perc_responses: VecDeque<Result<Vec<CpuPercRecord>, ProviderError>>,
    counts: CallCounts,
}

impl MockProvider {
    /// Creates a provider with empty response queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to this provider's call counters.
    pub fn counts(&self) -> CallCounts {
        self.counts.clone()
    }

    /// Queues one topology response.
    pub fn push_info(&mut self, response: Result<Vec<CpuInfoRecord>, ProviderError>) {
        self.info_responses.push_back(response);
    }

    /// Queues a successful topology response with a single record.
    pub fn push_topology(&mut self, total_cores: i32, total_sockets: i32) {
        self.push_info(Ok(vec![CpuInfoRecord {
            total_cores,
            total_sockets,
        }]));
    }

    /// Queues a failing topology response.
    pub fn push_info_error(&mut self, message: &str) {
        self.push_info(Err(ProviderError::Io(std::io::Error::other(
            message.to_string(),
        ))));
    }

    /// Queues one per-core response.
    pub fn push_perc(&mut self, response: Result<Vec<CpuPercRecord>, ProviderError>) {
        self.perc_responses.push_back(response);
    }

    /// Queues a successful per-core response where every record is all-NaN,
    /// mimicking the provider's degraded mode.
    pub fn push_all_nan(&mut self, cores: usize) {
        self.push_perc(Ok(vec![CpuPercRecord::all_nan(); cores]));
    }

    /// Queues a failing per-core response.
    pub fn push_perc_error(&mut self, message: &str) {
        self.push_perc(Err(ProviderError::Io(std::io::Error::other(
            message.to_string(),
        ))));
    }
}

impl StatsProvider for MockProvider {
    fn cpu_info(&mut self) -> Result<Vec<CpuInfoRecord>, ProviderError> {
        self.counts.info.fetch_add(1, Ordering::SeqCst);
        self.info_responses.pop_front().unwrap_or_else(|| Ok(vec![]))
    }

    fn cpu_perc_list(&mut self) -> Result<Vec<CpuPercRecord>, ProviderError> {
        self.counts.perc.fetch_add(1, Ordering::SeqCst);
        self.perc_responses.pop_front().unwrap_or_else(|| Ok(vec![]))
    }
}

/// Builds a valid per-core record with the given user fraction and the
/// remainder spent idle. Convenience for tests.
pub fn perc_with_user(user: f64) -> CpuPercRecord {
    CpuPercRecord {
        user,
        sys: 0.0,
        nice: 0.0,
        wait: 0.0,
        idle: 1.0 - user,
        irq: 0.0,
    }
}
