//! CPU sampler: per-core time breakdowns and host topology.
//!
//! The sampler wraps a `StatsProvider` and defends against its known
//! failure modes. Topology is read once at construction and memoized;
//! per-core readings are taken fresh on every call, with a single
//! delay-and-retry when the provider returns an all-NaN reading (its
//! observed degraded mode under rapid repeated polling).
//!
//! Every failure degrades to "unavailable" values (`-1` topology, empty
//! per-core sequence) instead of surfacing an error: metrics collection
//! must keep running even when the stats source misbehaves.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::{CpuPercRecord, StatsProvider};
use crate::util::Shutdown;

/// Delay before re-querying after an all-NaN reading.
///
/// Empirically one second of backoff clears the provider's degraded mode.
const NAN_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Denominator for the aggregate ratio gauges.
///
/// Per-core sums are reported against a fixed 1.0, so the value scales with
/// core count: four cores each 50% in user time read as 2.0, not 0.5. The
/// gauges report "CPU-cores-equivalent of time", not a normalized share.
const RATIO_DENOMINATOR: f64 = 1.0;

/// One core's time-share breakdown at a sampling instant.
///
/// Each field is a fraction of elapsed time, nominally in `[0.0, 1.0]`.
/// All six fields are finite together or NaN together; a NaN-valued entry
/// means the reading was taken while the provider was degraded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuTime {
    /// Time spent running user-space code.
    pub user: f64,
    /// Time spent in the kernel.
    pub sys: f64,
    /// Time spent running niced user-space code.
    pub nice: f64,
    /// Time spent waiting on I/O.
    pub waiting: f64,
    /// Time spent idle.
    pub idle: f64,
    /// Time spent servicing interrupts.
    pub irq: f64,
}

impl From<CpuPercRecord> for CpuTime {
    fn from(record: CpuPercRecord) -> Self {
        Self {
            user: record.user,
            sys: record.sys,
            nice: record.nice,
            waiting: record.wait,
            idle: record.idle,
            irq: record.irq,
        }
    }
}

/// Host CPU topology, memoized at sampler construction.
///
/// `-1` means the value could not be determined; a sampler whose initial
/// topology query failed keeps the sentinel for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTopology {
    pub total_cores: i32,
    pub total_sockets: i32,
}

impl CpuTopology {
    /// The "could not be determined" topology.
    pub fn unknown() -> Self {
        Self {
            total_cores: -1,
            total_sockets: -1,
        }
    }
}

/// Samples per-core CPU times and topology from a stats provider.
///
/// The provider is owned exclusively and accessed behind a mutex: providers
/// keep per-call session state, so concurrent gauge evaluations are
/// serialized per sampler instance. The memoized topology is written once
/// before the sampler can be shared and needs no locking.
pub struct CpuSampler<P: StatsProvider> {
    provider: Mutex<P>,
    topology: CpuTopology,
    retry_delay: Duration,
    shutdown: Shutdown,
}

impl<P: StatsProvider> CpuSampler<P> {
    /// Creates a sampler, querying topology exactly once.
    ///
    /// A failed or empty topology query is swallowed: topology is a
    /// convenience metric and its unavailability must not prevent the
    /// sampler from serving the time-based gauges. Construction never fails.
    pub fn new(provider: P) -> Self {
        Self::with_shutdown(provider, Shutdown::new())
    }

    /// Like `new`, but ties the retry delay to an external shutdown token.
    ///
    /// Cancelling the token aborts an in-flight retry wait; the cancelled
    /// state is sticky and stays observable to the caller afterwards.
    pub fn with_shutdown(mut provider: P, shutdown: Shutdown) -> Self {
        let topology = match provider.cpu_info() {
            Ok(infos) => match infos.first() {
                Some(info) => CpuTopology {
                    total_cores: info.total_cores,
                    total_sockets: info.total_sockets,
                },
                None => {
                    debug!("topology query returned no records");
                    CpuTopology::unknown()
                }
            },
            Err(e) => {
                debug!("topology unavailable: {}", e);
                CpuTopology::unknown()
            }
        };

        Self {
            provider: Mutex::new(provider),
            topology,
            retry_delay: NAN_RETRY_DELAY,
            shutdown,
        }
    }

    /// Overrides the NaN-retry delay. Intended for tests.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Memoized logical core count, or `-1` if unknown.
    pub fn total_core_count(&self) -> i32 {
        self.topology.total_cores
    }

    /// Memoized physical socket count, or `-1` if unknown.
    pub fn physical_cpu_count(&self) -> i32 {
        self.topology.total_sockets
    }

    /// Returns the current per-core time breakdown, one entry per core in
    /// provider order. Empty when the provider is unavailable.
    ///
    /// If the first core's `idle` is NaN the reading was taken in the
    /// provider's degraded mode: the call backs off for the retry delay and
    /// re-queries exactly once, accepting whatever the second attempt
    /// returns (NaN entries included). A plain failure or empty result is
    /// never retried. Cancellation during the backoff aborts the read.
    pub fn cpus(&self) -> Vec<CpuTime> {
        let mut provider = match self.provider.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let Some(records) = perc_list(&mut *provider) else {
            return Vec::new();
        };

        let records = if records[0].idle.is_nan() {
            debug!(
                "all-NaN cpu reading, backing off {:?} before retry",
                self.retry_delay
            );
            if self.shutdown.wait_timeout(self.retry_delay) {
                return Vec::new();
            }
            match perc_list(&mut *provider) {
                Some(records) => records,
                None => return Vec::new(),
            }
        } else {
            records
        };

        records.into_iter().map(CpuTime::from).collect()
    }

    /// Sum of per-core `user` fractions over a fixed denominator of 1.0.
    ///
    /// 0.0 when no cores could be sampled.
    pub fn user_time_percent(&self) -> f64 {
        self.cpus().iter().map(|c| c.user).sum::<f64>() / RATIO_DENOMINATOR
    }

    /// Sum of per-core `sys` fractions over a fixed denominator of 1.0.
    ///
    /// 0.0 when no cores could be sampled.
    pub fn sys_time_percent(&self) -> f64 {
        self.cpus().iter().map(|c| c.sys).sum::<f64>() / RATIO_DENOMINATOR
    }
}

/// Queries the provider once, collapsing errors and empty results to `None`.
fn perc_list<P: StatsProvider>(provider: &mut P) -> Option<Vec<CpuPercRecord>> {
    match provider.cpu_perc_list() {
        Ok(records) if !records.is_empty() => Some(records),
        Ok(_) => None,
        Err(e) => {
            debug!("per-core reading unavailable: {}", e);
            None
        }
    }
}
