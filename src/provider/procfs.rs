//! Procfs-backed stats provider.
//!
//! Reads `/proc/cpuinfo` for topology and `/proc/stat` for per-core time
//! counters. `/proc/stat` exposes cumulative jiffies, so fractional
//! breakdowns are computed as deltas between consecutive `cpu_perc_list`
//! calls; the first call measures against boot-relative totals.
//!
//! Two consecutive reads within the same clock tick leave a zero elapsed
//! total, and `0/0` division yields all-NaN fractions. This is the
//! rapid-polling degradation the sampler's retry-with-delay defends against.

use std::path::Path;

use crate::provider::parser::{CpuTicks, parse_cpuinfo, parse_stat_cpus};
use crate::provider::traits::ProcFs;
use crate::provider::{CpuInfoRecord, CpuPercRecord, ProviderError, StatsProvider};

/// Stats provider reading from a proc filesystem.
pub struct ProcfsProvider<F: ProcFs> {
    fs: F,
    proc_path: String,
    /// Per-core counters from the previous `cpu_perc_list` call.
    prev: Option<Vec<CpuTicks>>,
}

impl<F: ProcFs> ProcfsProvider<F> {
    /// Creates a new provider.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            prev: None,
        }
    }

    fn read_per_core_ticks(&self) -> Result<Vec<CpuTicks>, ProviderError> {
        let path = format!("{}/stat", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        let cpus = parse_stat_cpus(&content).map_err(|e| ProviderError::Parse(e.message))?;

        // Keep only the per-core lines; the aggregate "cpu" line is dropped.
        Ok(cpus.into_iter().filter(|c| c.cpu_id.is_some()).collect())
    }
}

/// Computes the fractional breakdown for one core between two counter sets.
///
/// A zero elapsed total produces NaN in every field.
fn fractions(prev: &CpuTicks, cur: &CpuTicks) -> CpuPercRecord {
    let elapsed = cur.total().saturating_sub(prev.total()) as f64;
    let frac = |p: u64, c: u64| c.saturating_sub(p) as f64 / elapsed;

    CpuPercRecord {
        user: frac(prev.user, cur.user),
        sys: frac(prev.system, cur.system),
        nice: frac(prev.nice, cur.nice),
        wait: frac(prev.iowait, cur.iowait),
        idle: frac(prev.idle, cur.idle),
        irq: frac(prev.irq + prev.softirq, cur.irq + cur.softirq),
    }
}

impl<F: ProcFs> StatsProvider for ProcfsProvider<F> {
    fn cpu_info(&mut self) -> Result<Vec<CpuInfoRecord>, ProviderError> {
        let path = format!("{}/cpuinfo", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        let info = parse_cpuinfo(&content).map_err(|e| ProviderError::Parse(e.message))?;

        Ok(vec![CpuInfoRecord {
            total_cores: info.logical_cores as i32,
            total_sockets: info.physical_sockets as i32,
        }])
    }

    fn cpu_perc_list(&mut self) -> Result<Vec<CpuPercRecord>, ProviderError> {
        let cur = self.read_per_core_ticks()?;

        // Baseline is the previous sample, or boot-relative zeros on the
        // first call and after a core count change (CPU hotplug).
        let baseline: Vec<CpuTicks> = match &self.prev {
            Some(prev) if prev.len() == cur.len() => prev.clone(),
            _ => cur
                .iter()
                .map(|c| CpuTicks {
                    cpu_id: c.cpu_id,
                    ..CpuTicks::default()
                })
                .collect(),
        };

        let records: Vec<CpuPercRecord> = baseline
            .iter()
            .zip(cur.iter())
            .map(|(prev, cur)| fractions(prev, cur))
            .collect();

        self.prev = Some(cur);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockFs;

    const STAT_T0: &str = "\
cpu  200 20 100 1600 40 20 20 0 0 0
cpu0 100 10 50 800 20 10 10 0 0 0
cpu1 100 10 50 800 20 10 10 0 0 0
ctxt 500000
";

    // 1000 jiffies elapsed per core: 500 user, 100 system, 400 idle.
    const STAT_T1: &str = "\
cpu  1200 20 300 2400 40 20 20 0 0 0
cpu0 600 10 150 1200 20 10 10 0 0 0
cpu1 600 10 150 1200 20 10 10 0 0 0
ctxt 500000
";

    const CPUINFO: &str = "\
processor\t: 0
physical id\t: 0

processor\t: 1
physical id\t: 0
";

    fn provider_with(stat: &str) -> (ProcfsProvider<MockFs>, MockFs) {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", stat);
        fs.add_file("/proc/cpuinfo", CPUINFO);
        (ProcfsProvider::new(fs.clone(), "/proc"), fs)
    }

    #[test]
    fn test_cpu_info() {
        let (mut provider, _fs) = provider_with(STAT_T0);
        let info = provider.cpu_info().unwrap();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].total_cores, 2);
        assert_eq!(info[0].total_sockets, 1);
    }

    #[test]
    fn test_cpu_info_missing_file_is_error() {
        let fs = MockFs::new();
        let mut provider = ProcfsProvider::new(fs, "/proc");
        assert!(matches!(provider.cpu_info(), Err(ProviderError::Io(_))));
    }

    #[test]
    fn test_first_call_is_boot_relative() {
        let (mut provider, _fs) = provider_with(STAT_T0);
        let records = provider.cpu_perc_list().unwrap();

        assert_eq!(records.len(), 2);
        // cpu0: 100 user out of 1000 total jiffies since boot.
        assert!((records[0].user - 0.1).abs() < 1e-9);
        assert!((records[0].sys - 0.05).abs() < 1e-9);
        assert!((records[0].idle - 0.8).abs() < 1e-9);
        assert!((records[0].wait - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_second_call_uses_deltas() {
        let (mut provider, fs) = provider_with(STAT_T0);
        provider.cpu_perc_list().unwrap();

        fs.replace_file("/proc/stat", STAT_T1);
        let records = provider.cpu_perc_list().unwrap();

        assert_eq!(records.len(), 2);
        assert!((records[0].user - 0.5).abs() < 1e-9);
        assert!((records[0].sys - 0.1).abs() < 1e-9);
        assert!((records[0].idle - 0.4).abs() < 1e-9);
        assert!((records[0].nice - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_window_yields_all_nan() {
        let (mut provider, _fs) = provider_with(STAT_T0);
        provider.cpu_perc_list().unwrap();

        // Same counters again: zero jiffies elapsed, 0/0 everywhere.
        let records = provider.cpu_perc_list().unwrap();
        assert!(records[0].idle.is_nan());
        assert!(records[0].user.is_nan());
        assert!(records[0].sys.is_nan());
    }

    #[test]
    fn test_core_count_change_resets_baseline() {
        let (mut provider, fs) = provider_with(STAT_T0);
        provider.cpu_perc_list().unwrap();

        // One core goes away: the stale baseline must not be zipped against
        // the shorter sample.
        fs.replace_file(
            "/proc/stat",
            "cpu  600 10 150 1200 20 10 10 0 0 0\ncpu0 600 10 150 1200 20 10 10 0 0 0\n",
        );
        let records = provider.cpu_perc_list().unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0].user - 0.3).abs() < 1e-9);
    }
}
