//! Prometheus gauge registration for the CPU sampler.
//!
//! The sampler's values are exposed through a custom collector so every
//! scrape re-evaluates the gauges on demand; nothing is cached between
//! scrapes. Prometheus metric names cannot contain dashes, so the gauge
//! names use underscores throughout.

use std::sync::Arc;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, IntGauge, Registry};

use crate::provider::StatsProvider;
use crate::sampler::CpuSampler;

/// Memoized logical core count, `-1` when unknown.
pub const TOTAL_CORES: &str = "cpu_total_cores";
/// Memoized physical socket count, `-1` when unknown.
pub const PHYSICAL_CPUS: &str = "cpu_physical_cpus";
/// Sum of per-core user-time fractions over a fixed 1.0 denominator.
pub const CPU_TIME_USER_PERCENT: &str = "cpu_time_user_percent";
/// Sum of per-core system-time fractions over a fixed 1.0 denominator.
pub const CPU_TIME_SYS_PERCENT: &str = "cpu_time_sys_percent";

/// Pollable collector exposing the sampler's four gauges.
///
/// Each gauge is evaluated independently on every scrape, mirroring a
/// registry that polls named gauges on its own schedule. A scrape that hits
/// an unavailable provider reports `-1` topology and `0.0` aggregates;
/// dashboards must treat those as "currently unavailable", not as zero.
pub struct CpuGaugeCollector<P: StatsProvider> {
    sampler: Arc<CpuSampler<P>>,
    total_cores: IntGauge,
    physical_cpus: IntGauge,
    user_percent: Gauge,
    sys_percent: Gauge,
}

impl<P: StatsProvider> CpuGaugeCollector<P> {
    /// Creates a collector bound to the given sampler.
    pub fn new(sampler: Arc<CpuSampler<P>>) -> prometheus::Result<Self> {
        Ok(Self {
            sampler,
            total_cores: IntGauge::new(TOTAL_CORES, "Logical CPU cores (-1 when unknown)")?,
            physical_cpus: IntGauge::new(
                PHYSICAL_CPUS,
                "Physical CPU sockets (-1 when unknown)",
            )?,
            user_percent: Gauge::new(
                CPU_TIME_USER_PERCENT,
                "Per-core user time summed over a 1.0 denominator",
            )?,
            sys_percent: Gauge::new(
                CPU_TIME_SYS_PERCENT,
                "Per-core system time summed over a 1.0 denominator",
            )?,
        })
    }
}

impl<P: StatsProvider + Send> Collector for CpuGaugeCollector<P> {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.total_cores.desc();
        descs.extend(self.physical_cpus.desc());
        descs.extend(self.user_percent.desc());
        descs.extend(self.sys_percent.desc());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.total_cores.set(self.sampler.total_core_count() as i64);
        self.physical_cpus
            .set(self.sampler.physical_cpu_count() as i64);
        self.user_percent.set(self.sampler.user_time_percent());
        self.sys_percent.set(self.sampler.sys_time_percent());

        let mut families = self.total_cores.collect();
        families.extend(self.physical_cpus.collect());
        families.extend(self.user_percent.collect());
        families.extend(self.sys_percent.collect());
        families
    }
}

/// One-time registration of all four gauges into a registry.
pub fn register<P: StatsProvider + Send + 'static>(
    registry: &Registry,
    sampler: Arc<CpuSampler<P>>,
) -> prometheus::Result<()> {
    registry.register(Box::new(CpuGaugeCollector::new(sampler)?))
}
