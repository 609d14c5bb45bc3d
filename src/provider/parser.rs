//! Parsers for the `/proc` files backing the provider.
//!
//! These are pure functions that parse file contents into structured data.
//! They are designed to be easily testable with string inputs.

use std::collections::HashSet;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Cumulative CPU time counters (jiffies) for one `cpu` line of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    /// `None` for the aggregate `cpu` line, `Some(n)` for `cpuN`.
    pub cpu_id: Option<u32>,
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTicks {
    /// Total elapsed jiffies covered by this counter set.
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }
}

/// Parses the `cpu*` lines of `/proc/stat`.
///
/// Returns the aggregate line first (if present) followed by per-core lines
/// in file order, matching the kernel's layout.
pub fn parse_stat_cpus(content: &str) -> Result<Vec<CpuTicks>, ParseError> {
    let mut cpus = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = parts.first() else {
            continue;
        };
        if !first.starts_with("cpu") {
            continue;
        }

        let cpu_id = if *first == "cpu" {
            None
        } else {
            match first.strip_prefix("cpu").and_then(|s| s.parse().ok()) {
                Some(id) => Some(id),
                // cpuinfo-style lines like "cpufreq" are not CPU counters
                None => continue,
            }
        };

        if parts.len() < 5 {
            return Err(ParseError::new(format!(
                "not enough fields in stat line '{}': expected 4+, got {}",
                first,
                parts.len() - 1
            )));
        }

        let get_val =
            |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        cpus.push(CpuTicks {
            cpu_id,
            user: get_val(1),
            nice: get_val(2),
            system: get_val(3),
            idle: get_val(4),
            iowait: get_val(5),
            irq: get_val(6),
            softirq: get_val(7),
            steal: get_val(8),
        });
    }

    if cpus.is_empty() {
        return Err(ParseError::new("no cpu lines in stat"));
    }

    Ok(cpus)
}

/// Host CPU topology parsed from `/proc/cpuinfo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuInfoSummary {
    /// Number of `processor` entries (logical cores).
    pub logical_cores: u32,
    /// Number of distinct `physical id` values (sockets).
    pub physical_sockets: u32,
}

/// Parses `/proc/cpuinfo` into a topology summary.
///
/// Logical cores are counted from `processor` entries. Sockets are counted
/// from distinct `physical id` values; architectures that omit `physical id`
/// (most ARM systems) are reported as a single socket.
pub fn parse_cpuinfo(content: &str) -> Result<CpuInfoSummary, ParseError> {
    let mut logical_cores: u32 = 0;
    let mut physical_ids: HashSet<u32> = HashSet::new();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "processor" => logical_cores += 1,
            "physical id" => {
                if let Ok(id) = value.trim().parse() {
                    physical_ids.insert(id);
                }
            }
            _ => {}
        }
    }

    if logical_cores == 0 {
        return Err(ParseError::new("no processor entries in cpuinfo"));
    }

    let physical_sockets = if physical_ids.is_empty() {
        1
    } else {
        physical_ids.len() as u32
    };

    Ok(CpuInfoSummary {
        logical_cores,
        physical_sockets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stat_cpus() {
        let content = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
ctxt 500000
btime 1700000000
";
        let cpus = parse_stat_cpus(content).unwrap();

        assert_eq!(cpus.len(), 3); // cpu + cpu0 + cpu1
        assert_eq!(cpus[0].cpu_id, None); // aggregate
        assert_eq!(cpus[0].user, 10000);
        assert_eq!(cpus[1].cpu_id, Some(0));
        assert_eq!(cpus[2].cpu_id, Some(1));
        assert_eq!(cpus[1].idle, 20000);
        assert_eq!(cpus[1].total(), 2500 + 125 + 750 + 20000 + 250 + 50 + 25);
    }

    #[test]
    fn test_parse_stat_cpus_ignores_non_counter_cpu_lines() {
        let content = "\
cpu  100 0 50 800 10 5 5 0 0 0
cpu0 100 0 50 800 10 5 5 0 0 0
cpufreq 12345
";
        let cpus = parse_stat_cpus(content).unwrap();
        assert_eq!(cpus.len(), 2);
    }

    #[test]
    fn test_parse_stat_cpus_empty_is_error() {
        assert!(parse_stat_cpus("ctxt 1\nbtime 2\n").is_err());
        assert!(parse_stat_cpus("").is_err());
    }

    #[test]
    fn test_parse_stat_cpus_short_line_is_error() {
        assert!(parse_stat_cpus("cpu0 100 200\n").is_err());
    }

    #[test]
    fn test_parse_cpuinfo_two_sockets() {
        let content = "\
processor\t: 0
physical id\t: 0
model name\t: Example CPU

processor\t: 1
physical id\t: 0

processor\t: 2
physical id\t: 1

processor\t: 3
physical id\t: 1
";
        let info = parse_cpuinfo(content).unwrap();
        assert_eq!(info.logical_cores, 4);
        assert_eq!(info.physical_sockets, 2);
    }

    #[test]
    fn test_parse_cpuinfo_without_physical_id_assumes_one_socket() {
        let content = "processor\t: 0\nmodel name\t: ARMv8\n\nprocessor\t: 1\n";
        let info = parse_cpuinfo(content).unwrap();
        assert_eq!(info.logical_cores, 2);
        assert_eq!(info.physical_sockets, 1);
    }

    #[test]
    fn test_parse_cpuinfo_no_processors_is_error() {
        assert!(parse_cpuinfo("model name\t: Example CPU\n").is_err());
        assert!(parse_cpuinfo("").is_err());
    }
}
