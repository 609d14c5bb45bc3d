//! cpumetricsd - CPU gauge scrape daemon.
//!
//! Registers the CPU sampler's gauges into a Prometheus registry and
//! periodically dumps the registry in the Prometheus text format to stdout.
//! This is the minimal stand-in for an external metrics backend polling the
//! gauges on its own schedule.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use cpumetrics::provider::{ProcfsProvider, RealFs};
use cpumetrics::util::Shutdown;
use cpumetrics::{CpuSampler, register};

/// CPU gauge scrape daemon.
#[derive(Parser)]
#[command(name = "cpumetricsd", about = "CPU gauge scrape daemon", version)]
struct Args {
    /// Scrape interval in seconds.
    #[arg(short, long, default_value = "10")]
    interval: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("cpumetricsd={}", level).parse().unwrap())
        .add_directive(format!("cpumetrics={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("cpumetricsd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, proc={}",
        args.interval, args.proc_path
    );

    // Setup graceful shutdown; the token also interrupts a sampler retry
    // delay in flight.
    let shutdown = Shutdown::new();
    let s = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        s.cancel();
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let provider = ProcfsProvider::new(RealFs::new(), &args.proc_path);
    let sampler = Arc::new(CpuSampler::with_shutdown(provider, shutdown.clone()));

    if sampler.total_core_count() >= 0 {
        info!(
            "Topology: {} cores, {} sockets",
            sampler.total_core_count(),
            sampler.physical_cpu_count()
        );
    } else {
        warn!("CPU topology unavailable, gauges will read -1");
    }

    let registry = Registry::new();
    if let Err(e) = register(&registry, sampler) {
        error!("Failed to register gauges: {}", e);
        return;
    }

    let encoder = TextEncoder::new();
    let interval = Duration::from_secs(args.interval);
    let mut scrape_count: u64 = 0;

    info!("Starting scrape loop");

    loop {
        scrape_count += 1;
        let families = registry.gather();
        let mut buffer = Vec::new();
        match encoder.encode(&families, &mut buffer) {
            Ok(()) => {
                print!("{}", String::from_utf8_lossy(&buffer));
                debug!("Scrape #{}: {} metric families", scrape_count, families.len());
            }
            Err(e) => {
                error!("Failed to encode metrics: {}", e);
            }
        }

        if shutdown.wait_timeout(interval) {
            break;
        }
    }

    info!("Shutting down after {} scrapes", scrape_count);
}
