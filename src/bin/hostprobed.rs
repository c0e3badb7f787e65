//! hostprobed - host metrics exporter daemon.
//!
//! Samples kernel pseudo-files on a fixed interval and serves the results
//! as a Prometheus scrape endpoint. Metric families and the sampling
//! interval come from the JSON file named by `CONFIG_FILE_PATH`.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use hostprobe::collector::{RealFs, SystemCollector};
use hostprobe::config::{CONFIG_FILE_ENV, Config};
use hostprobe::exporter::{MetricPublisher, MetricsServer, Scheduler};

/// Host metrics exporter daemon.
#[derive(Parser)]
#[command(name = "hostprobed", about = "Host metrics exporter daemon", version)]
struct Args {
    /// Port for the metrics scrape endpoint.
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Path to the proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Path to the sys filesystem (for testing/mocking).
    #[arg(long, default_value = "/sys")]
    sys_path: String,

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
        .add_directive(format!("hostprobed={}", level).parse().unwrap())
        .add_directive(format!("hostprobe={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("hostprobed {} starting", env!("CARGO_PKG_VERSION"));

    // Startup-fatal tier: config, registry, server bind. Anything that
    // fails here exits non-zero; per-tick reader errors never do.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            error!(
                "Set {} to the path of a JSON config file, e.g. {{\"sampling_interval\": 1, \"metrics\": [\"cpu\", \"memory\"]}}",
                CONFIG_FILE_ENV
            );
            return ExitCode::FAILURE;
        }
    };

    let enabled = config.metrics.enabled_names();
    if enabled.is_empty() {
        warn!("No metric families enabled; scrapes will return an empty registry");
    }
    info!(
        "Config: interval={}s, metrics=[{}]",
        config.sampling_interval.as_secs(),
        enabled.join(", ")
    );

    let publisher = match MetricPublisher::new(&config.metrics) {
        Ok(publisher) => Arc::new(publisher),
        Err(e) => {
            error!("Failed to set up metric registry: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let server = match MetricsServer::bind(args.port) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to bind metrics endpoint on port {}: {}", args.port, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Serving metrics on http://0.0.0.0:{}/metrics", args.port);
    // The serving thread runs until process exit; it is never joined.
    let _serving_thread = server.spawn(publisher.clone());

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting sampling loop");
    let collector = SystemCollector::new(RealFs::new(), &args.proc_path, &args.sys_path);
    let mut scheduler = Scheduler::new(collector, publisher, config);
    scheduler.run(&running);

    info!("Shutdown complete");
    ExitCode::SUCCESS
}
