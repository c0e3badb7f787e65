//! Periodic sampling loop.
//!
//! The scheduler drives one sampling pass per configured interval: for
//! every enabled metric family it invokes the collector and publishes the
//! result. A failed family is logged and skipped for the tick: the
//! previously published value stays visible to scrapers and the next tick
//! retries naturally. There is no retry, backoff, or failure limit.

use crate::collector::{FileSystem, SystemCollector};
use crate::config::Config;
use crate::exporter::metrics::MetricPublisher;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Interval at which the sleeping loop re-checks the shutdown flag.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drives periodic collection of all enabled metric families.
pub struct Scheduler<F: FileSystem> {
    collector: SystemCollector<F>,
    publisher: Arc<MetricPublisher>,
    config: Config,
}

impl<F: FileSystem> Scheduler<F> {
    pub fn new(
        collector: SystemCollector<F>,
        publisher: Arc<MetricPublisher>,
        config: Config,
    ) -> Self {
        Self {
            collector,
            publisher,
            config,
        }
    }

    /// Runs one sampling pass over the enabled families.
    pub fn tick(&mut self) {
        let enabled = self.config.metrics;

        if enabled.cpu {
            match self.collector.collect_cpu_usage() {
                Ok(usage) => self.publisher.publish_cpu_usage(usage),
                Err(e) => warn!("cpu usage skipped this tick: {}", e),
            }
        }
        if enabled.memory {
            match self.collector.collect_memory() {
                Ok(info) => self.publisher.publish_memory(&info),
                Err(e) => warn!("memory skipped this tick: {}", e),
            }
        }
        if enabled.battery {
            match self.collector.collect_battery_level() {
                Ok(level) => self.publisher.publish_battery_level(level),
                Err(e) => warn!("battery level skipped this tick: {}", e),
            }
        }
        if enabled.avg_load {
            match self.collector.collect_load_average() {
                Ok(load) => self.publisher.publish_load_average(load),
                Err(e) => warn!("load average skipped this tick: {}", e),
            }
        }
        if enabled.cpu_temp {
            match self.collector.collect_cpu_temp() {
                Ok(celsius) => self.publisher.publish_cpu_temp(celsius),
                Err(e) => warn!("cpu temperature skipped this tick: {}", e),
            }
        }
        if enabled.cpu_speed {
            match self.collector.collect_cpu_speed() {
                Ok(mhz) => self.publisher.publish_cpu_speed(mhz),
                Err(e) => warn!("cpu speed skipped this tick: {}", e),
            }
        }
        if enabled.processes {
            match self.collector.collect_process_counters() {
                Ok(counters) => self.publisher.publish_process_counters(&counters),
                Err(e) => warn!("process counters skipped this tick: {}", e),
            }
        }
        if enabled.sys_calls {
            match self.collector.collect_self_ctxt_switches() {
                Ok(_) => self.publisher.bump_sys_calls(),
                Err(e) => warn!("syscall activity skipped this tick: {}", e),
            }
        }
        if enabled.disk {
            match self.collector.collect_disk_totals() {
                Ok(totals) => self.publisher.publish_disk_totals(&totals),
                Err(e) => warn!("disk totals skipped this tick: {}", e),
            }
        }
        if enabled.network {
            match self.collector.collect_network_totals() {
                Ok(totals) => self.publisher.publish_network_totals(&totals),
                Err(e) => warn!("network totals skipped this tick: {}", e),
            }
        }
    }

    /// Runs sampling passes until `running` clears.
    ///
    /// The inter-tick sleep is sliced so a shutdown signal is honored
    /// within `SHUTDOWN_POLL_INTERVAL` rather than a full interval.
    pub fn run(&mut self, running: &AtomicBool) {
        while running.load(Ordering::SeqCst) {
            self.tick();
            debug!("sampling pass complete");

            let mut remaining = self.config.sampling_interval;
            while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
                let sleep_time = remaining.min(SHUTDOWN_POLL_INTERVAL);
                std::thread::sleep(sleep_time);
                remaining = remaining.saturating_sub(sleep_time);
            }
        }
    }
}
