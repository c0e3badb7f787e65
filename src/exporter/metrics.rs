//! Prometheus metric handles and concurrent-safe publication.

use crate::collector::{DiskTotals, MemoryInfo, NetworkTotals, ProcessCounters};
use crate::config::MetricToggles;
use prometheus::{Counter, Encoder, Gauge, Registry, TextEncoder};
use std::sync::{Mutex, MutexGuard};

/// Handles for every metric this exporter can publish.
///
/// All handles are created up front; only the families enabled in the
/// configuration are registered, so disabled families never appear in
/// scrape output at all.
pub struct MetricSet {
    pub cpu_usage: Gauge,
    pub memory_usage_pct: Gauge,
    pub memory_used: Gauge,
    pub memory_available: Gauge,
    pub battery_level: Gauge,
    pub avg_load: Gauge,
    pub cpu_temp: Gauge,
    pub cpu_speed: Gauge,
    pub processes: Gauge,
    pub context_switches: Gauge,
    pub sys_calls: Counter,
    pub disk_reads: Gauge,
    pub disk_writes: Gauge,
    pub disk_io_in_progress: Gauge,
    pub net_rx_errors: Gauge,
    pub net_tx_errors: Gauge,
    pub net_rx_drops: Gauge,
    pub net_tx_drops: Gauge,
}

impl MetricSet {
    /// Creates all metric handles, unregistered.
    fn new() -> Result<Self, prometheus::Error> {
        Ok(Self {
            cpu_usage: Gauge::new("cpu_usage_percentage", "CPU usage percentage")?,
            memory_usage_pct: Gauge::new(
                "memory_usage_percentage",
                "Percentage of memory in use",
            )?,
            memory_used: Gauge::new("memory_used", "Used memory in kB")?,
            memory_available: Gauge::new("memory_available", "Available memory in kB")?,
            battery_level: Gauge::new("battery_level", "Battery charge percentage")?,
            avg_load: Gauge::new("avg_load", "1-minute load average")?,
            cpu_temp: Gauge::new("cpu_temp", "CPU temperature in Celsius")?,
            cpu_speed: Gauge::new("cpu_speed", "CPU clock speed in MHz")?,
            processes: Gauge::new("number_of_processes", "Processes started since boot")?,
            context_switches: Gauge::new("context_changes", "Context switches since boot")?,
            sys_calls: Counter::new(
                "sys_calls",
                "Syscall activity sampled via the voluntary context switch counter",
            )?,
            disk_reads: Gauge::new("disk_reads", "Disk reads completed across all devices")?,
            disk_writes: Gauge::new("disk_writes", "Disk writes completed across all devices")?,
            disk_io_in_progress: Gauge::new(
                "disk_io_inprogress",
                "Disk I/O operations currently in progress",
            )?,
            net_rx_errors: Gauge::new(
                "network_rx_errors",
                "Receive errors across all interfaces",
            )?,
            net_tx_errors: Gauge::new(
                "network_tx_errors",
                "Transmit errors across all interfaces",
            )?,
            net_rx_drops: Gauge::new(
                "network_rx_drops",
                "Received packets dropped across all interfaces",
            )?,
            net_tx_drops: Gauge::new(
                "network_tx_drops",
                "Transmitted packets dropped across all interfaces",
            )?,
        })
    }

    /// Registers the enabled families with `registry`.
    fn register_enabled(
        &self,
        registry: &Registry,
        enabled: &MetricToggles,
    ) -> Result<(), prometheus::Error> {
        if enabled.cpu {
            registry.register(Box::new(self.cpu_usage.clone()))?;
        }
        if enabled.memory {
            registry.register(Box::new(self.memory_usage_pct.clone()))?;
            registry.register(Box::new(self.memory_used.clone()))?;
            registry.register(Box::new(self.memory_available.clone()))?;
        }
        if enabled.battery {
            registry.register(Box::new(self.battery_level.clone()))?;
        }
        if enabled.avg_load {
            registry.register(Box::new(self.avg_load.clone()))?;
        }
        if enabled.cpu_temp {
            registry.register(Box::new(self.cpu_temp.clone()))?;
        }
        if enabled.cpu_speed {
            registry.register(Box::new(self.cpu_speed.clone()))?;
        }
        if enabled.processes {
            registry.register(Box::new(self.processes.clone()))?;
            registry.register(Box::new(self.context_switches.clone()))?;
        }
        if enabled.sys_calls {
            registry.register(Box::new(self.sys_calls.clone()))?;
        }
        if enabled.disk {
            registry.register(Box::new(self.disk_reads.clone()))?;
            registry.register(Box::new(self.disk_writes.clone()))?;
            registry.register(Box::new(self.disk_io_in_progress.clone()))?;
        }
        if enabled.network {
            registry.register(Box::new(self.net_rx_errors.clone()))?;
            registry.register(Box::new(self.net_tx_errors.clone()))?;
            registry.register(Box::new(self.net_rx_drops.clone()))?;
            registry.register(Box::new(self.net_tx_drops.clone()))?;
        }
        Ok(())
    }
}

/// Shared publication point between the sampling loop and the HTTP
/// serving thread.
///
/// Every write and every render acquires the same mutex, so a scrape can
/// never observe a torn multi-gauge group (memory's three gauges, the two
/// process gauges). The lock is held only for the write or render itself,
/// never across source reads.
pub struct MetricPublisher {
    registry: Registry,
    metrics: MetricSet,
    lock: Mutex<()>,
}

impl MetricPublisher {
    /// Creates the registry and registers the enabled metric families.
    pub fn new(enabled: &MetricToggles) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let metrics = MetricSet::new()?;
        metrics.register_enabled(&registry, enabled)?;
        Ok(Self {
            registry,
            metrics,
            lock: Mutex::new(()),
        })
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // A poisoned lock only means another thread panicked mid-update;
        // the gauges themselves are always individually consistent.
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read access to the metric handles (used by tests and diagnostics).
    pub fn metric_set(&self) -> &MetricSet {
        &self.metrics
    }

    pub fn publish_cpu_usage(&self, percent: f64) {
        let _guard = self.guard();
        self.metrics.cpu_usage.set(percent);
    }

    /// Publishes the three memory gauges as one atomic group.
    pub fn publish_memory(&self, info: &MemoryInfo) {
        let used = info.used();
        let used_pct = used as f64 * 100.0 / info.total as f64;
        let _guard = self.guard();
        self.metrics.memory_usage_pct.set(used_pct);
        self.metrics.memory_used.set(used as f64);
        self.metrics.memory_available.set(info.available as f64);
    }

    pub fn publish_battery_level(&self, level: f64) {
        let _guard = self.guard();
        self.metrics.battery_level.set(level);
    }

    pub fn publish_load_average(&self, load: f64) {
        let _guard = self.guard();
        self.metrics.avg_load.set(load);
    }

    pub fn publish_cpu_temp(&self, celsius: f64) {
        let _guard = self.guard();
        self.metrics.cpu_temp.set(celsius);
    }

    pub fn publish_cpu_speed(&self, mhz: f64) {
        let _guard = self.guard();
        self.metrics.cpu_speed.set(mhz);
    }

    /// Publishes the two process-counter gauges as one atomic group.
    pub fn publish_process_counters(&self, counters: &ProcessCounters) {
        let _guard = self.guard();
        self.metrics.processes.set(counters.processes as f64);
        self.metrics
            .context_switches
            .set(counters.context_switches as f64);
    }

    /// Records one successful syscall-activity observation.
    pub fn bump_sys_calls(&self) {
        let _guard = self.guard();
        self.metrics.sys_calls.inc();
    }

    /// Publishes the three disk gauges as one atomic group.
    pub fn publish_disk_totals(&self, totals: &DiskTotals) {
        let _guard = self.guard();
        self.metrics.disk_reads.set(totals.reads as f64);
        self.metrics.disk_writes.set(totals.writes as f64);
        self.metrics
            .disk_io_in_progress
            .set(totals.in_progress as f64);
    }

    /// Publishes the four network gauges as one atomic group.
    pub fn publish_network_totals(&self, totals: &NetworkTotals) {
        let _guard = self.guard();
        self.metrics.net_rx_errors.set(totals.rx_errors as f64);
        self.metrics.net_tx_errors.set(totals.tx_errors as f64);
        self.metrics.net_rx_drops.set(totals.rx_drops as f64);
        self.metrics.net_tx_drops.set(totals.tx_drops as f64);
    }

    /// Renders the registered metrics in the Prometheus text exposition
    /// format, under the same lock as the writers.
    pub fn render(&self) -> Result<Vec<u8>, prometheus::Error> {
        let _guard = self.guard();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(buffer)
    }
}
