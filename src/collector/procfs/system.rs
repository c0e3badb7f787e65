//! System collector for gathering host metrics from kernel pseudo-files.
//!
//! Every `collect_*` method re-opens and re-reads its fixed source path on
//! each call; pseudo-files are regenerated per read and holding a handle
//! would observe stale kernel state. The only state carried between calls
//! is the previous CPU-times sample needed for the usage delta.

use crate::collector::procfs::parser::{
    CpuTimes, DiskTotals, MemoryInfo, NetworkTotals, ProcessCounters, parse_cpu_mhz,
    parse_cpu_times, parse_disk_totals, parse_loadavg, parse_meminfo, parse_network_totals,
    parse_process_counters, parse_scalar, parse_voluntary_ctxt_switches,
};
use crate::collector::traits::FileSystem;
use std::path::Path;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading a source file.
    Io(std::io::Error),
    /// The source content did not match the expected format.
    Parse(String),
    /// The source parsed but the value is semantically unusable
    /// (negative battery level, zero CPU-time delta, and so on).
    Invalid(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
            CollectError::Invalid(msg) => write!(f, "invalid sample: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

/// Collects host-wide metrics from `/proc` and `/sys`.
///
/// Owns the previous CPU-times sample used by `collect_cpu_usage`; all
/// other readers are stateless per call. Only the sampling thread touches
/// a collector, so no synchronization is needed here.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
    sys_path: String,
    /// Baseline for the CPU usage delta. Zero at startup, so the first
    /// computed value is the busy share since boot.
    prev_cpu: CpuTimes,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to the proc filesystem (usually "/proc")
    /// * `sys_path` - Base path to the sys filesystem (usually "/sys")
    pub fn new(fs: F, proc_path: impl Into<String>, sys_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            sys_path: sys_path.into(),
            prev_cpu: CpuTimes::default(),
        }
    }

    fn read_source(&self, path: &str) -> Result<String, CollectError> {
        Ok(self.fs.read_to_string(Path::new(path))?)
    }

    /// Computes CPU usage percent from the delta between the current
    /// aggregate CPU times and the previous sample.
    ///
    /// A sample whose counters went backwards (reboot, unusable source) is
    /// rejected and becomes the new baseline so the next pass recovers. A
    /// zero total delta is rejected without touching the baseline, letting
    /// a longer interval accumulate a usable delta.
    pub fn collect_cpu_usage(&mut self) -> Result<f64, CollectError> {
        let path = format!("{}/stat", self.proc_path);
        let content = self.read_source(&path)?;
        let curr = parse_cpu_times(&content).map_err(|e| CollectError::Parse(e.message))?;

        if !curr.is_monotonic_from(&self.prev_cpu) {
            self.prev_cpu = curr;
            return Err(CollectError::Invalid(
                "cpu time counters went backwards".into(),
            ));
        }

        let total_delta = curr.total() - self.prev_cpu.total();
        if total_delta == 0 {
            return Err(CollectError::Invalid(
                "no cpu time elapsed between samples".into(),
            ));
        }
        let idle_delta = curr.idle_total() - self.prev_cpu.idle_total();
        let usage = 100.0 * (total_delta - idle_delta) as f64 / total_delta as f64;

        self.prev_cpu = curr;
        Ok(usage)
    }

    /// Collects memory figures from `<proc>/meminfo`.
    pub fn collect_memory(&self) -> Result<MemoryInfo, CollectError> {
        let path = format!("{}/meminfo", self.proc_path);
        let content = self.read_source(&path)?;
        let info = parse_meminfo(&content).map_err(|e| CollectError::Parse(e.message))?;

        if info.total == 0 {
            return Err(CollectError::Invalid("MemTotal is zero".into()));
        }
        if info.free > info.total {
            return Err(CollectError::Invalid("MemFree exceeds MemTotal".into()));
        }
        Ok(info)
    }

    /// Collects accumulated I/O totals from `<proc>/diskstats`.
    pub fn collect_disk_totals(&self) -> Result<DiskTotals, CollectError> {
        let path = format!("{}/diskstats", self.proc_path);
        let content = self.read_source(&path)?;
        parse_disk_totals(&content).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects accumulated error/drop totals from `<proc>/net/dev`.
    pub fn collect_network_totals(&self) -> Result<NetworkTotals, CollectError> {
        let path = format!("{}/net/dev", self.proc_path);
        let content = self.read_source(&path)?;
        parse_network_totals(&content).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects the battery charge percentage from the fixed BAT0 source.
    pub fn collect_battery_level(&self) -> Result<f64, CollectError> {
        let path = format!("{}/class/power_supply/BAT0/capacity", self.sys_path);
        let content = self.read_source(&path)?;
        let level = parse_scalar(&content).map_err(|e| CollectError::Parse(e.message))?;
        if level < 0.0 {
            return Err(CollectError::Invalid("negative battery level".into()));
        }
        Ok(level)
    }

    /// Collects the 1-minute load average from `<proc>/loadavg`.
    pub fn collect_load_average(&self) -> Result<f64, CollectError> {
        let path = format!("{}/loadavg", self.proc_path);
        let content = self.read_source(&path)?;
        let load = parse_loadavg(&content).map_err(|e| CollectError::Parse(e.message))?;
        if load < 0.0 {
            return Err(CollectError::Invalid("negative load average".into()));
        }
        Ok(load)
    }

    /// Collects the CPU temperature in Celsius from thermal zone 0
    /// (the source reports milli-degrees).
    pub fn collect_cpu_temp(&self) -> Result<f64, CollectError> {
        let path = format!("{}/class/thermal/thermal_zone0/temp", self.sys_path);
        let content = self.read_source(&path)?;
        let milli = parse_scalar(&content).map_err(|e| CollectError::Parse(e.message))?;
        if milli < 0.0 {
            return Err(CollectError::Invalid("negative cpu temperature".into()));
        }
        Ok(milli / 1000.0)
    }

    /// Collects the current CPU clock in MHz from `<proc>/cpuinfo`.
    pub fn collect_cpu_speed(&self) -> Result<f64, CollectError> {
        let path = format!("{}/cpuinfo", self.proc_path);
        let content = self.read_source(&path)?;
        let mhz = parse_cpu_mhz(&content).map_err(|e| CollectError::Parse(e.message))?;
        if mhz == 0.0 {
            return Err(CollectError::Invalid("cpu MHz reported as zero".into()));
        }
        Ok(mhz)
    }

    /// Collects this process's voluntary context switch counter from
    /// `<proc>/self/status`, used as a syscall-activity proxy.
    pub fn collect_self_ctxt_switches(&self) -> Result<u64, CollectError> {
        let path = format!("{}/self/status", self.proc_path);
        let content = self.read_source(&path)?;
        let count =
            parse_voluntary_ctxt_switches(&content).map_err(|e| CollectError::Parse(e.message))?;
        if count == 0 {
            return Err(CollectError::Invalid(
                "voluntary context switch counter is zero".into(),
            ));
        }
        Ok(count)
    }

    /// Collects boot-cumulative process and context-switch counters from
    /// `<proc>/stat`.
    pub fn collect_process_counters(&self) -> Result<ProcessCounters, CollectError> {
        let path = format!("{}/stat", self.proc_path);
        let content = self.read_source(&path)?;
        parse_process_counters(&content).map_err(|e| CollectError::Parse(e.message))
    }
}
