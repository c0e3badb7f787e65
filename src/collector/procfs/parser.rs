//! Parsers for kernel pseudo-file contents.
//!
//! These are pure functions that parse the text of `/proc` and `/sys`
//! sources into structured data. They are designed to be easily testable
//! with string inputs; all filesystem access happens in the collector.

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

/// Aggregate CPU time counters from the first line of `/proc/stat`.
///
/// All fields are cumulative jiffies since boot and never decrease while
/// the host stays up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Time spent idle, including I/O wait.
    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }

    /// Time spent doing work of any kind.
    pub fn busy_total(&self) -> u64 {
        self.user + self.nice + self.system + self.irq + self.softirq + self.steal
    }

    /// Total accounted CPU time.
    pub fn total(&self) -> u64 {
        self.idle_total() + self.busy_total()
    }

    /// Returns true if every counter is >= the corresponding counter in
    /// `prev`. Kernel counters only go backwards across a reboot.
    pub fn is_monotonic_from(&self, prev: &CpuTimes) -> bool {
        self.user >= prev.user
            && self.nice >= prev.nice
            && self.system >= prev.system
            && self.idle >= prev.idle
            && self.iowait >= prev.iowait
            && self.irq >= prev.irq
            && self.softirq >= prev.softirq
            && self.steal >= prev.steal
    }
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
///
/// The first line must start with the literal `cpu` label followed by at
/// least 8 whitespace-separated unsigned counters. Trailing fields
/// (guest, guest_nice) are ignored.
pub fn parse_cpu_times(content: &str) -> Result<CpuTimes, ParseError> {
    let line = content
        .lines()
        .next()
        .ok_or_else(|| ParseError::new("empty cpu stat content"))?;

    let mut parts = line.split_whitespace();
    if parts.next() != Some("cpu") {
        return Err(ParseError::new("missing aggregate cpu line"));
    }

    let mut fields = [0u64; 8];
    for (idx, slot) in fields.iter_mut().enumerate() {
        let token = parts
            .next()
            .ok_or_else(|| ParseError::new(format!("expected 8 cpu fields, got {}", idx)))?;
        *slot = token
            .parse()
            .map_err(|_| ParseError::new(format!("invalid cpu field {}: {:?}", idx, token)))?;
    }

    Ok(CpuTimes {
        user: fields[0],
        nice: fields[1],
        system: fields[2],
        idle: fields[3],
        iowait: fields[4],
        irq: fields[5],
        softirq: fields[6],
        steal: fields[7],
    })
}

/// Memory figures from `/proc/meminfo`, in kilobytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total: u64,
    pub free: u64,
    pub available: u64,
}

impl MemoryInfo {
    /// Memory in use: total minus free (buffer/cache overhead included).
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}

/// Parses `/proc/meminfo` content.
///
/// The three labeled fields may appear anywhere in the file and in any
/// order. Each is required: a source missing any of them fails the whole
/// parse rather than silently reporting a zero or stale value.
pub fn parse_meminfo(content: &str) -> Result<MemoryInfo, ParseError> {
    let mut total = None;
    let mut free = None;
    let mut available = None;

    let parse_kb = |rest: &str, label: &str| -> Result<u64, ParseError> {
        rest.split_whitespace()
            .next()
            .ok_or_else(|| ParseError::new(format!("{} has no value", label)))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {} value", label)))
    };

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total = Some(parse_kb(rest, "MemTotal")?);
        } else if let Some(rest) = line.strip_prefix("MemFree:") {
            free = Some(parse_kb(rest, "MemFree")?);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available = Some(parse_kb(rest, "MemAvailable")?);
        }
    }

    Ok(MemoryInfo {
        total: total.ok_or_else(|| ParseError::new("MemTotal not found"))?,
        free: free.ok_or_else(|| ParseError::new("MemFree not found"))?,
        available: available.ok_or_else(|| ParseError::new("MemAvailable not found"))?,
    })
}

/// I/O operation totals accumulated across every block device in a single
/// pass over `/proc/diskstats`. Not a delta: re-accumulated from zero on
/// each sampling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskTotals {
    /// Reads completed, summed over all devices.
    pub reads: u64,
    /// Writes completed, summed over all devices.
    pub writes: u64,
    /// I/Os currently in flight, summed over all devices.
    pub in_progress: u64,
}

/// Parses `/proc/diskstats` content into accumulated totals.
///
/// Format per line: major minor name reads r_merged r_sectors r_time
/// writes w_merged w_sectors w_time io_in_progress io_time ...
///
/// Lines that are too short or carry non-numeric counters are skipped
/// without aborting the scan.
pub fn parse_disk_totals(content: &str) -> Result<DiskTotals, ParseError> {
    let mut totals = DiskTotals::default();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 12 {
            continue;
        }

        let counters: Option<Vec<u64>> = parts[3..=11].iter().map(|s| s.parse().ok()).collect();
        let Some(counters) = counters else {
            continue;
        };

        totals.reads += counters[0];
        totals.writes += counters[4];
        totals.in_progress += counters[8];
    }

    Ok(totals)
}

/// Error and drop totals accumulated across all network interfaces from
/// `/proc/net/dev`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkTotals {
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_drops: u64,
    pub tx_drops: u64,
}

/// Parses `/proc/net/dev` content into accumulated totals.
///
/// Skips exactly the first two lines (the two-row header) regardless of
/// their content, then for every remaining interface line takes errs and
/// drop from both the receive and transmit column groups:
///
/// ```text
///  face |bytes packets errs drop fifo frame compressed multicast|bytes packets errs drop fifo colls carrier compressed
/// ```
///
/// Fails if the source has fewer than two lines at all; interface lines
/// that do not match the 16-column layout are skipped.
pub fn parse_network_totals(content: &str) -> Result<NetworkTotals, ParseError> {
    if content.lines().count() < 2 {
        return Err(ParseError::new("net dev source shorter than its header"));
    }

    let mut totals = NetworkTotals::default();

    for line in content.lines().skip(2) {
        // "eth0:" may abut the first counter, so split on the colon first.
        let Some((_, values)) = line.split_once(':') else {
            continue;
        };
        let values: Vec<&str> = values.split_whitespace().collect();
        if values.len() < 16 {
            continue;
        }

        let get = |idx: usize| -> Option<u64> { values[idx].parse().ok() };
        let (Some(rx_errs), Some(rx_drop), Some(tx_errs), Some(tx_drop)) =
            (get(2), get(3), get(10), get(11))
        else {
            continue;
        };

        totals.rx_errors += rx_errs;
        totals.rx_drops += rx_drop;
        totals.tx_errors += tx_errs;
        totals.tx_drops += tx_drop;
    }

    Ok(totals)
}

/// Parses the 1-minute load average from `/proc/loadavg` (first field).
pub fn parse_loadavg(content: &str) -> Result<f64, ParseError> {
    content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty loadavg content"))?
        .parse()
        .map_err(|_| ParseError::new("invalid load average"))
}

/// Parses the first `cpu MHz` entry from `/proc/cpuinfo`.
pub fn parse_cpu_mhz(content: &str) -> Result<f64, ParseError> {
    for line in content.lines() {
        if line.starts_with("cpu MHz") {
            let value = line
                .split_once(':')
                .map(|(_, v)| v.trim())
                .ok_or_else(|| ParseError::new("malformed cpu MHz line"))?;
            return value
                .parse()
                .map_err(|_| ParseError::new("invalid cpu MHz value"));
        }
    }
    Err(ParseError::new("cpu MHz not found"))
}

/// Parses the voluntary context switch counter from a `/proc/[pid]/status`
/// style key/value listing.
pub fn parse_voluntary_ctxt_switches(content: &str) -> Result<u64, ParseError> {
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("voluntary_ctxt_switches:") {
            return rest
                .trim()
                .parse()
                .map_err(|_| ParseError::new("invalid voluntary_ctxt_switches value"));
        }
    }
    Err(ParseError::new("voluntary_ctxt_switches not found"))
}

/// Boot-cumulative process and context-switch counters from `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessCounters {
    /// Forks since boot (`processes` line).
    pub processes: u64,
    /// Context switches since boot (`ctxt` line).
    pub context_switches: u64,
}

/// Parses the `processes` and `ctxt` counter lines of `/proc/stat`.
///
/// Both counters are required.
pub fn parse_process_counters(content: &str) -> Result<ProcessCounters, ParseError> {
    let mut processes = None;
    let mut context_switches = None;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("processes") => {
                processes = Some(
                    parts
                        .next()
                        .ok_or_else(|| ParseError::new("processes has no value"))?
                        .parse()
                        .map_err(|_| ParseError::new("invalid processes value"))?,
                );
            }
            Some("ctxt") => {
                context_switches = Some(
                    parts
                        .next()
                        .ok_or_else(|| ParseError::new("ctxt has no value"))?
                        .parse()
                        .map_err(|_| ParseError::new("invalid ctxt value"))?,
                );
            }
            _ => {}
        }
    }

    Ok(ProcessCounters {
        processes: processes.ok_or_else(|| ParseError::new("processes not found"))?,
        context_switches: context_switches.ok_or_else(|| ParseError::new("ctxt not found"))?,
    })
}

/// Parses a single-value source such as the battery capacity or thermal
/// zone files: the first whitespace-separated token as a float.
pub fn parse_scalar(content: &str) -> Result<f64, ParseError> {
    content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty scalar content"))?
        .parse()
        .map_err(|_| ParseError::new("invalid scalar value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_times() {
        let content = "cpu  10000 500 3000 80000 1000 200 100 0 0 0\ncpu0 1 2 3 4 5 6 7 8\n";
        let times = parse_cpu_times(content).unwrap();

        assert_eq!(times.user, 10000);
        assert_eq!(times.nice, 500);
        assert_eq!(times.system, 3000);
        assert_eq!(times.idle, 80000);
        assert_eq!(times.iowait, 1000);
        assert_eq!(times.irq, 200);
        assert_eq!(times.softirq, 100);
        assert_eq!(times.steal, 0);

        assert_eq!(times.idle_total(), 81000);
        assert_eq!(times.busy_total(), 13800);
        assert_eq!(times.total(), 94800);
    }

    #[test]
    fn test_parse_cpu_times_too_few_fields() {
        let content = "cpu  10000 500 3000 80000 1000\n";
        assert!(parse_cpu_times(content).is_err());
    }

    #[test]
    fn test_parse_cpu_times_wrong_prefix() {
        let content = "cpu0 10000 500 3000 80000 1000 200 100 0\n";
        assert!(parse_cpu_times(content).is_err());
        assert!(parse_cpu_times("").is_err());
    }

    #[test]
    fn test_parse_cpu_times_non_numeric() {
        let content = "cpu  10000 xyz 3000 80000 1000 200 100 0\n";
        assert!(parse_cpu_times(content).is_err());
    }

    #[test]
    fn test_cpu_times_monotonic() {
        let prev = parse_cpu_times("cpu 1 2 3 4 5 6 7 8\n").unwrap();
        let curr = parse_cpu_times("cpu 2 2 3 5 5 6 7 8\n").unwrap();
        assert!(curr.is_monotonic_from(&prev));
        assert!(!prev.is_monotonic_from(&curr));
        assert!(prev.is_monotonic_from(&prev));
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
";
        let info = parse_meminfo(content).unwrap();

        assert_eq!(info.total, 16384000);
        assert_eq!(info.free, 8192000);
        assert_eq!(info.available, 12000000);
        assert_eq!(info.used(), 8192000);
    }

    #[test]
    fn test_parse_meminfo_any_order() {
        let content = "\
MemAvailable:        600 kB
MemFree:             400 kB
SwapTotal:             0 kB
MemTotal:           1000 kB
";
        let info = parse_meminfo(content).unwrap();
        assert_eq!(info.total, 1000);
        assert_eq!(info.free, 400);
        assert_eq!(info.available, 600);
    }

    #[test]
    fn test_parse_meminfo_missing_field_fails() {
        let content = "MemTotal: 1000 kB\nMemFree: 400 kB\n";
        let err = parse_meminfo(content).unwrap_err();
        assert!(err.message.contains("MemAvailable"));
    }

    #[test]
    fn test_parse_disk_totals() {
        let content = "\
   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300 0 0 0 0
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260 0 0 0 0
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 0 0 0 0
";
        let totals = parse_disk_totals(content).unwrap();

        assert_eq!(totals.reads, 1234 + 1000 + 9999);
        assert_eq!(totals.writes, 5678 + 5000 + 8888);
        assert_eq!(totals.in_progress, 5);
    }

    #[test]
    fn test_parse_disk_totals_skips_malformed_lines() {
        let content = "\
   8       0 sda 100 0 0 0 200 0 0 0 3 0 0
garbage line
   8       1 sdb 7 not-a-number 0 0 11 0 0 0 0 0 0
   8       2 sdc 50
";
        let totals = parse_disk_totals(content).unwrap();

        // Only the first line matches the expected field pattern.
        assert_eq!(totals.reads, 100);
        assert_eq!(totals.writes, 200);
        assert_eq!(totals.in_progress, 3);
    }

    #[test]
    fn test_parse_disk_totals_empty() {
        let totals = parse_disk_totals("").unwrap();
        assert_eq!(totals, DiskTotals::default());
    }

    #[test]
    fn test_parse_network_totals() {
        let content = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
  eth0: 9876543     5678    1    2    0     0          0        10 87654321     4321    3    4    0     0       0          0
";
        let totals = parse_network_totals(content).unwrap();

        assert_eq!(totals.rx_errors, 1);
        assert_eq!(totals.rx_drops, 2);
        assert_eq!(totals.tx_errors, 3);
        assert_eq!(totals.tx_drops, 4);
    }

    #[test]
    fn test_parse_network_totals_skips_exactly_two_lines() {
        // Header rows counted positionally, not by content: an interface
        // in the first two rows is ignored.
        let content = "\
  eth9: 1 1 9 9 0 0 0 0 1 1 9 9 0 0 0 0
  eth8: 1 1 8 8 0 0 0 0 1 1 8 8 0 0 0 0
  eth0: 1 1 5 6 0 0 0 0 1 1 7 8 0 0 0 0
";
        let totals = parse_network_totals(content).unwrap();
        assert_eq!(totals.rx_errors, 5);
        assert_eq!(totals.rx_drops, 6);
        assert_eq!(totals.tx_errors, 7);
        assert_eq!(totals.tx_drops, 8);
    }

    #[test]
    fn test_parse_network_totals_short_source_fails() {
        assert!(parse_network_totals("").is_err());
        assert!(parse_network_totals("only one line\n").is_err());
    }

    #[test]
    fn test_parse_network_totals_no_interfaces() {
        let content = "header one\nheader two\n";
        let totals = parse_network_totals(content).unwrap();
        assert_eq!(totals, NetworkTotals::default());
    }

    #[test]
    fn test_parse_network_totals_colon_abuts_counter() {
        let content = "\
h1
h2
eth0:123 1 11 12 0 0 0 0 1 1 13 14 0 0 0 0
";
        let totals = parse_network_totals(content).unwrap();
        assert_eq!(totals.rx_errors, 11);
        assert_eq!(totals.rx_drops, 12);
        assert_eq!(totals.tx_errors, 13);
        assert_eq!(totals.tx_drops, 14);
    }

    #[test]
    fn test_parse_loadavg() {
        let load = parse_loadavg("0.15 0.10 0.05 1/150 1234\n").unwrap();
        assert!((load - 0.15).abs() < 0.001);

        assert!(parse_loadavg("").is_err());
        assert!(parse_loadavg("abc 0.1\n").is_err());
    }

    #[test]
    fn test_parse_cpu_mhz() {
        let content = "\
processor\t: 0
model name\t: Mock CPU
cpu MHz\t\t: 2400.000
cache size\t: 8192 KB
";
        let mhz = parse_cpu_mhz(content).unwrap();
        assert!((mhz - 2400.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_cpu_mhz_missing() {
        let content = "processor\t: 0\nmodel name\t: Mock CPU\n";
        assert!(parse_cpu_mhz(content).is_err());
    }

    #[test]
    fn test_parse_voluntary_ctxt_switches() {
        let content = "\
Name:\thostprobed
voluntary_ctxt_switches:\t500
nonvoluntary_ctxt_switches:\t50
";
        assert_eq!(parse_voluntary_ctxt_switches(content).unwrap(), 500);
    }

    #[test]
    fn test_parse_voluntary_ctxt_switches_ignores_nonvoluntary() {
        let content = "nonvoluntary_ctxt_switches:\t50\n";
        assert!(parse_voluntary_ctxt_switches(content).is_err());
    }

    #[test]
    fn test_parse_process_counters() {
        let content = "\
cpu  1 2 3 4 5 6 7 8 0 0
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
";
        let counters = parse_process_counters(content).unwrap();
        assert_eq!(counters.processes, 10000);
        assert_eq!(counters.context_switches, 500000);
    }

    #[test]
    fn test_parse_process_counters_missing_fails() {
        let content = "cpu  1 2 3 4 5 6 7 8\nctxt 500000\n";
        let err = parse_process_counters(content).unwrap_err();
        assert!(err.message.contains("processes"));
    }

    #[test]
    fn test_parse_scalar() {
        assert!((parse_scalar("87\n").unwrap() - 87.0).abs() < 0.001);
        assert!((parse_scalar("45000\n").unwrap() - 45000.0).abs() < 0.001);
        assert!((parse_scalar("-5\n").unwrap() + 5.0).abs() < 0.001);
        assert!(parse_scalar("").is_err());
        assert!(parse_scalar("n/a\n").is_err());
    }
}
