//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` and `/sys` contents for
//! testing the collectors against various host conditions.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a typical idle-ish workstation with all metric sources present.
    pub fn typical_system() -> Self {
        let fs = Self::new();

        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 12345678 0 0 0 0
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
Dirty:              1024 kB
Slab:             512000 kB
",
        );

        fs.add_file("/proc/loadavg", "0.15 0.10 0.05 1/150 1234\n");

        fs.add_file(
            "/proc/cpuinfo",
            "\
processor\t: 0
vendor_id\t: GenuineIntel
model name\t: Mock CPU @ 2.40GHz
cpu MHz\t\t: 2400.000
cache size\t: 8192 KB

processor\t: 1
vendor_id\t: GenuineIntel
model name\t: Mock CPU @ 2.40GHz
cpu MHz\t\t: 2400.000
cache size\t: 8192 KB
",
        );

        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300 0 0 0 0
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260 0 0 0 0
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 0 0 0 0
",
        );

        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
  eth0: 9876543     5678    1    2    0     0          0        10 87654321     4321    3    4    0     0       0          0
",
        );

        fs.add_file(
            "/proc/self/status",
            "\
Name:\thostprobed
Pid:\t4242
PPid:\t1
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
voluntary_ctxt_switches:\t500
nonvoluntary_ctxt_switches:\t50
",
        );

        fs.add_file("/sys/class/power_supply/BAT0/capacity", "87\n");
        fs.add_file("/sys/class/thermal/thermal_zone0/temp", "45000\n");

        fs
    }

    /// A typical system whose battery source is absent (desktop hardware).
    pub fn desktop_without_battery() -> Self {
        let fs = Self::typical_system();
        fs.remove_file("/sys/class/power_supply/BAT0/capacity");
        fs
    }

    /// Replaces the aggregate CPU line with counters advanced beyond
    /// `typical_system`, producing a non-zero delta on the next pass.
    ///
    /// Deltas: busy +500, idle +1600, total +2100.
    pub fn advance_cpu(&self) {
        self.add_file(
            "/proc/stat",
            "\
cpu  10400 500 3100 81500 1100 200 100 0 0 0
cpu0 2600 125 775 20375 275 50 25 0 0 0
ctxt 501000
btime 1700000000
processes 10050
procs_running 3
procs_blocked 0
",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::FileSystem;
    use std::path::Path;

    #[test]
    fn test_typical_system_has_all_sources() {
        let fs = MockFs::typical_system();
        for path in [
            "/proc/stat",
            "/proc/meminfo",
            "/proc/loadavg",
            "/proc/cpuinfo",
            "/proc/diskstats",
            "/proc/net/dev",
            "/proc/self/status",
            "/sys/class/power_supply/BAT0/capacity",
            "/sys/class/thermal/thermal_zone0/temp",
        ] {
            assert!(
                fs.read_to_string(Path::new(path)).is_ok(),
                "missing {}",
                path
            );
        }
    }

    #[test]
    fn test_desktop_without_battery() {
        let fs = MockFs::desktop_without_battery();
        assert!(
            fs.read_to_string(Path::new("/sys/class/power_supply/BAT0/capacity"))
                .is_err()
        );
        assert!(fs.read_to_string(Path::new("/proc/stat")).is_ok());
    }
}
