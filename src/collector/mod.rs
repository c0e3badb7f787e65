//! Metric sample collection from kernel pseudo-files.
//!
//! This module provides the readers that turn `/proc` and `/sys` text into
//! typed numeric samples, with support for mocking so the parsers and the
//! delta-based CPU usage computation can be tested without a Linux host.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    SystemCollector                        │
//! │  - <proc>/stat, meminfo, diskstats, net/dev, loadavg,     │
//! │    cpuinfo, self/status                                   │
//! │  - <sys>/class/power_supply/BAT0/capacity                 │
//! │  - <sys>/class/thermal/thermal_zone0/temp                 │
//! │  - previous CPU-times sample (delta baseline)             │
//! │                     ┌──────▼──────┐                       │
//! │                     │  FileSystem │ (trait)               │
//! │                     └──────┬──────┘                       │
//! └────────────────────────────┼──────────────────────────────┘
//!                              │
//!                    ┌─────────┴─────────┐
//!             ┌──────▼──────┐     ┌──────▼──────┐
//!             │   RealFs    │     │   MockFs    │
//!             │ (Linux)     │     │ (Testing)   │
//!             └─────────────┘     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use hostprobe::collector::{MockFs, SystemCollector};
//!
//! let fs = MockFs::typical_system();
//! let collector = SystemCollector::new(fs, "/proc", "/sys");
//! let mem = collector.collect_memory().unwrap();
//! assert!(mem.total >= mem.free);
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{
    CollectError, CpuTimes, DiskTotals, MemoryInfo, NetworkTotals, ProcessCounters,
    SystemCollector,
};
pub use traits::{FileSystem, RealFs};
