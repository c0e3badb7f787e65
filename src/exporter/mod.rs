//! Metric publication, HTTP serving, and the periodic update loop.
//!
//! Two long-lived tasks share the published metric state: the sampling
//! loop (`scheduler`) writes freshly collected values, and the HTTP
//! serving thread (`http`) renders them for scrape clients. Both go
//! through `MetricPublisher`, whose single coarse mutex guarantees a
//! scrape never observes a partially updated multi-gauge family.

pub mod http;
mod metrics;
pub mod scheduler;

pub use http::MetricsServer;
pub use metrics::MetricPublisher;
pub use scheduler::Scheduler;
