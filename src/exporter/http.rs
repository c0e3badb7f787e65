//! HTTP serving of the metric registry to scrape clients.
//!
//! A single long-lived thread answers scrapes synchronously; rendering
//! happens under the publisher lock, so a response body is always a
//! consistent snapshot. A scrape never fails because of a reader error;
//! it returns whatever was last successfully published.

use crate::exporter::metrics::MetricPublisher;
use std::io;
use std::sync::Arc;
use std::thread;
use tiny_http::{Header, Method, Response, Server};
use tracing::{debug, error};

/// Content type of the Prometheus text exposition format.
const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// A bound, not-yet-serving metrics endpoint.
///
/// Binding is separated from serving so a bind failure surfaces as a
/// startup error in the caller, before any thread is spawned.
pub struct MetricsServer {
    server: Server,
}

impl MetricsServer {
    /// Binds the endpoint on `0.0.0.0:<port>`. Port 0 picks a free port.
    pub fn bind(port: u16) -> io::Result<Self> {
        let server = Server::http(("0.0.0.0", port)).map_err(io::Error::other)?;
        Ok(Self { server })
    }

    /// The port actually bound (relevant when binding port 0).
    pub fn local_port(&self) -> u16 {
        self.server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(0)
    }

    /// Starts the serving thread. Runs until process exit.
    pub fn spawn(self, publisher: Arc<MetricPublisher>) -> thread::JoinHandle<()> {
        thread::spawn(move || serve(self.server, publisher))
    }
}

fn serve(server: Server, publisher: Arc<MetricPublisher>) {
    for request in server.incoming_requests() {
        let outcome = match (request.method(), request.url()) {
            (Method::Get, "/" | "/metrics") => match publisher.render() {
                Ok(body) => {
                    let response = Response::from_data(body);
                    let response = match Header::from_bytes(
                        &b"Content-Type"[..],
                        METRICS_CONTENT_TYPE.as_bytes(),
                    ) {
                        Ok(header) => response.with_header(header),
                        Err(()) => response,
                    };
                    request.respond(response)
                }
                Err(e) => {
                    error!("Failed to render metrics: {}", e);
                    request.respond(Response::empty(500))
                }
            },
            (Method::Get, _) => request.respond(Response::empty(404)),
            _ => request.respond(Response::empty(405)),
        };

        if let Err(e) = outcome {
            debug!("Failed to respond to scrape: {}", e);
        }
    }
}
