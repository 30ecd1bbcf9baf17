//! This crate publishes application metrics (counters, gauges, tagged
//! measurements) onto a NATS subject so they can be aggregated out of
//! process, and can periodically self-report process health (memory and
//! thread counts).
//!
//! It is a thin instrumentation facade: it owns no storage, performs no
//! aggregation, and provides no delivery guarantees beyond what the
//! underlying publish does. There is no retry, no batching and no
//! queueing — every error is surfaced to the immediate caller, which
//! decides what to do with it.
//!
//! # Quickstart
//!
//! ```no_run
//! fn main() -> Result<(), mqmetrics::Error> {
//!     let _guard = mqmetrics::init(("nats://localhost:4222", "metrics"))?;
//!
//!     mqmetrics::send_and_wait(mqmetrics::record! {
//!         "requests" => 1u64,
//!         "latency_ms" => 42.5,
//!         "endpoint" => "/checkout",
//!     })?;
//!     Ok(())
//! }
//! ```
//!
//! Every payload is enriched with the local `hostname` and, when an
//! application name is configured, an `app` tag, then encoded as a flat
//! JSON object and published to the configured subject.
//!
//! # Disabled mode
//!
//! An empty (or unset) broker URL yields a disabled connection on which
//! every operation is a successful no-op. This is the escape hatch for
//! environments without a broker — instrumented code never has to care
//! whether metrics are actually on:
//!
//! ```
//! let connection = mqmetrics::Connection::new(("", "metrics")).unwrap();
//! assert!(!connection.is_enabled());
//! ```
//!
//! # Self-reporting
//!
//! A watch loop samples process runtime statistics (resident set size,
//! thread count, CPU times) and publishes them through the same send
//! path on a fixed interval:
//!
//! ```no_run
//! # fn main() -> Result<(), mqmetrics::Error> {
//! let _guard = mqmetrics::init(("nats://localhost:4222", "metrics"))?;
//! let watcher = mqmetrics::spawn_watch(std::time::Duration::from_secs(30))?;
//!
//! // ... the rest of the program ...
//!
//! mqmetrics::disable()?;
//! watcher.join()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Environment
//!
//! [`init`] and [`setup`] fill options that were not set explicitly from
//! the environment: `METRICS_URL`, `METRICS_SUBJECT` and
//! `APPLICATION_NAME`.
//!
//! # Features
//!
//! - `debug-logs`: route diagnostic output through the `log` crate
//!   (target `mqmetrics`) instead of printing to stderr when the `debug`
//!   option is set.

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod api;
mod connection;
mod error;
mod options;
mod record;
mod stats;
mod transport;
mod watcher;

pub mod test;

pub use crate::api::{
    default_connection, disable, flush, init, send, send_and_wait, setup, spawn_watch, watch,
    InitGuard,
};
pub use crate::connection::Connection;
pub use crate::error::Error;
pub use crate::options::{ConnectionOptions, Credentials};
pub use crate::record::{Record, Value};
pub use crate::transport::{DefaultTransportFactory, NatsTransport, Transport, TransportFactory};
pub use crate::watcher::WatchHandle;
