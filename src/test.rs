//! Support for testing instrumented code without a broker.
//!
//! [`TestTransport`] collects published payloads in memory instead of
//! sending them anywhere; [`with_captured_records`] runs a closure
//! against a connection backed by one and returns what was published.
//!
//! # Examples
//!
//! ```
//! use mqmetrics::test::with_captured_records;
//!
//! let records = with_captured_records(|connection| {
//!     connection
//!         .send_and_wait(mqmetrics::record! { "counter" => 1u64 })
//!         .unwrap();
//! });
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].subject, "metrics");
//! assert!(records[0].decode().contains_key("hostname"));
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use crate::transport::Transport;
use crate::{Connection, ConnectionOptions, Error};

/// One payload captured by a [`TestTransport`].
#[derive(Clone, Debug)]
pub struct Published {
    /// The subject the payload was published to.
    pub subject: String,
    /// The raw encoded payload.
    pub payload: Vec<u8>,
}

impl Published {
    /// Decodes the payload back into a JSON object.
    ///
    /// # Panics
    ///
    /// Panics when the payload is not a JSON object; captured payloads
    /// always are.
    pub fn decode(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::from_slice(&self.payload).expect("captured payload is not a JSON object")
    }
}

/// Collects published payloads instead of sending them to a broker.
pub struct TestTransport {
    collected: Mutex<Vec<Published>>,
}

impl TestTransport {
    /// Creates a new test transport.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Arc<TestTransport> {
        Arc::new(TestTransport {
            collected: Mutex::new(Vec::new()),
        })
    }

    /// Fetches and clears the captured payloads.
    pub fn fetch_and_clear(&self) -> Vec<Published> {
        std::mem::take(
            &mut *self
                .collected
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Number of payloads captured so far.
    pub fn publish_count(&self) -> usize {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Transport for TestTransport {
    fn publish(&self, subject: &str, payload: &[u8]) -> Result<(), Error> {
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Published {
                subject: subject.to_owned(),
                payload: payload.to_owned(),
            });
        Ok(())
    }
}

/// Options for an enabled connection that captures records through the
/// given [`TestTransport`] instead of publishing them.
///
/// The subject is `metrics`.
pub fn captured_options(transport: Arc<TestTransport>) -> ConnectionOptions {
    let mut options = ConnectionOptions::new("nats://broker.invalid:4222", "metrics");
    options.transport = Some(Arc::new(transport));
    options
}

/// Runs a closure against a connection backed by a [`TestTransport`]
/// and returns the captured payloads.
pub fn with_captured_records<F: FnOnce(&Connection)>(f: F) -> Vec<Published> {
    let transport = TestTransport::new();
    let connection =
        Connection::new(captured_options(transport.clone())).expect("failed to build connection");
    f(&connection);
    transport.fetch_and_clear()
}
