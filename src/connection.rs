//! The metrics connection and its send path.

use std::fmt;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock, RwLockReadGuard};
use std::thread;
use std::time::Duration;

use crate::transport::{DefaultTransportFactory, Transport, TransportFactory};
use crate::{ConnectionOptions, Error, Record};

/// A handle to a metrics connection.
///
/// `Connection` is cheap to clone; clones share the same underlying
/// state, so disabling through one handle is observed by all of them.
/// All operations are safe to call from multiple threads concurrently.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> Result<(), mqmetrics::Error> {
/// let connection = mqmetrics::Connection::new(("nats://localhost:4222", "metrics"))?;
/// connection.send_and_wait(mqmetrics::record! { "counter" => 1u64 })?;
/// connection.disable();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    state: RwLock<State>,
    // Wakes a watcher out of its interval sleep on disable.
    shutdown: (Mutex<bool>, Condvar),
    debug: bool,
}

struct State {
    enabled: bool,
    subject: String,
    hostname: String,
    application: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl Connection {
    /// Creates a new connection from the given options.
    ///
    /// Options without a broker URL yield a disabled connection on which
    /// every operation is a successful no-op. An enabled connection
    /// requires a non-empty subject, a resolvable local hostname and a
    /// reachable broker; each failure is returned as the corresponding
    /// [`Error`] variant.
    pub fn new<O: Into<ConnectionOptions>>(options: O) -> Result<Connection, Error> {
        let options = options.into();

        if options.url.is_none() {
            debug_log!(options.debug, "no broker url set, metrics are disabled");
            return Ok(Connection::disabled_with(options.debug));
        }

        if options.subject.is_empty() {
            return Err(Error::Config("subject cannot be empty".into()));
        }

        let hostname = hostname::get()
            .map_err(Error::Hostname)?
            .to_string_lossy()
            .into_owned();

        let factory: Arc<dyn TransportFactory> = options
            .transport
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultTransportFactory));
        let transport = factory.create_transport(&options)?;
        debug_log!(
            options.debug,
            "publishing metrics from {} to subject {:?}",
            hostname,
            options.subject
        );

        Ok(Connection {
            inner: Arc::new(ConnectionInner {
                state: RwLock::new(State {
                    enabled: true,
                    subject: options.subject,
                    hostname,
                    application: options.application,
                    transport: Some(transport),
                }),
                shutdown: (Mutex::new(false), Condvar::new()),
                debug: options.debug,
            }),
        })
    }

    /// Creates a disabled connection on which every operation is a
    /// successful no-op.
    pub fn disabled() -> Connection {
        Connection::disabled_with(false)
    }

    fn disabled_with(debug: bool) -> Connection {
        Connection {
            inner: Arc::new(ConnectionInner {
                state: RwLock::new(State {
                    enabled: false,
                    subject: String::new(),
                    hostname: String::new(),
                    application: None,
                    transport: None,
                }),
                shutdown: (Mutex::new(false), Condvar::new()),
                debug,
            }),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Quick check whether this connection will publish anything.
    pub fn is_enabled(&self) -> bool {
        self.read_state().enabled
    }

    /// Publishes a record without blocking the caller.
    ///
    /// The returned channel eventually carries the single result the
    /// equivalent [`send_and_wait`](Connection::send_and_wait) call
    /// would have produced. Dropping the receiver discards the result
    /// without affecting the publish.
    pub fn send(&self, record: Record) -> Receiver<Result<(), Error>> {
        let (tx, rx) = mpsc::sync_channel(1);
        let connection = self.clone();
        thread::spawn(move || {
            let _ = tx.send(connection.send_and_wait(record));
        });
        rx
    }

    /// Publishes a record, blocking until the transport accepted it.
    ///
    /// On a disabled connection, or for an empty record, this returns
    /// `Ok(())` without touching the transport. Otherwise the record is
    /// enriched with `hostname` (and `app` when an application name is
    /// configured), encoded as a flat JSON object, and published to the
    /// configured subject. Encoding and publish failures propagate; no
    /// retry is attempted.
    pub fn send_and_wait(&self, record: Record) -> Result<(), Error> {
        let (transport, subject, payload) = {
            let state = self.read_state();
            if !state.enabled || record.is_empty() {
                return Ok(());
            }
            let transport = match state.transport.clone() {
                Some(transport) => transport,
                None => return Ok(()),
            };

            let mut record = record;
            record.insert("hostname", state.hostname.as_str());
            if let Some(application) = state.application.as_deref() {
                record.insert("app", application);
            }

            (transport, state.subject.clone(), serde_json::to_vec(&record)?)
        };

        // The read section above only snapshots fields; the publish runs
        // outside the lock so it cannot stall disable().
        transport.publish(&subject, &payload)
    }

    /// Flushes buffered records down to the broker.
    ///
    /// No-op on a disabled connection.
    pub fn flush(&self) -> Result<(), Error> {
        let transport = self.read_state().transport.clone();
        match transport {
            Some(transport) => transport.flush(),
            None => Ok(()),
        }
    }

    /// Disables the connection and closes the underlying transport.
    ///
    /// Afterwards every send is a successful no-op, and a running watch
    /// loop wakes up and terminates without waiting out its interval.
    /// A publish that was already in flight is not interrupted. Calling
    /// `disable` again has no effect.
    pub fn disable(&self) {
        let transport = {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            state.enabled = false;
            state.transport.take()
        };
        if let Some(transport) = transport {
            debug_log!(self.inner.debug, "metrics disabled, closing transport");
            transport.shutdown();
        }

        let (stopped, condvar) = &self.inner.shutdown;
        *stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub(crate) fn debug(&self) -> bool {
        self.inner.debug
    }

    /// Sleeps for one watch interval, waking early when the connection
    /// is disabled. Returns `true` once the connection has been
    /// disabled.
    pub(crate) fn wait_for_disable(&self, interval: Duration) -> bool {
        let (stopped, condvar) = &self.inner.shutdown;
        let guard = stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = condvar
            .wait_timeout_while(guard, interval, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("Connection")
            .field("enabled", &state.enabled)
            .field("subject", &state.subject)
            .field("hostname", &state.hostname)
            .field("application", &state.application)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_constructor() {
        let connection = Connection::disabled();
        assert!(!connection.is_enabled());
        assert!(connection.send_and_wait(crate::record! { "counter" => 1u64 }).is_ok());
        connection.disable();
        connection.disable();
    }

    #[test]
    fn test_wait_for_disable_returns_immediately_when_disabled() {
        let connection = Connection::disabled();
        connection.disable();
        assert!(connection.wait_for_disable(Duration::from_secs(60)));
    }
}
