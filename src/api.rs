//! The process-wide default connection and its convenience layer.

use std::sync::mpsc::Receiver;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use lazy_static::lazy_static;

use crate::options::apply_defaults;
use crate::watcher::WatchHandle;
use crate::{Connection, ConnectionOptions, Error, Record};

lazy_static! {
    static ref DEFAULT_CONNECTION: RwLock<Option<Connection>> = RwLock::new(None);
}

/// Guard returned from [`init`].
///
/// Dropping the guard disables the connection it bound, closing the
/// transport; keep it alive for the lifetime of the program.
#[must_use = "when the init guard is dropped the connection is disabled and no further records can be sent"]
pub struct InitGuard(Connection);

impl InitGuard {
    /// Quick check whether the bound connection will publish anything.
    pub fn is_enabled(&self) -> bool {
        self.0.is_enabled()
    }

    /// The connection this guard is keeping alive.
    pub fn connection(&self) -> &Connection {
        &self.0
    }
}

impl Drop for InitGuard {
    fn drop(&mut self) {
        self.0.disable();
    }
}

/// Constructs a connection and binds it as the process-wide default.
///
/// Options that were not set explicitly are filled from the
/// environment: `METRICS_URL`, `METRICS_SUBJECT` and `APPLICATION_NAME`.
/// An empty or missing URL yields a disabled connection, the explicit
/// "metrics are off" escape hatch for environments without a broker.
///
/// Rebinding disables the previously bound connection.
///
/// # Examples
///
/// ```no_run
/// fn main() -> Result<(), mqmetrics::Error> {
///     let _guard = mqmetrics::init(("nats://localhost:4222", "metrics"))?;
///     mqmetrics::send_and_wait(mqmetrics::record! { "counter" => 1u64 })?;
///     Ok(())
/// }
/// ```
pub fn init<O: Into<ConnectionOptions>>(options: O) -> Result<InitGuard, Error> {
    let connection = Connection::new(apply_defaults(options.into()))?;
    bind(connection.clone());
    Ok(InitGuard(connection))
}

/// Constructs a connection and binds it as the process-wide default,
/// without a guard.
///
/// Like [`init`], but the connection stays bound until the next
/// `setup`/`init` call or an explicit [`disable`]. Prefer [`init`] when
/// a composition root can own the guard.
pub fn setup<O: Into<ConnectionOptions>>(options: O) -> Result<(), Error> {
    let connection = Connection::new(apply_defaults(options.into()))?;
    bind(connection);
    Ok(())
}

fn bind(connection: Connection) {
    let previous = {
        let mut slot = DEFAULT_CONNECTION
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        slot.replace(connection)
    };
    if let Some(previous) = previous {
        previous.disable();
    }
}

/// The currently bound default connection, if any.
pub fn default_connection() -> Option<Connection> {
    DEFAULT_CONNECTION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Publishes a record through the default connection without blocking.
///
/// See [`Connection::send`]. Fails with [`Error::NotInitialized`] when
/// no default connection is bound.
pub fn send(record: Record) -> Result<Receiver<Result<(), Error>>, Error> {
    match default_connection() {
        Some(connection) => Ok(connection.send(record)),
        None => Err(Error::NotInitialized),
    }
}

/// Publishes a record through the default connection, blocking until
/// the transport accepted it.
///
/// See [`Connection::send_and_wait`]. Fails with
/// [`Error::NotInitialized`] when no default connection is bound.
pub fn send_and_wait(record: Record) -> Result<(), Error> {
    match default_connection() {
        Some(connection) => connection.send_and_wait(record),
        None => Err(Error::NotInitialized),
    }
}

/// Disables the default connection.
///
/// The connection stays bound, so later sends are successful no-ops
/// rather than [`Error::NotInitialized`] failures.
pub fn disable() -> Result<(), Error> {
    match default_connection() {
        Some(connection) => {
            connection.disable();
            Ok(())
        }
        None => Err(Error::NotInitialized),
    }
}

/// Flushes the default connection's buffered records to the broker.
pub fn flush() -> Result<(), Error> {
    match default_connection() {
        Some(connection) => connection.flush(),
        None => Err(Error::NotInitialized),
    }
}

/// Runs the watch loop on the default connection, blocking the calling
/// thread until the connection is disabled.
///
/// See [`Connection::watch`].
pub fn watch(interval: Duration) -> Result<(), Error> {
    match default_connection() {
        Some(connection) => connection.watch(interval),
        None => Err(Error::NotInitialized),
    }
}

/// Spawns the watch loop on the default connection.
///
/// See [`Connection::spawn_watch`].
pub fn spawn_watch(interval: Duration) -> Result<WatchHandle, Error> {
    match default_connection() {
        Some(connection) => Ok(connection.spawn_watch(interval)),
        None => Err(Error::NotInitialized),
    }
}
