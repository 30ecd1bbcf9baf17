//! Periodic self-reporting of process runtime statistics.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::stats::Sampler;
use crate::{Connection, Error};

impl Connection {
    /// Repeatedly samples process runtime statistics and publishes them,
    /// once per `interval`, until the connection is disabled.
    ///
    /// This blocks the calling thread for the lifetime of the loop: run
    /// it on a dedicated thread (or use
    /// [`spawn_watch`](Connection::spawn_watch)) and stop it via
    /// [`disable`](Connection::disable). Disabling wakes the loop out of
    /// its sleep, so shutdown does not wait out a full interval; an
    /// already in-flight publish is not interrupted.
    ///
    /// A publish error terminates the loop and is returned to the
    /// caller.
    pub fn watch(&self, interval: Duration) -> Result<(), Error> {
        let sampler = Sampler::new();
        loop {
            if !self.is_enabled() {
                debug_log!(self.debug(), "connection disabled, stopping watch loop");
                return Ok(());
            }
            self.send_and_wait(sampler.sample())?;
            if self.wait_for_disable(interval) {
                return Ok(());
            }
        }
    }

    /// Runs [`watch`](Connection::watch) on a dedicated background
    /// thread named `mqmetrics-watcher`.
    pub fn spawn_watch(&self, interval: Duration) -> WatchHandle {
        let connection = self.clone();
        let handle = thread::Builder::new()
            .name("mqmetrics-watcher".into())
            .spawn(move || connection.watch(interval))
            .expect("failed to spawn mqmetrics-watcher thread");
        WatchHandle { handle }
    }
}

/// Handle to a spawned watch loop.
///
/// Dropping the handle detaches the loop; it still terminates once the
/// connection is disabled.
#[derive(Debug)]
pub struct WatchHandle {
    handle: JoinHandle<Result<(), Error>>,
}

impl WatchHandle {
    /// Waits for the loop to terminate and returns its result.
    pub fn join(self) -> Result<(), Error> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Whether the loop has already terminated.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
