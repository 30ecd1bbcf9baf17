//! The transport layer used to publish encoded records.

use std::fmt;
use std::sync::Arc;

use crate::{ConnectionOptions, Credentials, Error};

/// A transport publishes encoded records to a broker subject.
///
/// The default implementation is [`NatsTransport`]; tests swap in a
/// [`TestTransport`](crate::test::TestTransport) through a custom
/// factory. Implementations must tolerate concurrent `publish` calls.
pub trait Transport: Send + Sync + 'static {
    /// Publishes one payload to the given subject.
    fn publish(&self, subject: &str, payload: &[u8]) -> Result<(), Error>;

    /// Flushes buffered payloads down to the broker.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Closes the underlying broker connection.
    ///
    /// Called at most once, when the connection is disabled.
    fn shutdown(&self) {}
}

/// Creates a [`Transport`] from connection options.
///
/// Factories exist so the transport can be swapped without changing the
/// construction path: closures returning a transport and
/// `Arc<impl Transport>` both implement this trait directly.
pub trait TransportFactory: Send + Sync {
    /// Creates a transport for the given options.
    fn create_transport(&self, options: &ConnectionOptions) -> Result<Arc<dyn Transport>, Error>;
}

impl<F> TransportFactory for F
where
    F: Fn(&ConnectionOptions) -> Result<Arc<dyn Transport>, Error> + Send + Sync,
{
    fn create_transport(&self, options: &ConnectionOptions) -> Result<Arc<dyn Transport>, Error> {
        self(options)
    }
}

impl<T: Transport> TransportFactory for Arc<T> {
    fn create_transport(&self, _options: &ConnectionOptions) -> Result<Arc<dyn Transport>, Error> {
        Ok(self.clone())
    }
}

/// The default factory, connecting a [`NatsTransport`].
#[derive(Debug, Default)]
pub struct DefaultTransportFactory;

impl TransportFactory for DefaultTransportFactory {
    fn create_transport(&self, options: &ConnectionOptions) -> Result<Arc<dyn Transport>, Error> {
        Ok(Arc::new(NatsTransport::connect(options)?))
    }
}

/// Publishes records over a blocking NATS connection.
///
/// The NATS client is internally synchronized, so a single transport is
/// shared by all concurrent senders of a connection.
pub struct NatsTransport {
    conn: nats::Connection,
}

impl NatsTransport {
    /// Connects to the broker named by the options.
    ///
    /// Credentials and the connection name are passed through; any
    /// connection-level failure is returned verbatim as
    /// [`Error::Connect`].
    pub fn connect(options: &ConnectionOptions) -> Result<NatsTransport, Error> {
        let url = options
            .url
            .as_deref()
            .ok_or_else(|| Error::Config("cannot connect without a broker url".into()))?;

        let nats_options = match &options.credentials {
            Some(Credentials::UserPass { user, pass }) => nats::Options::with_user_pass(user, pass),
            Some(Credentials::Token(token)) => nats::Options::with_token(token),
            None => nats::Options::new(),
        };
        let nats_options = match &options.name {
            Some(name) => nats_options.with_name(name),
            None => nats_options,
        };

        let conn = nats_options.connect(url).map_err(Error::Connect)?;
        Ok(NatsTransport { conn })
    }
}

impl Transport for NatsTransport {
    fn publish(&self, subject: &str, payload: &[u8]) -> Result<(), Error> {
        self.conn.publish(subject, payload).map_err(Error::Publish)
    }

    fn flush(&self) -> Result<(), Error> {
        self.conn.flush().map_err(Error::Publish)
    }

    fn shutdown(&self) {
        self.conn.clone().close();
    }
}

impl fmt::Debug for NatsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NatsTransport").finish_non_exhaustive()
    }
}
