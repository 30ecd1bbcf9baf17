//! Connection configuration.

use std::env;
use std::fmt;
use std::sync::Arc;

use crate::transport::TransportFactory;

/// Credentials passed through to the broker connection.
#[derive(Clone)]
pub enum Credentials {
    /// Username/password authentication.
    UserPass {
        /// The username.
        user: String,
        /// The password.
        pass: String,
    },
    /// Token authentication.
    Token(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::UserPass { user, .. } => f
                .debug_struct("UserPass")
                .field("user", user)
                .finish_non_exhaustive(),
            Credentials::Token(_) => f.write_str("Token(..)"),
        }
    }
}

/// Configuration for a [`Connection`](crate::Connection).
///
/// The usual construction paths are [`ConnectionOptions::new`] or the
/// `(url, subject)` tuple conversions accepted by
/// [`Connection::new`](crate::Connection::new), [`init`](crate::init)
/// and [`setup`](crate::setup):
///
/// ```
/// let options = mqmetrics::ConnectionOptions {
///     application: Some("billing".into()),
///     ..mqmetrics::ConnectionOptions::new("nats://localhost:4222", "metrics")
/// };
/// ```
#[derive(Clone)]
pub struct ConnectionOptions {
    /// Broker URL, e.g. `nats://localhost:4222`.
    ///
    /// `None` disables the connection entirely; every operation on a
    /// disabled connection is a successful no-op.
    pub url: Option<String>,
    /// Subject all records are published to.
    ///
    /// Must be non-empty on an enabled connection.
    pub subject: String,
    /// Application name, injected into every payload as the `app` tag.
    pub application: Option<String>,
    /// Connection name reported to the broker.
    pub name: Option<String>,
    /// Broker credentials.
    pub credentials: Option<Credentials>,
    /// Print diagnostics to stderr (or the `mqmetrics` log target with
    /// the `debug-logs` feature).
    pub debug: bool,
    /// The transport factory. Defaults to the NATS transport.
    pub transport: Option<Arc<dyn TransportFactory>>,
}

impl ConnectionOptions {
    /// Creates options for the given broker URL and subject.
    ///
    /// An empty URL is the "metrics are off" sentinel and yields a
    /// disabled connection.
    pub fn new(url: &str, subject: &str) -> ConnectionOptions {
        ConnectionOptions {
            url: if url.is_empty() {
                None
            } else {
                Some(url.to_owned())
            },
            subject: subject.to_owned(),
            ..Default::default()
        }
    }
}

impl Default for ConnectionOptions {
    fn default() -> ConnectionOptions {
        ConnectionOptions {
            url: None,
            subject: String::new(),
            application: None,
            name: None,
            credentials: None,
            debug: false,
            transport: None,
        }
    }
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[derive(Debug)]
        struct TransportFactory;
        let transport = self.transport.as_ref().map(|_| TransportFactory);

        f.debug_struct("ConnectionOptions")
            .field("url", &self.url)
            .field("subject", &self.subject)
            .field("application", &self.application)
            .field("name", &self.name)
            .field("credentials", &self.credentials)
            .field("debug", &self.debug)
            .field("transport", &transport)
            .finish()
    }
}

impl From<(&str, &str)> for ConnectionOptions {
    fn from((url, subject): (&str, &str)) -> ConnectionOptions {
        ConnectionOptions::new(url, subject)
    }
}

impl From<(String, String)> for ConnectionOptions {
    fn from((url, subject): (String, String)) -> ConnectionOptions {
        ConnectionOptions::new(&url, &subject)
    }
}

impl From<()> for ConnectionOptions {
    fn from(_: ()) -> ConnectionOptions {
        ConnectionOptions::default()
    }
}

/// Fills options that were not set explicitly from the environment.
///
/// Used by `init`/`setup` only; `Connection::new` takes its options
/// verbatim.
pub(crate) fn apply_defaults(mut options: ConnectionOptions) -> ConnectionOptions {
    if options.url.is_none() {
        options.url = env::var("METRICS_URL").ok().filter(|url| !url.is_empty());
    }
    if options.subject.is_empty() {
        if let Ok(subject) = env::var("METRICS_SUBJECT") {
            options.subject = subject;
        }
    }
    if options.application.is_none() {
        options.application = env::var("APPLICATION_NAME")
            .ok()
            .filter(|app| !app.is_empty());
    }
    options
}
