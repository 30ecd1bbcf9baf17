use std::io;

use thiserror::Error;

/// Errors surfaced by connection construction and the send path.
///
/// There is no internal recovery: every error is returned to the
/// immediate caller. Sends on a disabled connection are successful
/// no-ops, not errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid construction input, e.g. an empty subject on an enabled
    /// connection.
    #[error("configuration error: {0}")]
    Config(String),

    /// The local hostname could not be resolved.
    #[error("failed to resolve local hostname")]
    Hostname(#[source] io::Error),

    /// The broker could not be reached or rejected the connection.
    #[error("failed to connect to broker")]
    Connect(#[source] io::Error),

    /// A record could not be encoded for the wire.
    #[error("failed to encode record")]
    Encode(#[from] serde_json::Error),

    /// The transport failed to publish or flush.
    #[error("failed to publish record")]
    Publish(#[source] io::Error),

    /// A free function was used before [`setup`](crate::setup) or
    /// [`init`](crate::init) bound a default connection.
    #[error("no default connection bound; call setup or init first")]
    NotInitialized,
}
