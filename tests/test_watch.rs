use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use mqmetrics::test::{captured_options, TestTransport};
use mqmetrics::{Connection, ConnectionOptions, Error, Transport};

fn captured_connection() -> (Connection, Arc<TestTransport>) {
    let transport = TestTransport::new();
    let connection = Connection::new(captured_options(transport.clone())).unwrap();
    (connection, transport)
}

#[test]
fn test_watch_publishes_statistics_until_disabled() {
    let (connection, transport) = captured_connection();

    let watcher = connection.spawn_watch(Duration::from_millis(20));
    thread::sleep(Duration::from_millis(200));
    connection.disable();
    watcher.join().unwrap();

    let records = transport.fetch_and_clear();
    assert!(
        records.len() >= 5,
        "expected at least 5 samples, got {}",
        records.len()
    );
    for published in &records {
        assert_eq!(published.subject, "metrics");
        let payload = published.decode();
        assert!(payload.contains_key("uptime_ms"));
        assert!(payload.contains_key("hostname"));
    }

    // no further samples after disable
    thread::sleep(Duration::from_millis(60));
    assert_eq!(transport.publish_count(), 0);
}

#[test]
fn test_disable_wakes_a_sleeping_watcher() {
    let (connection, transport) = captured_connection();

    let watcher = connection.spawn_watch(Duration::from_secs(60));
    while transport.publish_count() == 0 {
        thread::sleep(Duration::from_millis(5));
    }

    let started = Instant::now();
    connection.disable();
    watcher.join().unwrap();
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "watcher slept through disable"
    );
}

#[test]
fn test_watch_on_a_disabled_connection_returns_immediately() {
    let connection = Connection::new(("", "metrics")).unwrap();
    connection.watch(Duration::from_secs(60)).unwrap();
}

#[test]
fn test_watch_surfaces_publish_errors() {
    struct FailingTransport;

    impl Transport for FailingTransport {
        fn publish(&self, _subject: &str, _payload: &[u8]) -> Result<(), Error> {
            Err(Error::Publish(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "connection dropped",
            )))
        }
    }

    let mut options = ConnectionOptions::new("nats://broker.invalid:4222", "metrics");
    options.transport = Some(Arc::new(Arc::new(FailingTransport)));
    let connection = Connection::new(options).unwrap();

    let err = connection.watch(Duration::from_millis(10)).unwrap_err();
    assert!(matches!(err, Error::Publish(_)));
}
