use mqmetrics::test::{captured_options, TestTransport};
use mqmetrics::record;

// Runs as its own binary so it owns the process-wide default connection.
#[test]
fn test_init_guard_disables_on_drop() {
    let transport = TestTransport::new();
    let guard = mqmetrics::init(captured_options(transport.clone())).unwrap();
    assert!(guard.is_enabled());
    assert!(guard.connection().is_enabled());

    mqmetrics::send_and_wait(record! { "counter" => 1u64 }).unwrap();
    assert_eq!(transport.publish_count(), 1);

    drop(guard);

    // The connection stays bound but is disabled: sends become no-ops.
    let connection = mqmetrics::default_connection().unwrap();
    assert!(!connection.is_enabled());
    mqmetrics::send_and_wait(record! { "counter" => 2u64 }).unwrap();
    assert_eq!(transport.publish_count(), 1);
}
