/// Builds a [`Record`](crate::Record) from key/value literals.
///
/// Values can be any type convertible into a
/// [`Value`](crate::Value): integers, floats and strings.
///
/// # Examples
///
/// ```
/// let record = mqmetrics::record! {
///     "counter" => 1000u64,
///     "gauge" => 1.5,
///     "tag" => "checkout",
/// };
/// assert_eq!(record.len(), 3);
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(
            record.insert($key, $value);
        )+
        record
    }};
}

// Internal diagnostics. Written to stderr when the connection was
// configured with `debug`, or routed through the `log` crate under the
// `debug-logs` feature.
macro_rules! debug_log {
    ($debug:expr, $($arg:tt)*) => {{
        #[cfg(feature = "debug-logs")]
        {
            let _ = $debug;
            log::debug!(target: "mqmetrics", $($arg)*);
        }
        #[cfg(not(feature = "debug-logs"))]
        {
            if $debug {
                eprintln!("[mqmetrics] {}", format_args!($($arg)*));
            }
        }
    }};
}
