use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static LOG_INIT: Once = Once::new();

/// Default filter used when neither `RUST_LOG` nor an explicit value is given.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global tracing subscriber, once per process.
///
/// `RUST_LOG` wins when it is set; otherwise `default_value` is used,
/// falling back to [`DEFAULT_LOG_FILTER`].
/// Subsequent calls are no-ops, so tests may call this freely.
pub fn log_init(default_value: Option<&str>) {
    LOG_INIT.call_once(|| {
        if std::env::var("RUST_BACKTRACE").is_err() {
            unsafe {
                std::env::set_var("RUST_BACKTRACE", "1");
            }
        }

        if std::env::var("RUST_LOG").is_err() {
            unsafe {
                std::env::set_var("RUST_LOG", default_value.unwrap_or(DEFAULT_LOG_FILTER));
            }
        }

        tracing_setup();
    });
}

fn tracing_setup() {
    let format = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .compact();

    // a second subscriber may already be installed by a test harness
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(format)
        .try_init();
}
