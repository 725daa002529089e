use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Install the global subscriber. `RUST_LOG` picks the filter;
/// `RUST_LOG_MODE=json` switches the human-readable output to JSON lines
/// for log shippers.
pub fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()
        .unwrap();

    let fmt = tracing_subscriber::fmt::layer().with_thread_names(true);

    if std::env::var("RUST_LOG_MODE").is_ok_and(|mode| mode == "json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt.json().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt.pretty()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}
