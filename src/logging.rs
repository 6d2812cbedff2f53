use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log target of this crate
const TARGET: &str = "frameless_chrome";

fn default_directive(quiet: bool) -> String {
    let level = if quiet { "error" } else { "info" };
    format!("{TARGET}={level}")
}

/// Filter from `RUST_LOG` when it is set and valid, otherwise the crate
/// default for `quiet`.
fn build_filter(quiet: bool, rust_log: Option<&str>) -> EnvFilter {
    let from_env = rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok());

    from_env.unwrap_or_else(|| EnvFilter::new(default_directive(quiet)))
}

/// Initialize logging with optional quiet mode.
///
/// When `quiet` is true, only error-level events are emitted.
/// A set `RUST_LOG` replaces the default directives entirely.
pub fn init_logging(quiet: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(quiet, rust_log.as_deref());

    // A subscriber installed earlier (e.g. by an embedding host) wins
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
