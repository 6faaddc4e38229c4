use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize JSON logging on stderr, keeping stdout for command output.
///
/// When `quiet` is true, only error-level events are emitted.
pub fn init_logging(quiet: bool) {
    let directive = if quiet { "fuelbol=error" } else { "fuelbol=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive(directive.parse().expect("Invalid log directive")),
        )
        .init();
}
