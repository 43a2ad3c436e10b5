//! Tracing setup
//!
//! `RUST_LOG` takes precedence; otherwise our crates log at debug and
//! everything else at info.

use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const CRATE_DIRECTIVES: [&str; 3] = [
    "mcpconform_core=debug",
    "mcpconform_transport=debug",
    "tests=debug",
];

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        CRATE_DIRECTIVES
            .iter()
            .filter_map(|d| d.parse::<Directive>().ok())
            .fold(EnvFilter::new("info"), EnvFilter::add_directive)
    })
}

/// Install the console subscriber for a binary.
///
/// Loads `.env` first so `RUST_LOG` can come from there.
pub fn init_logging() {
    dotenvy::dotenv().ok();

    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer)
        .init();
}

/// Install a subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call wins.
pub fn init_test_logging() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_test_writer().with_target(true))
        .try_init();
}
