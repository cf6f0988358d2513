//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the level chosen from `verbose`. Calling this more
/// than once is harmless; only the first call installs a subscriber.
pub fn init(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| {
            fmt::layer()
                .with_target(verbose)
                .without_time()
                .with_writer(std::io::stderr)
        }))
        .try_init();

    if installed.is_err() {
        tracing::debug!("Subscriber already installed");
    }
}
