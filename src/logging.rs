use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Initialize a tracing subscriber for an embedding application.
///
/// `RUST_LOG` takes precedence over the configured level. Safe to call more
/// than once; only the first call installs a subscriber.
pub fn init_tracing(settings: &LoggingSettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true);

    let installed = if settings.format == "pretty" {
        subscriber.pretty().try_init().is_ok()
    } else {
        subscriber.compact().try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %settings.level, format = %settings.format, "Tracing initialized");
    }
}
