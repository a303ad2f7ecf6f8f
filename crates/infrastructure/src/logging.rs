use ferrous_arp_domain::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
/// Calling it twice is harmless; the first subscriber stays installed.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_ok() {
        tracing::info!(level = %config.level, json = config.json, "Logging initialized");
    }
}
