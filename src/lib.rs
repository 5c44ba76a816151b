pub mod admission;
pub mod config;
pub mod db;
pub mod interview;
pub mod lookup;
pub mod models;
pub mod queue;

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for the kiosk shell.
///
/// Call once at process start. Respects `RUST_LOG` when set.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} core starting v{}", config::APP_NAME, config::APP_VERSION);
}
