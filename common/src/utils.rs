// common/src/utils.rs
use tracing_subscriber::EnvFilter;

/// Setup tracing for consistent logging; honours RUST_LOG, defaults to info
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore the error when a subscriber is already installed (tests, embedding)
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }
}
