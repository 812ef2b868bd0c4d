//! Radiolens — the analysis core of a clinical imaging dashboard.
//!
//! An uploaded medical image goes to a hosted vision model ([`vision`]); the
//! raw textual answer is persisted verbatim ([`db`]) and normalized into a
//! display-ready structure on every read ([`pipeline`]). Derivation is a
//! pure function of the stored text, so a reloaded record always renders
//! exactly like a fresh one.

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod vision;

use tracing_subscriber::EnvFilter;

/// Initialize structured logging. Call once at startup; the host
/// application owns the subscriber for its process.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Radiolens starting v{}", config::APP_VERSION);
}
