//! ODDPub open-science analysis service, batch ingest and migration checks

pub mod api;
pub mod app;
pub mod db;
pub mod envfile;
pub mod model;
pub mod oddpub;
pub mod service;

/// Initialize tracing with `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
