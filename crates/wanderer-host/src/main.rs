//! wanderer: harmonic note transformer host

mod app;
mod config;
mod demo;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("wanderer=debug".parse()?))
        .init();

    tracing::info!("Starting Wanderer");

    let path = config::config_path();
    let config = config::load_config(&path)?;
    tracing::info!(path = %path.display(), "Config loaded");

    app::run(config, path)
}
