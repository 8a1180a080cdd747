//! ghostline - entry point
//!
//! Startup-time failures (missing credentials, unreachable database, bad bot
//! token) are the only fatal errors; everything after the dispatcher starts
//! is handled in place.

use ghostline::Config;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // RUST_LOG directives (including per-target ones), default info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("ghostline v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    ghostline::telegram::run(config).await
}
