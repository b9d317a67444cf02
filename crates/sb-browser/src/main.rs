//! SimpleBrowser - Main Entry Point

use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| sb_browser::DEMO_URL.to_string());

    tracing::info!(%url, "loading");

    let text = sb_browser::load(&url).with_context(|| format!("failed to load {url}"))?;
    print!("{text}");

    Ok(())
}
