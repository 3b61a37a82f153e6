//! Default command: the full-screen interface.

use anyhow::Result;
use sanctum_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(config: Config) -> Result<()> {
    sanctum_tui::run(config).await
}

#[cfg(not(feature = "tui"))]
pub async fn run(_config: Config) -> Result<()> {
    anyhow::bail!("This build has no terminal interface; rebuild with the `tui` feature.")
}
