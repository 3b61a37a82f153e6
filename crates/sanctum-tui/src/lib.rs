//! Full-screen TUI for Sanctum.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
pub use features::{auth, home, setup};
pub use runtime::TuiRuntime;
use sanctum_core::config::Config;

/// Runs the TUI until the user quits.
///
/// Effect handlers are spawned on the ambient multi-threaded tokio runtime.
///
/// # Errors
/// Returns an error when stderr is not a terminal or the terminal fails.
pub async fn run(config: Config) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The sanctum interface requires a terminal.\n\
             Use `sanctum probe`, `sanctum status` or `sanctum entities list` for scripted use."
        );
    }

    let mut runtime = TuiRuntime::new(config)?;
    runtime.run()
}
