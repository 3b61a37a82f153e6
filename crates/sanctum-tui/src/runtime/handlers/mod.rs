//! Effect handlers for the TUI runtime.
//!
//! Handlers perform I/O and return the `UiEvent` describing the result. They
//! never touch `AppState`; the runtime spawns them and forwards the result.

mod auth;
mod home;
mod setup;

pub use auth::*;
pub use home::*;
pub use setup::*;

/// Message shown for a failed request.
fn describe(err: &anyhow::Error) -> String {
    format!("{err:#}")
}
