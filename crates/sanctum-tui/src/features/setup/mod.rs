//! Setup screen: first-run connection ritual.

mod render;
mod update;

pub use render::render_setup;
pub use update::{handle_event, handle_key};
