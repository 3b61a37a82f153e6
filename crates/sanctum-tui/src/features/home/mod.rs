//! Home screen: profile header and data tabs for the signed-in user.

mod render;
mod state;
mod update;

pub use render::render_home;
pub use state::{HomeState, HomeTab, Status, TabContent, TabRows};
pub use update::{enter, handle_event, handle_key};
