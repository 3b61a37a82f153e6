//! Auth screen: login/signup form and sign-out results.

mod render;
mod state;
mod update;

pub use render::render_auth;
pub use state::{AuthState, field_label, is_secret};
pub use update::{begin_restore, handle_event, handle_key, handle_paste, is_busy};
