pub mod render_utils;
pub mod task;
pub mod text;

pub use task::{TaskCompleted, TaskId, TaskKind, TaskSeq, TaskStarted, TaskState, Tasks};
pub use text::{mask, sanitize_for_display, truncate_with_ellipsis};
