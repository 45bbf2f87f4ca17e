pub mod task;

pub use task::{normalize_title, FieldPatch, Task, TaskPatch, TitleError, MAX_TITLE_CHARS};
