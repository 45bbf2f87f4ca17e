pub mod collection;
pub mod record;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::get as tasks_get;
pub use collection::post as tasks_post;

pub use record::delete as task_delete;
pub use record::put as task_put;
