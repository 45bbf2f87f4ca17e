pub mod manager;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{Task, TaskPatch};
pub use repository::PgTaskStore;
pub use store::{StoreError, TaskStore};
