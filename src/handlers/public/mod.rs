// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Liveness only. Nothing here touches the task store.
pub mod health;

pub use health::get as health_get;
