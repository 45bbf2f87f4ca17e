// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here receives the verified `CallerIdentity` as an explicit
// `Extension` argument and passes it to the store on every call. The routes
// are only reachable through `jwt_auth_middleware`.
pub mod tasks;

pub use tasks::*;
