pub mod api;
mod entry;
pub mod middleware;

pub use entry::{API_PREFIX, router};
pub use middleware::{AuthGuard, CurrentUser, catch_panic_layer, json_error_middleware};
