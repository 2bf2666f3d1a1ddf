pub mod auth_service;
pub mod context;
pub mod demo_service;
pub mod forms;
pub mod recipe_service;
pub mod user_service;

pub use context::ServiceContext;
