pub mod account;
pub mod auth;
pub mod recipes;
mod router;

pub use router::router;
