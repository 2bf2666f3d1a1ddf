pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod recipe_dao;
pub mod user_dao;

pub use base::{DaoBase, DaoPager, PaginatedResponse};
pub use base_traits::{
    HasCreatedAtColumn, HasIdActiveModel, HasParentColumn, TimestampedActiveModel,
};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use recipe_dao::{
    IngredientFields, RecipeDao, RecipeDraft, RecipeFields, RecipeGraph, StepFields,
};
pub use user_dao::UserDao;
