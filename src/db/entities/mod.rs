#[allow(unused_imports)]
pub mod prelude {
    pub use super::ingredient::Entity as Ingredient;
    pub use super::recipe::Entity as Recipe;
    pub use super::step::Entity as Step;
    pub use super::user::Entity as User;
}

pub mod ingredient;
pub mod recipe;
pub mod step;
pub mod user;
