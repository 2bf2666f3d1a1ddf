use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    db::dao::{
        DaoLayerError, IngredientFields, RecipeDao, RecipeDraft, RecipeGraph, StepFields,
    },
    db::entities::{ingredient, recipe, step},
    domain::Principal,
    error::AppError,
    services::forms::ValidationError,
};

/// A recipe as shown in lists: no children, just the rolled-up duration.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeOverview {
    pub recipe: recipe::Model,
    pub duration_display: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipeListing {
    pub user_recipes: Vec<RecipeOverview>,
    /// Public recipes of other users.
    pub public_recipes: Vec<RecipeOverview>,
}

#[derive(Clone)]
pub struct RecipeService {
    recipe_dao: RecipeDao,
}

impl RecipeService {
    pub fn new(recipe_dao: RecipeDao) -> Self {
        Self { recipe_dao }
    }

    pub async fn list_for(&self, user: &Principal) -> Result<RecipeListing, AppError> {
        let recipes = self.recipe_dao.list_visible(&user.user_id).await?;
        let ids: Vec<Uuid> = recipes.iter().map(|recipe| recipe.id).collect();
        let mut steps_by_recipe: HashMap<Uuid, Vec<step::Model>> = HashMap::new();
        for step in self.recipe_dao.steps_for(&ids).await? {
            steps_by_recipe.entry(step.recipe_id).or_default().push(step);
        }

        let mut listing = RecipeListing::default();
        for recipe in recipes {
            let steps = steps_by_recipe.remove(&recipe.id).unwrap_or_default();
            let overview = RecipeOverview {
                duration_display: recipe.duration_display(&steps),
                recipe,
            };
            if overview.recipe.user_id == user.user_id {
                listing.user_recipes.push(overview);
            } else {
                listing.public_recipes.push(overview);
            }
        }
        Ok(listing)
    }

    /// Missing recipes read the same as hidden ones.
    pub async fn load(&self, id: &Uuid) -> Result<RecipeGraph, AppError> {
        match self.recipe_dao.find_graph(id).await {
            Ok(graph) => Ok(graph),
            Err(DaoLayerError::NotFound { .. }) => Err(AppError::not_found("Recipe not found")),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn count_by_owner(&self, user_id: &Uuid) -> Result<u64, AppError> {
        Ok(self.recipe_dao.count_by_owner(user_id).await?)
    }

    pub async fn create(&self, owner: &Principal, draft: RecipeDraft) -> Result<RecipeGraph, AppError> {
        let graph = self.recipe_dao.insert_graph(&owner.user_id, draft).await?;
        tracing::info!(
            recipe_id = %graph.recipe.id,
            owner = %owner.username,
            steps = graph.steps.len(),
            ingredients = graph.ingredients.len(),
            "created recipe"
        );
        Ok(graph)
    }

    /// Nested ids are checked against the loaded children before the
    /// transaction opens.
    pub async fn update(&self, existing: RecipeGraph, draft: RecipeDraft) -> Result<RecipeGraph, AppError> {
        ensure_known_children(&existing, &draft)?;
        let graph = self.recipe_dao.save_graph(existing, draft).await?;
        tracing::info!(recipe_id = %graph.recipe.id, "updated recipe");
        Ok(graph)
    }

    pub async fn add_step(&self, recipe: &recipe::Model, fields: StepFields) -> Result<step::Model, AppError> {
        Ok(self.recipe_dao.add_step(&recipe.id, fields).await?)
    }

    pub async fn add_ingredient(
        &self,
        recipe: &recipe::Model,
        fields: IngredientFields,
    ) -> Result<ingredient::Model, AppError> {
        Ok(self.recipe_dao.add_ingredient(&recipe.id, fields).await?)
    }

    pub async fn delete(&self, recipe: &recipe::Model) -> Result<Uuid, AppError> {
        let id = self.recipe_dao.delete_graph(&recipe.id).await?;
        tracing::info!(recipe_id = %id, "deleted recipe");
        Ok(id)
    }

    pub async fn delete_owned_by(&self, user_id: &Uuid) -> Result<u64, AppError> {
        Ok(self.recipe_dao.delete_by_owner(user_id).await?)
    }
}

fn ensure_known_children(existing: &RecipeGraph, draft: &RecipeDraft) -> Result<(), ValidationError> {
    for (index, step) in draft.steps.iter().enumerate() {
        if let Some(id) = step.id {
            if !existing.steps.iter().any(|known| known.id == id) {
                return Err(ValidationError::UnknownChild {
                    field: format!("steps[{index}].id"),
                    entity: "step",
                    id,
                });
            }
        }
    }
    for (index, ingredient) in draft.ingredients.iter().enumerate() {
        if let Some(id) = ingredient.id {
            if !existing.ingredients.iter().any(|known| known.id == id) {
                return Err(ValidationError::UnknownChild {
                    field: format!("ingredients[{index}].id"),
                    entity: "ingredient",
                    id,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::*;
    use crate::{
        db::dao::RecipeFields,
        services::ServiceContext,
        test_helpers::fixtures::{principal, recipe_model, step_model},
    };

    fn draft_with_step(id: Option<Uuid>) -> RecipeDraft {
        RecipeDraft {
            recipe: RecipeFields {
                title: "Soup".to_string(),
                description: String::new(),
                duration_minutes: None,
                image: None,
                is_public: false,
            },
            steps: vec![StepFields {
                id,
                name: "Boil".to_string(),
                description: String::new(),
                duration_minutes: None,
            }],
            ingredients: Vec::new(),
        }
    }

    #[tokio::test]
    async fn listing_splits_own_and_public_and_rolls_up_durations() {
        let me = principal("cook");
        let other = principal("chef");
        let mine = recipe_model(Uuid::new_v4(), me.user_id, "Mine", false);
        let theirs = recipe_model(Uuid::new_v4(), other.user_id, "Theirs", true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[mine.clone(), theirs.clone()]])
            .append_query_results([[
                step_model(Uuid::new_v4(), mine.id, "Prep", Some(50)),
                step_model(Uuid::new_v4(), mine.id, "Cook", Some(40)),
                step_model(Uuid::new_v4(), theirs.id, "Rest", None),
            ]])
            .into_connection();
        let service = ServiceContext::new(&db).recipe();

        let listing = service.list_for(&me).await.expect("listing should load");

        assert_eq!(listing.user_recipes.len(), 1);
        assert_eq!(listing.user_recipes[0].recipe.id, mine.id);
        assert_eq!(listing.user_recipes[0].duration_display, "1h 30min");
        assert_eq!(listing.public_recipes.len(), 1);
        assert_eq!(listing.public_recipes[0].recipe.id, theirs.id);
        // Only step has no duration.
        assert_eq!(listing.public_recipes[0].duration_display, "");
    }

    #[tokio::test]
    async fn listing_with_no_recipes_skips_step_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<recipe::Model>::new()])
            .into_connection();
        let service = ServiceContext::new(&db).recipe();

        let listing = service.list_for(&principal("cook")).await.unwrap();
        assert_eq!(listing, RecipeListing::default());
    }

    #[tokio::test]
    async fn load_hides_missing_recipes_behind_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<recipe::Model>::new()])
            .into_connection();
        let service = ServiceContext::new(&db).recipe();

        let err = service.load(&Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(message) if message == "Recipe not found"));
    }

    #[tokio::test]
    async fn update_with_foreign_child_id_touches_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = ServiceContext::new(&db).recipe();
        let owner = principal("cook");
        let existing = RecipeGraph {
            recipe: recipe_model(Uuid::new_v4(), owner.user_id, "Soup", false),
            steps: Vec::new(),
            ingredients: Vec::new(),
        };

        let err = service
            .update(existing, draft_with_step(Some(Uuid::new_v4())))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(message) if message.starts_with("steps[0].id refers to an unknown step")));
        assert!(db.into_transaction_log().is_empty());
    }
}
