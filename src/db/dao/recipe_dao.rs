use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use super::base::{children_of, delete_children_of, insert_stamped, update_stamped};
use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::{
    ingredient::{self, Measure},
    prelude::{Ingredient, Recipe, Step},
    recipe, step,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeFields {
    pub title: String,
    pub description: String,
    pub duration_minutes: Option<i32>,
    pub image: Option<String>,
    pub is_public: bool,
}

/// `id` set means "update this existing step", unset means "create".
#[derive(Debug, Clone, PartialEq)]
pub struct StepFields {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientFields {
    pub id: Option<Uuid>,
    pub name: String,
    pub quantity: Option<f64>,
    pub measure: Option<Measure>,
}

/// Validated input for a recipe together with its nested rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub recipe: RecipeFields,
    pub steps: Vec<StepFields>,
    pub ingredients: Vec<IngredientFields>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeGraph {
    pub recipe: recipe::Model,
    pub steps: Vec<step::Model>,
    pub ingredients: Vec<ingredient::Model>,
}

#[derive(Clone)]
pub struct RecipeDao {
    db: DatabaseConnection,
}

impl DaoBase for RecipeDao {
    type Entity = Recipe;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RecipeDao {
    pub async fn find_graph(&self, id: &Uuid) -> DaoResult<RecipeGraph> {
        let recipe = self.find_by_id(*id).await?;
        let steps = children_of::<Step, _>(&self.db, &[recipe.id]).await?;
        let ingredients = children_of::<Ingredient, _>(&self.db, &[recipe.id]).await?;
        Ok(RecipeGraph {
            recipe,
            steps,
            ingredients,
        })
    }

    /// Recipes owned by `user_id` plus every public recipe, newest first.
    pub async fn list_visible(&self, user_id: &Uuid) -> DaoResult<Vec<recipe::Model>> {
        let user_id = *user_id;
        self.find_iter(None, None, move |query| {
            query.filter(
                Condition::any()
                    .add(recipe::Column::UserId.eq(user_id))
                    .add(recipe::Column::IsPublic.eq(true)),
            )
        })
        .collect_all()
        .await
    }

    pub async fn steps_for(&self, recipe_ids: &[Uuid]) -> DaoResult<Vec<step::Model>> {
        children_of::<Step, _>(&self.db, recipe_ids).await
    }

    pub async fn count_by_owner(&self, user_id: &Uuid) -> DaoResult<u64> {
        Ok(Recipe::find()
            .filter(recipe::Column::UserId.eq(*user_id))
            .count(&self.db)
            .await?)
    }

    /// Inserts the recipe and its nested rows in one transaction.
    pub async fn insert_graph(&self, owner_id: &Uuid, draft: RecipeDraft) -> DaoResult<RecipeGraph> {
        let txn = self.db.begin().await?;

        let mut active = recipe::ActiveModel {
            user_id: Set(*owner_id),
            ..Default::default()
        };
        apply_recipe_fields(&mut active, draft.recipe);
        let recipe = insert_stamped(&txn, active).await?;

        let mut steps = Vec::with_capacity(draft.steps.len());
        for fields in draft.steps {
            steps.push(insert_stamped(&txn, new_step(recipe.id, fields)).await?);
        }
        let mut ingredients = Vec::with_capacity(draft.ingredients.len());
        for fields in draft.ingredients {
            ingredients.push(insert_stamped(&txn, new_ingredient(recipe.id, fields)).await?);
        }

        txn.commit().await?;
        Ok(RecipeGraph {
            recipe,
            steps,
            ingredients,
        })
    }

    /// Applies `draft` on top of `existing` in one transaction.
    ///
    /// Nested rows with an id must already belong to the recipe. Children
    /// absent from the draft are left untouched.
    pub async fn save_graph(&self, existing: RecipeGraph, draft: RecipeDraft) -> DaoResult<RecipeGraph> {
        let RecipeGraph {
            recipe,
            mut steps,
            mut ingredients,
        } = existing;
        let txn = self.db.begin().await?;

        let mut active = recipe.into_active_model();
        apply_recipe_fields(&mut active, draft.recipe);
        let recipe = update_stamped(&txn, active).await?;

        for fields in draft.steps {
            let Some(id) = fields.id else {
                steps.push(insert_stamped(&txn, new_step(recipe.id, fields)).await?);
                continue;
            };
            let slot = steps
                .iter_mut()
                .find(|step| step.id == id)
                .ok_or_else(|| DaoLayerError::not_found::<Step>(id))?;
            let mut active = slot.clone().into_active_model();
            active.name = Set(fields.name);
            active.description = Set(fields.description);
            active.duration_minutes = Set(fields.duration_minutes);
            *slot = update_stamped(&txn, active).await?;
        }

        for fields in draft.ingredients {
            let Some(id) = fields.id else {
                ingredients.push(insert_stamped(&txn, new_ingredient(recipe.id, fields)).await?);
                continue;
            };
            let slot = ingredients
                .iter_mut()
                .find(|ingredient| ingredient.id == id)
                .ok_or_else(|| DaoLayerError::not_found::<Ingredient>(id))?;
            let mut active = slot.clone().into_active_model();
            active.name = Set(fields.name);
            active.quantity = Set(fields.quantity);
            active.measure = Set(fields.measure);
            *slot = update_stamped(&txn, active).await?;
        }

        txn.commit().await?;
        Ok(RecipeGraph {
            recipe,
            steps,
            ingredients,
        })
    }

    pub async fn add_step(&self, recipe_id: &Uuid, fields: StepFields) -> DaoResult<step::Model> {
        insert_stamped(&self.db, new_step(*recipe_id, fields)).await
    }

    pub async fn add_ingredient(
        &self,
        recipe_id: &Uuid,
        fields: IngredientFields,
    ) -> DaoResult<ingredient::Model> {
        insert_stamped(&self.db, new_ingredient(*recipe_id, fields)).await
    }

    /// Deletes the recipe after its steps and ingredients, atomically.
    pub async fn delete_graph(&self, id: &Uuid) -> DaoResult<Uuid> {
        let txn = self.db.begin().await?;
        delete_children_of::<Step, _>(&txn, &[*id]).await?;
        delete_children_of::<Ingredient, _>(&txn, &[*id]).await?;
        let result = Recipe::delete_by_id(*id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(DaoLayerError::not_found::<Recipe>(*id));
        }
        txn.commit().await?;
        Ok(*id)
    }

    /// Deletes every recipe owned by `user_id`; returns how many went.
    pub async fn delete_by_owner(&self, user_id: &Uuid) -> DaoResult<u64> {
        let txn = self.db.begin().await?;
        let ids: Vec<Uuid> = Recipe::find()
            .filter(recipe::Column::UserId.eq(*user_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|recipe| recipe.id)
            .collect();
        if ids.is_empty() {
            txn.commit().await?;
            return Ok(0);
        }

        delete_children_of::<Step, _>(&txn, &ids).await?;
        delete_children_of::<Ingredient, _>(&txn, &ids).await?;
        let result = Recipe::delete_many()
            .filter(recipe::Column::Id.is_in(ids))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(result.rows_affected)
    }
}

fn apply_recipe_fields(active: &mut recipe::ActiveModel, fields: RecipeFields) {
    active.title = Set(fields.title);
    active.description = Set(fields.description);
    active.duration_minutes = Set(fields.duration_minutes);
    active.image = Set(fields.image);
    active.is_public = Set(fields.is_public);
}

fn new_step(recipe_id: Uuid, fields: StepFields) -> step::ActiveModel {
    step::ActiveModel {
        recipe_id: Set(recipe_id),
        name: Set(fields.name),
        description: Set(fields.description),
        duration_minutes: Set(fields.duration_minutes),
        ..Default::default()
    }
}

fn new_ingredient(recipe_id: Uuid, fields: IngredientFields) -> ingredient::ActiveModel {
    ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        name: Set(fields.name),
        quantity: Set(fields.quantity),
        measure: Set(fields.measure),
        ..Default::default()
    }
}
