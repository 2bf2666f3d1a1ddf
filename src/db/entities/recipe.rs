use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

use crate::domain::{RecipeAccess, recipe_duration_display};

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub duration_minutes: Option<i32>,
    pub image: Option<String>,
    #[sea_orm(default_value = false)]
    pub is_public: bool,
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(has_many)]
    pub steps: HasMany<super::step::Entity>,
    #[sea_orm(has_many)]
    pub ingredients: HasMany<super::ingredient::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn access(&self) -> RecipeAccess {
        RecipeAccess {
            owner_id: self.user_id,
            is_public: self.is_public,
        }
    }

    /// Own duration if set, otherwise the rollup of `steps`.
    pub fn duration_display(&self, steps: &[super::step::Model]) -> String {
        recipe_duration_display(
            minutes(self.duration_minutes),
            steps.iter().map(|step| minutes(step.duration_minutes)),
        )
    }
}

/// Stored durations are validated non-negative on the way in.
pub(crate) fn minutes(value: Option<i32>) -> Option<u64> {
    value.and_then(|minutes| u64::try_from(minutes).ok())
}
