use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

use crate::domain::step_duration_display;

#[base_entity(parent = "recipe_id")]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "steps")]
pub struct Model {
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub duration_minutes: Option<i32>,
    #[sea_orm(indexed)]
    pub recipe_id: Uuid,
    #[sea_orm(belongs_to, from = "recipe_id", to = "id", on_delete = "Cascade")]
    pub recipe: HasOne<super::recipe::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn duration_display(&self) -> String {
        step_duration_display(super::recipe::minutes(self.duration_minutes))
    }
}
