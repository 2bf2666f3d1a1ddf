use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Measure {
    #[sea_orm(string_value = "KG")]
    Kg,
    #[sea_orm(string_value = "LITER")]
    Liter,
    #[sea_orm(string_value = "TABLESPOON")]
    Tablespoon,
    #[sea_orm(string_value = "TEASPOON")]
    Teaspoon,
    #[sea_orm(string_value = "PIECE")]
    Piece,
    #[sea_orm(string_value = "TO_TASTE")]
    ToTaste,
}

// f64 quantity rules out Eq.
#[base_entity(parent = "recipe_id")]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    pub name: String,
    pub quantity: Option<f64>,
    pub measure: Option<Measure>,
    #[sea_orm(indexed)]
    pub recipe_id: Uuid,
    #[sea_orm(belongs_to, from = "recipe_id", to = "id", on_delete = "Cascade")]
    pub recipe: HasOne<super::recipe::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
