use sea_orm::{EntityTrait, entity::prelude::DateTimeWithTimeZone};

pub trait HasCreatedAtColumn: EntityTrait {
    fn created_at_column() -> Self::Column;
    /// Tie-breaker for rows sharing a timestamp, so offset pages stay stable.
    fn id_column() -> Self::Column;
}

/// Child tables that hang off a recipe.
pub trait HasParentColumn: EntityTrait {
    fn parent_column() -> Self::Column;
}

pub trait HasIdActiveModel {
    fn set_id(&mut self, id: uuid::Uuid);
}

pub trait TimestampedActiveModel {
    fn set_created_at(&mut self, ts: DateTimeWithTimeZone);
    fn set_updated_at(&mut self, ts: DateTimeWithTimeZone);
}
