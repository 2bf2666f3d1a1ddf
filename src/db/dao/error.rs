use std::fmt;

use sea_orm::DbErr;
use uuid::Uuid;

#[derive(Debug)]
pub enum DaoLayerError {
    Db(DbErr),
    NotFound { entity: &'static str, id: Uuid },
    InvalidPagination { page: u64, page_size: u64 },
}

pub type DaoResult<T> = Result<T, DaoLayerError>;

impl DaoLayerError {
    pub fn not_found<E>(id: Uuid) -> Self {
        DaoLayerError::NotFound {
            entity: entity_name::<E>(),
            id,
        }
    }
}

/// `recipy_server::db::entities::step::Entity` -> `step`
fn entity_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").nth(1).unwrap_or(full)
}

impl From<DbErr> for DaoLayerError {
    fn from(err: DbErr) -> Self {
        DaoLayerError::Db(err)
    }
}

impl fmt::Display for DaoLayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoLayerError::Db(err) => write!(f, "Database error: {err}"),
            DaoLayerError::NotFound { entity, id } => {
                write!(f, "{entity} not found (id={id})")
            }
            DaoLayerError::InvalidPagination { page, page_size } => {
                write!(f, "Invalid pagination: page={page} page_size={page_size}")
            }
        }
    }
}

impl std::error::Error for DaoLayerError {}
