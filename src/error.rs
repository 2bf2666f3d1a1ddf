use crate::{
    db::dao::DaoLayerError,
    domain::{ActionParseError, Denial},
};

const DB_FAILURE_MESSAGE: &str = "database operation failed. Please check the logs for more details";

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Internal(message) => message.as_str(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(err.to_string()),
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::Db(db_err) => {
                tracing::error!(error = %db_err, "database operation failed");
                AppError::internal(DB_FAILURE_MESSAGE)
            }
        }
    }
}

/// Hard denials only; handlers turn a quota denial into a redirect first.
impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => AppError::unauthorized(denial.to_string()),
            Denial::Forbidden { .. } => AppError::forbidden(denial.to_string()),
            Denial::NotVisible => AppError::not_found(denial.to_string()),
            Denial::QuotaExceeded { message } => AppError::forbidden(message),
            Denial::Misconfigured { .. } => AppError::internal(denial.to_string()),
        }
    }
}

impl From<ActionParseError> for AppError {
    fn from(err: ActionParseError) -> Self {
        AppError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;
    use uuid::Uuid;

    use super::AppError;
    use crate::{
        db::dao::DaoLayerError,
        domain::{Action, Denial},
    };

    #[test]
    fn denials_map_to_distinct_statuses() {
        assert!(matches!(
            AppError::from(Denial::Unauthenticated),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(Denial::Forbidden {
                action: Action::Modify
            }),
            AppError::Forbidden(message) if message == "You do not have permission to modify this recipe"
        ));
        assert!(matches!(
            AppError::from(Denial::NotVisible),
            AppError::NotFound(message) if message == "Recipe not found"
        ));
    }

    #[test]
    fn database_errors_hide_details() {
        let err = AppError::from(DaoLayerError::Db(DbErr::Custom("secret".to_string())));
        assert!(matches!(err, AppError::Internal(_)));
        assert!(!err.message().contains("secret"));
    }

    #[test]
    fn missing_rows_become_not_found() {
        let err = AppError::from(DaoLayerError::NotFound {
            entity: "recipe",
            id: Uuid::nil(),
        });
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
