use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{domain::Principal, error::AppError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::unauthorized("Invalid token subject"))
    }

    pub fn principal(&self) -> Result<Principal, AppError> {
        Ok(Principal {
            user_id: self.user_id()?,
            username: self.username.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: usize,
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::Claims;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            username: "cook".to_string(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn principal_carries_id_and_username() {
        let id = Uuid::new_v4();
        let principal = claims(&id.to_string()).principal().unwrap();
        assert_eq!(principal.user_id, id);
        assert_eq!(principal.username, "cook");
    }

    #[test]
    fn malformed_subject_is_unauthorized() {
        let err = claims("not-a-uuid").principal().unwrap_err();
        assert_eq!(err.message(), "Invalid token subject");
    }
}
