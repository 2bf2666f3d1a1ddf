use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a caller wants to do with a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    /// Update or delete.
    Modify,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Modify => "modify",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported recipe action '{0}'; expected one of: read, modify")]
pub struct ActionParseError(pub String);

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Action::Read),
            "modify" => Ok(Action::Modify),
            other => Err(ActionParseError(other.to_string())),
        }
    }
}

/// The authenticated caller as seen by the policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
}

/// Only the recipe attributes the access policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeAccess {
    pub owner_id: Uuid,
    pub is_public: bool,
}

impl RecipeAccess {
    pub fn is_owned_by(&self, user: &Principal) -> bool {
        self.owner_id == user.user_id
    }
}

pub fn can_access(user: Option<&Principal>, recipe: RecipeAccess, action: Action) -> bool {
    let Some(user) = user else {
        return false;
    };

    match action {
        Action::Read => recipe.is_owned_by(user) || recipe.is_public,
        Action::Modify => recipe.is_owned_by(user),
    }
}
