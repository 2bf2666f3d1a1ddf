use sea_orm::DatabaseConnection;

use crate::{
    auth::jwt::JwtKeys,
    config::DemoConfig,
    db::dao::DaoContext,
    services::{
        auth_service::AuthService, demo_service::DemoService, recipe_service::RecipeService,
        user_service::UserService,
    },
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user())
    }

    pub fn recipe(&self) -> RecipeService {
        RecipeService::new(self.daos.recipe())
    }

    pub fn demo(&self, config: &DemoConfig) -> DemoService {
        DemoService::new(self.user(), self.recipe(), config.clone())
    }

    pub fn auth<'a>(&self, jwt: &'a JwtKeys, access_ttl_secs: usize) -> AuthService<'a> {
        AuthService::new(self.user(), jwt, access_ttl_secs)
    }
}
