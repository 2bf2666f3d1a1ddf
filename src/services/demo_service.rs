use std::time::Duration;

use tokio::{task::JoinHandle, time::Instant};

use crate::{
    auth::password::hash_password,
    config::DemoConfig,
    error::AppError,
    services::{recipe_service::RecipeService, user_service::UserService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoProvision {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoWipe {
    Cleared { recipes: u64 },
    MissingUser,
}

impl DemoProvision {
    pub fn message(&self) -> &'static str {
        match self {
            DemoProvision::Created => "Demo user created.",
            DemoProvision::AlreadyExists => "Demo user already exists.",
        }
    }
}

impl DemoWipe {
    pub fn message(&self) -> String {
        match self {
            DemoWipe::Cleared { recipes } => format!("Deleted {recipes} demo recipe(s)."),
            DemoWipe::MissingUser => "Demo user does not exist.".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct DemoService {
    users: UserService,
    recipes: RecipeService,
    config: DemoConfig,
}

impl DemoService {
    pub fn new(users: UserService, recipes: RecipeService, config: DemoConfig) -> Self {
        Self {
            users,
            recipes,
            config,
        }
    }

    /// Creates the demo account unless it is already there.
    pub async fn ensure_demo_user(&self) -> Result<DemoProvision, AppError> {
        if self
            .users
            .find_by_username(&self.config.username)
            .await?
            .is_some()
        {
            return Ok(DemoProvision::AlreadyExists);
        }

        let password_hash = hash_password(&self.config.password)?;
        self.users
            .create_user(&self.config.username, &password_hash)
            .await?;
        tracing::info!(username = %self.config.username, "demo user created");
        Ok(DemoProvision::Created)
    }

    /// Deletes every recipe of the demo account; the account stays.
    pub async fn clear_demo_data(&self) -> Result<DemoWipe, AppError> {
        let Some(user) = self.users.find_by_username(&self.config.username).await? else {
            tracing::warn!(username = %self.config.username, "demo user does not exist");
            return Ok(DemoWipe::MissingUser);
        };

        let recipes = self.recipes.delete_owned_by(&user.id).await?;
        tracing::info!(username = %user.username, recipes, "demo data cleared");
        Ok(DemoWipe::Cleared { recipes })
    }

    /// Runs `clear_demo_data` every `reset_interval_hours`; `None` when the
    /// interval is 0.
    pub fn spawn_reset_scheduler(self) -> Option<JoinHandle<()>> {
        let hours = self.config.reset_interval_hours;
        if hours == 0 {
            return None;
        }

        let period = Duration::from_secs(hours.saturating_mul(3600));
        tracing::info!(every_hours = hours, "demo reset scheduler started");
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if let Err(err) = self.clear_demo_data().await {
                    tracing::error!(error = %err, "scheduled demo reset failed");
                }
            }
        }))
    }
}
