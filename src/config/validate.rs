use anyhow::{Result, bail};

use super::AppConfig;
use crate::auth::password::MIN_PASSWORD_LEN;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if cfg.auth.jwt_secret.trim().is_empty() {
        errors.push("auth.jwt_secret must not be empty".to_string());
    }

    if cfg.auth.access_ttl_secs == 0 {
        errors.push("auth.access_ttl_secs must be > 0".to_string());
    }

    if cfg.demo.username.trim().is_empty() {
        errors.push("demo.username must not be empty".to_string());
    }

    if cfg.demo.password.len() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "demo.password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }

    if cfg.demo.recipe_limit == 0 {
        errors.push("demo.recipe_limit must be > 0".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
