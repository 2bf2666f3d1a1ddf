use std::path::Path;

use ::config::{
    Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{defaults, validate};

/// Prefix of the environment variables, e.g. `APP_DEMO__RECIPE_LIMIT`.
pub const ENV_PREFIX: &str = "APP";
/// Names an optional TOML file that the environment is layered over.
pub const CONFIG_FILE_VAR: &str = "RECIPY_CONFIG";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub demo: DemoConfig,
}

impl AppConfig {
    /// Reads `.env`, then the `RECIPY_CONFIG` file if set, then `APP_*`
    /// variables. Later sources win; the result is validated.
    pub fn from_env() -> Result<Self> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();

        let mut builder = Config::builder();
        if let Ok(path) = std::env::var(CONFIG_FILE_VAR) {
            builder = builder.add_source(File::from(Path::new(&path)).format(FileFormat::Toml));
        }
        Self::from_builder(builder.add_source(environment()))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let cfg: Self = builder
            .build()
            .context("failed to read config sources")?
            .try_deserialize()
            .context("failed to deserialize config")?;
        validate::validate(&cfg)?;
        Ok(cfg)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: defaults::default_jwt_secret(),
            access_ttl_secs: defaults::DEFAULT_ACCESS_TTL_SECS,
        }
    }
}

/// The shared demo account and its limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    pub username: String,
    pub password: String,
    pub recipe_limit: u64,
    /// Create the demo account when the server starts.
    pub provision_on_start: bool,
    /// Wipe demo recipes every N hours; 0 turns the scheduler off.
    pub reset_interval_hours: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            username: defaults::DEFAULT_DEMO_USERNAME.to_string(),
            password: defaults::DEFAULT_DEMO_PASSWORD.to_string(),
            recipe_limit: defaults::DEFAULT_DEMO_RECIPE_LIMIT,
            provision_on_start: false,
            reset_interval_hours: 0,
        }
    }
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE
}

#[cfg(test)]
mod tests {
    use ::config::{Config, File, FileFormat, Map};

    use super::{AppConfig, environment};

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn environment_is_layered_over_the_file() {
        let file = "[general]\nport = 4000\n\n[demo]\nrecipe_limit = 5\nprovision_on_start = true\n";
        let builder = Config::builder()
            .add_source(File::from_str(file, FileFormat::Toml))
            .add_source(environment().source(Some(vars(&[
                ("APP_GENERAL__PORT", "8080"),
                ("APP_DATABASE__URL", "sqlite::memory:"),
                ("OTHER_GENERAL__PORT", "1"),
            ]))));

        let cfg = AppConfig::from_builder(builder).expect("config should load");

        assert_eq!(cfg.general.port, 8080);
        assert_eq!(cfg.demo.recipe_limit, 5);
        assert!(cfg.demo.provision_on_start);
        let database = cfg.database.expect("database section");
        assert_eq!(database.url, "sqlite::memory:");
        assert_eq!(database.max_connections, 10);
    }

    #[test]
    fn invalid_values_fail_after_loading() {
        let builder = Config::builder().add_source(
            environment().source(Some(vars(&[("APP_DEMO__RECIPE_LIMIT", "0")]))),
        );

        let err = AppConfig::from_builder(builder).unwrap_err();
        assert!(err.to_string().contains("demo.recipe_limit must be > 0"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let builder = Config::builder()
            .add_source(environment().source(Some(vars(&[("APP_DEMO__LIMIT", "3")]))));

        assert!(AppConfig::from_builder(builder).is_err());
    }
}
