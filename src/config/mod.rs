pub mod configs;
pub mod defaults;
pub mod validate;

pub use configs::{
    AppConfig, AuthConfig, CONFIG_FILE_VAR, DatabaseConfig, DemoConfig, ENV_PREFIX,
    GeneralConfig, LoggingConfig,
};
