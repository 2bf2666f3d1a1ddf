pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DB_MIN_IDLE: u32 = 2;
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 3600;
pub const DEFAULT_DEMO_USERNAME: &str = "demo";
pub const DEFAULT_DEMO_PASSWORD: &str = "demo-password";
pub const DEFAULT_DEMO_RECIPE_LIMIT: u64 = 10;

/// Debug builds get a usable secret so `cargo run` works without a `.env`.
pub fn default_jwt_secret() -> String {
    if cfg!(debug_assertions) {
        "dev-only-jwt-secret-change-me".to_string()
    } else {
        String::new()
    }
}
