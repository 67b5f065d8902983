// Application configuration loaded once at startup from environment variables

use std::env;

/// Immutable application configuration.
///
/// Built once in `main` and shared through `AppState`, so no component reads
/// the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret_key: String,
    pub jwt_algorithm: String,
    pub jwt_access_token_expire_minutes: i64,
    pub jwt_refresh_token_expire_days: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` and `JWT_SECRET_KEY` are required; everything else
    /// falls back to a default.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set in environment"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(8080),
            jwt_secret_key: env::var("JWT_SECRET_KEY")
                .expect("JWT_SECRET_KEY must be set in environment"),
            jwt_algorithm: env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string()),
            jwt_access_token_expire_minutes: env::var("JWT_ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(30),
            jwt_refresh_token_expire_days: env::var("JWT_REFRESH_TOKEN_EXPIRE_DAYS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(7),
        }
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by the test suite: fixed secret, default TTLs.
    /// The database URL is unused because tests hand their pool to the
    /// application state directly.
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret_key: "test_secret_key_for_testing_purposes".to_string(),
            jwt_algorithm: "HS256".to_string(),
            jwt_access_token_expire_minutes: 30,
            jwt_refresh_token_expire_days: 7,
        }
    }
}
