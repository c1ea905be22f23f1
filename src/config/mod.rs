use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::Deserialize;
use std::env;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allow_any_origin: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub max_age: u32,
}

/// A user the bundled guard accepts. Passwords are configured as the
/// lowercase hex SHA-256 digest of the plaintext.
#[derive(Debug, Deserialize, Clone)]
pub struct UserSeed {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_sha256: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings: Self = Self::defaults()?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in settings from environment variables (with prefix "APP_")
            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Checks values the deserializer cannot, so that a bad entry fails at
    /// load time instead of inside a worker.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cors.allowed_origins
            .iter()
            .try_for_each(|origin| validate_origin(origin))
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("cors.enabled", true)?
            .set_default("cors.allow_any_origin", false)?
            .set_default("cors.max_age", 3600)?
            .set_default("auth.jwt_secret", "development_secret")?
            .set_default("auth.token_ttl_minutes", 60)?
            .set_default("auth.refresh_ttl_minutes", 20160)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    #[cfg(test)]
    pub fn new_for_test() -> Result<Self, ConfigError> {
        Self::defaults()?
            .set_override("environment", "test")?
            .set_override("auth.jwt_secret", "test_secret")?
            .build()?
            .try_deserialize()
    }
}

/// An allowed CORS origin must be a bare `scheme://host[:port]`, exactly as
/// browsers send it in the `Origin` header.
fn validate_origin(origin: &str) -> Result<(), ConfigError> {
    if origin == "*" {
        return Err(ConfigError::Message(
            "cors.allowed_origins must not contain \"*\", set cors.allow_any_origin instead".into(),
        ));
    }

    let url = Url::parse(origin)
        .map_err(|e| ConfigError::Message(format!("invalid CORS origin {:?}: {}", origin, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.origin().ascii_serialization() != origin {
        return Err(ConfigError::Message(format!(
            "invalid CORS origin {:?}: expected scheme://host[:port]",
            origin
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::new_for_test().expect("Failed to load settings");
        assert_eq!(settings.environment, "test");
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.workers as usize, num_cpus::get());
        assert!(settings.cors.enabled);
        assert!(settings.cors.allowed_origins.is_empty());
        assert_eq!(settings.auth.jwt_secret, "test_secret");
        assert_eq!(settings.auth.token_ttl_minutes, 60);
        assert_eq!(settings.auth.refresh_ttl_minutes, 20160);
        assert!(settings.auth.users.is_empty());
        assert!(!settings.is_production());
    }

    #[test]
    fn test_users_from_file_source() {
        let toml = r#"
            [[auth.users]]
            id = "6f1c1c5e-8b0a-4a49-9a5e-0d3f0e4f2b11"
            name = "Ada"
            email = "ada@example.com"
            password_sha256 = "ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f"
        "#;

        let settings: Settings = Settings::defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .expect("Failed to build config")
            .try_deserialize()
            .expect("Failed to deserialize settings");

        assert_eq!(settings.auth.users.len(), 1);
        assert_eq!(settings.auth.users[0].name, "Ada");
        assert_eq!(
            settings.auth.users[0].id,
            Uuid::parse_str("6f1c1c5e-8b0a-4a49-9a5e-0d3f0e4f2b11").unwrap()
        );
    }

    // The only test in this crate that touches APP_* variables.
    #[test]
    fn test_environment_override() {
        env::set_var("APP_SERVER__PORT", "9000");
        env::set_var("APP_AUTH__JWT_SECRET", "override_secret");
        env::set_var("APP_AUTH__TOKEN_TTL_MINUTES", "15");

        let result = Settings::defaults()
            .unwrap()
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()
            .and_then(|config| config.try_deserialize::<Settings>());

        env::remove_var("APP_SERVER__PORT");
        env::remove_var("APP_AUTH__JWT_SECRET");
        env::remove_var("APP_AUTH__TOKEN_TTL_MINUTES");

        let settings = result.expect("Failed to deserialize settings");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.auth.jwt_secret, "override_secret");
        assert_eq!(settings.auth.token_ttl_minutes, 15);
        assert_eq!(settings.auth.refresh_ttl_minutes, 20160);
    }

    #[test]
    fn test_cors_origin_validation() {
        let mut settings = Settings::new_for_test().expect("Failed to load settings");
        settings.cors.allowed_origins = vec![
            "http://localhost:8080".to_string(),
            "https://app.example.com".to_string(),
        ];
        assert!(settings.validate().is_ok());

        for bad in [
            "*",
            "not a url",
            "localhost:8080",
            "https://app.example.com/",
            "https://app.example.com/login",
            "ftp://files.example.com",
        ] {
            settings.cors.allowed_origins = vec![bad.to_string()];
            assert!(
                matches!(settings.validate(), Err(ConfigError::Message(_))),
                "Expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_invalid_port() {
        let result = Settings::defaults()
            .unwrap()
            .set_override("server.port", "invalid")
            .unwrap()
            .build()
            .and_then(|config| config.try_deserialize::<Settings>());

        assert!(result.is_err(), "Expected error for invalid port");
    }
}
