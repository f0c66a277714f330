use anyhow::Context;
use serde::Deserialize;

/// Default token lifetime: 30 days.
const DEFAULT_TTL_MINUTES: i64 = 60 * 24 * 30;
/// Upper bound on token lifetime: ten years.
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: Option<String>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = required("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "taskboard".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "taskboard-users".into()),
            ttl_minutes: checked_ttl(parsed("JWT_TTL_MINUTES").unwrap_or(DEFAULT_TTL_MINUTES))?,
        };
        Ok(Self {
            database_url,
            db_max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(10),
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed("APP_PORT").unwrap_or(5000),
            frontend_url: std::env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty()),
            jwt,
        })
    }

    /// Config used by tests and `AppState::fake`.
    pub fn fake() -> Self {
        Self {
            database_url: "memory://".into(),
            db_max_connections: 1,
            environment: "test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: DEFAULT_TTL_MINUTES,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory://")
    }

    /// Origins allowed by CORS. Production only admits the deployed frontend.
    pub fn allowed_origins(&self) -> Vec<String> {
        if self.is_production() {
            return self.frontend_url.iter().cloned().collect();
        }
        [
            "http://localhost:5173",
            "http://localhost:5174",
            "http://localhost:3000",
            "http://127.0.0.1:5173",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .with_context(|| format!("missing required environment variable {name}"))
}

fn checked_ttl(minutes: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_only_allows_frontend_origin() {
        let mut config = AppConfig::fake();
        config.environment = "production".into();
        assert!(config.allowed_origins().is_empty());

        config.frontend_url = Some("https://tasks.example.com".into());
        assert_eq!(config.allowed_origins(), vec!["https://tasks.example.com"]);
    }

    #[test]
    fn development_allows_local_origins() {
        let config = AppConfig::fake();
        let origins = config.allowed_origins();
        assert!(origins.contains(&"http://localhost:5173".to_string()));
        assert_eq!(origins.len(), 4);
    }

    #[test]
    fn token_lifetime_is_bounded() {
        assert_eq!(checked_ttl(DEFAULT_TTL_MINUTES).unwrap(), DEFAULT_TTL_MINUTES);
        assert!(checked_ttl(MAX_TTL_MINUTES).is_ok());
        for bad in [0, -5, MAX_TTL_MINUTES + 1, i64::MAX] {
            let err = checked_ttl(bad).unwrap_err();
            assert!(err.to_string().contains("JWT_TTL_MINUTES"));
        }
    }

    #[test]
    fn fake_config_selects_memory_store() {
        assert!(AppConfig::fake().uses_memory_store());
        assert!(!AppConfig::fake().is_production());
    }
}
