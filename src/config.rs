use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde::Deserialize;

/// Named configuration set selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Development,
    Testing,
    Production,
}

impl Profile {
    /// Environment variable holding the database URL for this profile.
    pub fn database_url_var(self) -> &'static str {
        match self {
            Profile::Testing => "DATABASE_TEST_URL",
            Profile::Development | Profile::Production => "DATABASE_URL",
        }
    }

    pub fn debug(self) -> bool {
        matches!(self, Profile::Development)
    }

    pub fn testing(self) -> bool {
        matches!(self, Profile::Testing)
    }
}

impl FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "testing" | "test" => Ok(Profile::Testing),
            "production" | "prod" => Ok(Profile::Production),
            other => Err(anyhow!("unknown profile: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub profile: Profile,
    pub database_url: String,
    pub debug: bool,
    pub testing: bool,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = match lookup("APP_ENV") {
            Some(name) => name.parse::<Profile>()?,
            None => Profile::Development,
        };

        let url_var = profile.database_url_var();
        let database_url = lookup(url_var).with_context(|| format!("{url_var} is not set"))?;

        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("APP_PORT") {
            Some(p) => p
                .parse::<u16>()
                .with_context(|| format!("invalid APP_PORT: {p}"))?,
            None => 8080,
        };

        Ok(Self {
            profile,
            database_url,
            debug: profile.debug(),
            testing: profile.testing(),
            host,
            port,
        })
    }

    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "users_service=debug,tower_http=info,axum=info"
        } else {
            "users_service=info,tower_http=info"
        }
    }
}
