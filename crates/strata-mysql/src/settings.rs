//! Connection settings resolution.
//!
//! Each setting is taken from its environment variable when set, then
//! from the schema document when declared (non-empty), then from a fixed
//! fallback.

use strata_core::Schema;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_USER: &str = "root";
const DEFAULT_PASSWORD: &str = "";
const DEFAULT_DATABASE: &str = "master";
const DEFAULT_CHARSET: &str = "utf8mb4";

/// Resolved parameters for a MySQL session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Target database.
    pub database: String,
    /// Session character set.
    pub charset: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

impl ConnectionSettings {
    /// Resolves settings from the process environment and `schema`.
    #[must_use]
    pub fn resolve(schema: &Schema) -> Self {
        Self::resolve_with(schema, |key| std::env::var(key).ok())
    }

    /// Resolves settings, reading variables through `lookup`.
    ///
    /// An unparsable `DB_PORT` falls back to 3306.
    #[must_use]
    pub fn resolve_with<F>(schema: &Schema, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, declared: &str, fallback: &str| {
            lookup(key)
                .or_else(|| (!declared.is_empty()).then(|| declared.to_string()))
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            host: pick("DB_HOST", schema.host(), DEFAULT_HOST),
            port: lookup("DB_PORT")
                .and_then(|port| port.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            user: pick("DB_USER", schema.user(), DEFAULT_USER),
            password: pick("DB_PASS", schema.password(), DEFAULT_PASSWORD),
            database: pick("DB_NAME", schema.database(), DEFAULT_DATABASE),
            charset: pick("DB_CHARSET", "", DEFAULT_CHARSET),
        }
    }
}
