use anyhow::Context;

const DEFAULT_ACTOR: &str = "Super Admin";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres URL. Without one the console works on the built-in dataset.
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Name recorded as `performed_by` on activity entries.
    pub actor: String,
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("failed to read .env");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let max_connections = match lookup("ADMIN_CONSOLE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("ADMIN_CONSOLE_MAX_CONNECTIONS is not a number: {raw}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let actor = lookup("ADMIN_CONSOLE_ACTOR")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ACTOR.to_string());

        Ok(Config {
            database_url,
            max_connections,
            actor,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.actor, "Super Admin");
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let config = config(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn values_are_read_from_environment() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/admin"),
            ("ADMIN_CONSOLE_MAX_CONNECTIONS", "12"),
            ("ADMIN_CONSOLE_ACTOR", "Dana Ortiz"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/admin"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.actor, "Dana Ortiz");
    }

    #[test]
    fn bad_connection_count_is_an_error() {
        assert!(config(&[("ADMIN_CONSOLE_MAX_CONNECTIONS", "many")]).is_err());
    }
}
