use std::path::PathBuf;

use anyhow::{Context, Result};

use folio_api::Settings;

const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// No path means the service runs without a database.
    pub db_path: Option<PathBuf>,
    pub max_body_bytes: usize,
    pub settings: Settings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(port) => port.parse().with_context(|| format!("PORT '{port}' is not a port number"))?,
            None => 3000,
        };
        let max_body_bytes = match var("FOLIO_MAX_BODY_BYTES") {
            Some(limit) => limit
                .parse()
                .with_context(|| format!("FOLIO_MAX_BODY_BYTES '{limit}' is not a byte count"))?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            host: var("FOLIO_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: var("FOLIO_DB_PATH").map(PathBuf::from),
            max_body_bytes,
            settings: Settings {
                app_id: var("VITE_APP_ID").unwrap_or_default(),
                jwt_secret: var("JWT_SECRET"),
                oauth_server_url: var("OAUTH_SERVER_URL"),
                owner_open_id: var("OWNER_OPEN_ID"),
                forge_api_url: var("BUILT_IN_FORGE_API_URL"),
                forge_api_key: var("BUILT_IN_FORGE_API_KEY"),
            },
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert!(config.db_path.is_none());
        assert_eq!(config.max_body_bytes, 50 * 1024 * 1024);
        assert_eq!(config.settings.app_id, "");
        assert!(config.settings.jwt_secret.is_none());
        assert!(config.settings.forge_api_key.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("FOLIO_HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("FOLIO_DB_PATH", "/var/lib/folio/folio.db"),
            ("FOLIO_MAX_BODY_BYTES", "1048576"),
            ("VITE_APP_ID", "app-1"),
            ("JWT_SECRET", "s3cret"),
            ("OAUTH_SERVER_URL", "https://id.example.com"),
            ("OWNER_OPEN_ID", "owner"),
            ("BUILT_IN_FORGE_API_URL", "https://forge.example.com"),
            ("BUILT_IN_FORGE_API_KEY", "key"),
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/folio/folio.db")));
        assert_eq!(config.max_body_bytes, 1_048_576);
        assert_eq!(config.settings.app_id, "app-1");
        assert_eq!(config.settings.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.settings.oauth_server_url.as_deref(), Some("https://id.example.com"));
        assert_eq!(config.settings.owner_open_id.as_deref(), Some("owner"));
        assert_eq!(config.settings.forge_api_url.as_deref(), Some("https://forge.example.com"));
        assert_eq!(config.settings.forge_api_key.as_deref(), Some("key"));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = config(&[("JWT_SECRET", "  "), ("FOLIO_DB_PATH", "")]).unwrap();
        assert!(config.settings.jwt_secret.is_none());
        assert!(config.db_path.is_none());
    }

    #[test]
    fn bad_numbers_are_errors() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("PORT", "70000")]).is_err());
        assert!(config(&[("FOLIO_MAX_BODY_BYTES", "-1")]).is_err());
    }
}
