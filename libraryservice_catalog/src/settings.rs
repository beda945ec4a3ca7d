use anyhow::Context;
use serde::Deserialize;

/// Service configuration, loaded from the environment. `USE_IN_MEMORY_DB`
/// switches the storage backend, `DB_HOST`/`DB_USERNAME`/`DB_PASSWORD`
/// point at postgres, `HOST`/`PORT` control the listener.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub use_in_memory_db: bool,
    #[serde(default = "Settings::default_db_host")]
    pub db_host: String,
    #[serde(default = "Settings::default_db_username")]
    pub db_username: String,
    #[serde(default = "Settings::default_db_password")]
    pub db_password: String,
    #[serde(default = "Settings::default_host")]
    pub host: String,
    #[serde(default = "Settings::default_port")]
    pub port: u16,
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .context("Failed to build configuration")?;
        cfg.try_deserialize()
            .context("Failed to deserialize configuration")
    }

    fn default_db_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_db_username() -> String {
        "postgres".to_string()
    }

    fn default_db_password() -> String {
        "postgres".to_string()
    }

    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_in_memory_db: false,
            db_host: Self::default_db_host(),
            db_username: Self::default_db_username(),
            db_password: Self::default_db_password(),
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}
