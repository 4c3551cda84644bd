pub mod database;

use config::{Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub logo_path: String,
    /// Directory with the THSarabun faces; unset uses built-in fonts.
    pub font_dir: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

const DEFAULTS: &str = r#"
port = 8080
logo_path = "public/images/logo.png"
db_max_connections = 10
db_acquire_timeout_secs = 5
"#;

impl Config {
    /// Reads `.env` if present, then the process environment over the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_source(Environment::default().try_parsing(true))
    }

    fn from_source(env: Environment) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(File::from_str(DEFAULTS, FileFormat::Toml))
            .add_source(env)
            .build()?
            .try_deserialize::<Config>()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

        if config.database_url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL must be set");
        }
        Ok(config)
    }
}
