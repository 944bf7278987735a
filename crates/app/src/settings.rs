//! Handles settings for the application.
//!
//! Values come from an optional TOML file (`settings.toml` by default, or
//! the path given with `--config`) and are overridden by `SWAPSTOP__*`
//! environment variables, e.g. `SWAPSTOP__SERVER__PORT=9000`.

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    /// `memory`, a `sqlite:` URL, or a path to a SQLite file.
    pub database: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            database: "swapstop.db".to_string(),
        }
    }
}

impl Server {
    pub fn database_url(&self) -> String {
        match self.database.as_str() {
            "memory" => "sqlite::memory:".to_string(),
            url if url.starts_with("sqlite:") => url.to_string(),
            path => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Auth {
    /// HMAC key for bearer tokens. When empty a random key is generated at
    /// startup and tokens do not survive a restart.
    pub secret: String,
    pub token_ttl_minutes: i64,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_minutes: server::DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

#[derive(Debug, Parser)]
#[command(name = "swapstop", about = "SwapStop marketplace server")]
struct Args {
    /// Optional config file path (TOML, extension may be omitted).
    #[arg(long)]
    config: Option<String>,
    /// Override the log level (e.g. `debug`).
    #[arg(long)]
    level: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix("SWAPSTOP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if let Some(level) = args.level {
            settings.app.level = level;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_setting_becomes_sqlite_url() {
        let mut server = Server::default();
        assert_eq!(server.database_url(), "sqlite:swapstop.db?mode=rwc");

        server.database = "memory".to_string();
        assert_eq!(server.database_url(), "sqlite::memory:");

        server.database = "sqlite:/var/lib/swapstop.db".to_string();
        assert_eq!(server.database_url(), "sqlite:/var/lib/swapstop.db");
    }

    #[test]
    fn toml_sections_override_defaults() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 9000\n[auth]\nsecret = \"s3cret\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.bind, "127.0.0.1");
        assert_eq!(settings.auth.secret, "s3cret");
        assert_eq!(settings.auth.token_ttl_minutes, 10_080);
        assert_eq!(settings.app.level, "info");
    }
}
