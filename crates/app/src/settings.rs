//! Application settings.
//!
//! Read from an optional `settings.toml` in the working directory, then from
//! `MONEYBAG__*` environment variables (`__` separates nesting levels, e.g.
//! `MONEYBAG__SERVER__JWT__SECRET`).
use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level applied to the workspace crates.
    pub level: String,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    /// Path of the SQLite file, created if missing.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Jwt {
    pub secret: String,
    pub expiry_hours: i64,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub jwt: Jwt,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_source(File::with_name("settings").required(false))
    }

    fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings: Self = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 8080)?
            .set_default("server.database", "memory")?
            .set_default("server.jwt.expiry_hours", 24)?
            .add_source(source)
            .add_source(
                Environment::with_prefix("MONEYBAG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if settings.server.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "server.jwt.secret must not be empty".to_string(),
            ));
        }
        if settings.server.jwt.expiry_hours <= 0 {
            return Err(ConfigError::Message(
                "server.jwt.expiry_hours must be positive".to_string(),
            ));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_source(File::from_str(toml, FileFormat::Toml))
    }

    #[test]
    fn defaults_fill_missing_keys() {
        let settings = parse(
            r#"
            [server.jwt]
            secret = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.server.jwt.expiry_hours, 24);
        assert!(settings.server.bind.is_none());
    }

    #[test]
    fn sqlite_database_from_file() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 3000
            database = { sqlite = "moneybag.db" }

            [server.jwt]
            secret = "s3cret"
            expiry_hours = 2
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(
            settings.server.database,
            Database::Sqlite("moneybag.db".to_string())
        );
        assert_eq!(settings.server.jwt.expiry_hours, 2);
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(parse("[server.jwt]\nsecret = \"  \"\n").is_err());
    }
}
