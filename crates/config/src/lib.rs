//! Configuration loading for bookshop.
//!
//! Settings are layered, later layers overriding earlier ones:
//! 1. Built-in defaults (PostgreSQL on `localhost:5432`, database `bookstore`,
//!    user `postgres`).
//! 2. A TOML file: the path given on the command line, or else
//!    `config.toml` in the platform configuration directory if it exists.
//! 3. Environment variables prefixed with `BOOKSHOP_`, nested keys separated
//!    by `__` (e.g. `BOOKSHOP_DATABASE__HOST=db.internal`).
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! path = "bookstore.db"
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use bookshop_store::ConnectionConfig;
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_PREFIX: &str = "BOOKSHOP_";
const FILE_NAME: &str = "config.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: ConnectionConfig,
}

impl Config {
    /// Load the configuration, reading `path` if given.
    ///
    /// An explicit path that doesn't exist is an error; the default location
    /// is silently skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path
            && !path.is_file()
        {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| default_path().filter(|default| default.is_file()));
        debug!(file = ?file, "loading configuration");
        Self::figment(file.as_deref()).extract().or_raise(|| ErrorKind::Invalid)
    }

    fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match file {
            Some(file) => figment.merge(Toml::file_exact(file)),
            None => figment,
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

/// `config.toml` in the platform configuration directory, e.g.
/// `~/.config/bookshop/config.toml` on Linux.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bookshop").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn load(jail: &Jail, file: Option<&str>) -> Config {
        let path = file.map(|f| jail.directory().join(f));
        Config::figment(path.as_deref()).extract().unwrap()
    }

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            assert_eq!(load(jail, None), Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_sqlite_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "bookshop.toml",
                r#"
                    [database]
                    backend = "sqlite"
                    path = "bookstore.db"
                "#,
            )?;
            let config = load(jail, Some("bookshop.toml"));
            assert_eq!(config.database, ConnectionConfig::Sqlite { path: PathBuf::from("bookstore.db") });
            Ok(())
        });
    }

    #[test]
    fn test_postgres_file_with_password() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "bookshop.toml",
                r#"
                    [database]
                    backend = "postgres"
                    host = "localhost"
                    port = 5432
                    database = "test"
                    user = "postgres"
                    password = "1012"
                "#,
            )?;
            let config = load(jail, Some("bookshop.toml"));
            assert_eq!(
                config.database,
                ConnectionConfig::Postgres {
                    host: "localhost".to_string(),
                    port: 5432,
                    database: "test".to_string(),
                    user: "postgres".to_string(),
                    password: Some("1012".to_string()),
                }
            );
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "bookshop.toml",
                r#"
                    [database]
                    backend = "postgres"
                    host = "localhost"
                    port = 5432
                    database = "bookstore"
                    user = "postgres"
                "#,
            )?;
            jail.set_env("BOOKSHOP_DATABASE__HOST", "db.internal");
            jail.set_env("BOOKSHOP_DATABASE__PORT", "6543");
            let config = load(jail, Some("bookshop.toml"));
            let ConnectionConfig::Postgres { host, port, .. } = config.database else {
                panic!("expected postgres backend");
            };
            assert_eq!(host, "db.internal");
            assert_eq!(port, 6543);
            Ok(())
        });
    }

    #[test]
    fn test_environment_selects_backend() {
        Jail::expect_with(|jail| {
            jail.set_env("BOOKSHOP_DATABASE__BACKEND", "sqlite");
            jail.set_env("BOOKSHOP_DATABASE__PATH", "from-env.db");
            let config = load(jail, None);
            assert_eq!(config.database, ConnectionConfig::Sqlite { path: PathBuf::from("from-env.db") });
            Ok(())
        });
    }

    #[test]
    fn test_invalid_backend() {
        Jail::expect_with(|jail| {
            jail.create_file("bookshop.toml", "[database]\nbackend = \"oracle\"\n")?;
            let result: std::result::Result<Config, _> =
                Config::figment(Some(&jail.directory().join("bookshop.toml"))).extract();
            assert!(result.is_err());
            Ok(())
        });
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_load_without_any_file() {
        Jail::expect_with(|jail| {
            let root = jail.directory().to_path_buf();
            jail.set_env("HOME", root.display());
            jail.set_env("XDG_CONFIG_HOME", root.join("config").display());
            assert_eq!(Config::load(None).unwrap(), Config::default());
            Ok(())
        });
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_load_reads_default_location() {
        Jail::expect_with(|jail| {
            let root = jail.directory().to_path_buf();
            jail.set_env("HOME", root.display());
            jail.set_env("XDG_CONFIG_HOME", root.join("config").display());
            let dir = root.join("config").join("bookshop");
            std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
            std::fs::write(dir.join("config.toml"), "[database]\nbackend = \"sqlite\"\npath = \"default.db\"\n")
                .map_err(|e| e.to_string())?;
            let config = Config::load(None).unwrap();
            assert_eq!(config.database, ConnectionConfig::Sqlite { path: PathBuf::from("default.db") });
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(path));
    }
}
