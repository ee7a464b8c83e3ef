//! Connection settings for the supported backends.

use crate::error::{ErrorKind, Result};
use crate::schema::Dialect;
use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use url::Url;

const MEMORY: &str = ":memory:";

/// Where the bookshop database lives.
///
/// The settings are handed to the `sqlx` driver as a connection URL; nothing
/// here talks to the store itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum ConnectionConfig {
    /// A local SQLite file, created if missing. `:memory:` opens a private
    /// in-memory database.
    Sqlite { path: PathBuf },
    /// A PostgreSQL server.
    Postgres {
        host: String,
        port: u16,
        database: String,
        user: String,
        #[serde(default)]
        password: Option<String>,
    },
}
impl ConnectionConfig {
    /// A private in-memory SQLite database.
    pub fn in_memory() -> Self {
        Self::Sqlite { path: PathBuf::from(MEMORY) }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Sqlite { .. } => Dialect::Sqlite,
            Self::Postgres { .. } => Dialect::Postgres,
        }
    }

    /// Driver URL for these settings. User and password are percent-encoded.
    pub(crate) fn url(&self) -> Result<String> {
        match self {
            Self::Sqlite { path } if path.as_os_str() == MEMORY => Ok(format!("sqlite:{MEMORY}")),
            Self::Sqlite { path } => {
                let path = path.to_str().ok_or_raise(|| ErrorKind::Connection)?;
                Ok(format!("sqlite://{path}?mode=rwc"))
            },
            Self::Postgres { host, port, database, user, password } => {
                let mut url = Url::parse("postgres://localhost").or_raise(|| ErrorKind::Connection)?;
                url.set_host(Some(host.as_str())).or_raise(|| ErrorKind::Connection)?;
                url.set_port(Some(*port)).ok().ok_or_raise(|| ErrorKind::Connection)?;
                url.set_username(user).ok().ok_or_raise(|| ErrorKind::Connection)?;
                url.set_password(password.as_deref()).ok().ok_or_raise(|| ErrorKind::Connection)?;
                url.set_path(&format!("/{database}"));
                Ok(url.into())
            },
        }
    }
}
impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::Postgres {
            host: "localhost".to_string(),
            port: 5432,
            database: "bookstore".to_string(),
            user: "postgres".to_string(),
            password: None,
        }
    }
}
// Hand-written so the password never ends up in logs.
impl Debug for ConnectionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Sqlite { path } => f.debug_struct("Sqlite").field("path", path).finish(),
            Self::Postgres { host, port, database, user, password } => f
                .debug_struct("Postgres")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .field("user", user)
                .field("password", &password.as_ref().map(|_| "********"))
                .finish(),
        }
    }
}
