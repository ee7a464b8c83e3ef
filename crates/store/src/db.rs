//! Database connection lifecycle and schema provisioning.

use crate::config::ConnectionConfig;
use crate::error::{ErrorKind, Result};
use crate::repo::Repository;
use crate::schema::{self, Dialect, Table};
use exn::{OptionExt, ResultExt};
use sqlx::{AnyConnection, Connection};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use tracing::{debug, info, instrument};

/// A single connection to the bookshop database.
///
/// This is the main entry point for interacting with the store. It owns the
/// connection (and therefore every transaction opened on it) and hands out
/// [`Repository`] views for reading and writing rows. There is no pool: one
/// `Database` is one connection, used by one caller at a time.
///
/// Once [`close`](Self::close) has been called every operation fails with
/// [`ErrorKind::NotConnected`].
pub struct Database {
    conn: Option<AnyConnection>,
    dialect: Dialect,
}
impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Database").field("dialect", &self.dialect).field("open", &self.is_open()).finish()
    }
}

impl Database {
    /// Connect to the configured store and check that it answers.
    ///
    /// Unreachable servers, unopenable files and failed authentication are all
    /// reported as [`ErrorKind::Connection`].
    #[instrument("opening database connection", skip_all, fields(backend = %config.dialect()))]
    pub async fn open(config: &ConnectionConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let url = config.url()?;
        let mut conn = AnyConnection::connect(&url).await.or_raise(|| ErrorKind::Connection)?;
        conn.ping().await.or_raise(|| ErrorKind::Connection)?;
        let dialect = config.dialect();
        Self::apply_pragmas(&mut conn, dialect).await.or_raise(|| ErrorKind::Connection)?;
        info!("connected to database");
        Ok(Self { conn: Some(conn), dialect })
    }

    /// Connect to a private in-memory SQLite database (useful for testing).
    ///
    /// Note:
    /// - The database is destroyed when the connection closes.
    /// - Do NOT apply `#[cfg(test)]` so that other crates can also use this in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        Self::open(&ConnectionConfig::in_memory()).await
    }

    /// Per-connection settings that aren't expressed in the connection URL.
    async fn apply_pragmas(conn: &mut AnyConnection, dialect: Dialect) -> sqlx::Result<()> {
        if dialect == Dialect::Sqlite {
            // SQLite ignores REFERENCES clauses unless this is switched on for
            // every connection.
            sqlx::query("PRAGMA foreign_keys = ON").execute(conn).await?;
        }
        Ok(())
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub(crate) fn connection(&mut self) -> Result<&mut AnyConnection> {
        self.conn.as_mut().ok_or_raise(|| ErrorKind::NotConnected)
    }

    /// Borrow a repository for inserting and querying rows.
    pub fn repository(&mut self) -> Repository<'_> {
        Repository::from(self)
    }

    /// Create the five tables and their foreign keys if they don't exist yet.
    ///
    /// Safe to call any number of times. All tables are created in one
    /// transaction; any failure other than a table already existing is
    /// reported as [`ErrorKind::Schema`] and nothing is created.
    #[instrument("ensuring database schema", skip(self))]
    pub async fn ensure_schema(&mut self) -> Result<()> {
        let dialect = self.dialect;
        let mut tx = self.connection()?.begin().await.or_raise(|| ErrorKind::Schema)?;
        for table in Table::ALL {
            let ddl = schema::create_table(table, dialect);
            sqlx::query(&ddl).execute(&mut *tx).await.or_raise(|| ErrorKind::Schema)?;
            debug!(table = table.name(), "table ensured");
        }
        tx.commit().await.or_raise(|| ErrorKind::Schema)?;
        Ok(())
    }

    /// Check the store's catalog for a table, regardless of who created it.
    ///
    /// Names are compared case-insensitively.
    pub async fn table_exists(&mut self, name: &str) -> Result<bool> {
        let query = self.dialect.table_exists_query();
        let count: i64 = sqlx::query_scalar(query)
            .bind(name)
            .fetch_one(self.connection()?)
            .await
            .or_raise(|| ErrorKind::Query)?;
        debug!(table = name, exists = count > 0, "checked table existence");
        Ok(count > 0)
    }

    /// Close the connection.
    ///
    /// After calling this, every operation on this instance fails with
    /// [`ErrorKind::NotConnected`], including a second `close`.
    #[instrument("closing database connection", skip(self))]
    pub async fn close(&mut self) -> Result<()> {
        let mut conn = self.conn.take().ok_or_raise(|| ErrorKind::NotConnected)?;
        if self.dialect == Dialect::Sqlite {
            // Let SQLite update query planner statistics
            _ = sqlx::query("PRAGMA optimize").execute(&mut conn).await;
        }
        conn.close().await.or_raise(|| ErrorKind::Connection)
    }
}
