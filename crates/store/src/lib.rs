//! Typed data-access layer for the bookshop database.
//!
//! This crate owns the connection to the store (SQLite or PostgreSQL), makes
//! sure the tables exist, and exposes typed inserts and queries over them.
//!
//! # Architecture
//! The schema is fixed and small:
//! - **Publishers** and **Shops**: just a name each.
//! - **Books**: a title, belonging to one publisher.
//! - **Stock**: how many copies of a book a shop holds.
//! - **Sales**: a price, a date and a count, taken out of one stock row.
//!
//! Relationships are plain [`Id`]s of the referenced row, checked by the
//! store's foreign keys on insert. The column mapping for every table lives in
//! [`schema`], and everything that needs SQL identifiers is derived from it.
//!
//! ```no_run
//! use bookshop_store::{ConnectionConfig, Database, Publisher, error::Result};
//!
//! async fn penguin_shops() -> Result<Vec<String>> {
//!     let mut db = Database::open(&ConnectionConfig::default()).await?;
//!     db.ensure_schema().await?;
//!     let mut repo = db.repository();
//!     repo.insert(&Publisher::new("Penguin Books")).await?;
//!     let shops = repo.shops_for_publisher("Penguin Books").await?;
//!     Ok(shops.into_iter().map(|shop| shop.entity.name).collect())
//! }
//! ```

mod config;
mod db;
pub mod error;
mod models;
mod repo;
pub mod schema;
pub mod seed;

pub use crate::config::ConnectionConfig;
pub use crate::db::Database;
pub use crate::models::{Book, Entity, Id, Publisher, Sale, Shop, Stock, Stored, Value};
pub use crate::repo::{Batch, Repository};
pub use crate::schema::{Dialect, Table};
