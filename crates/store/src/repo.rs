//! Typed inserts and queries over the bookshop tables.
//!
//! Every write happens inside a transaction. Single inserts get their own;
//! [`Repository::insert_batch`] and [`Batch`] share one across several rows
//! so that either all of them become visible or none do.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{self, Entity, Id, Shop, ShopRow, Stored, Value};
use crate::schema;
use exn::ResultExt;
use sqlx::{Any, Connection, Transaction};
use tracing::{debug, instrument, warn};

/// Repository for inserting and querying publishers, books, shops, stock and
/// sales.
///
/// Borrows the [`Database`] mutably: the connection can only serve one
/// repository (and one open transaction) at a time.
///
/// # Relationships
///
/// - A book belongs to one publisher
/// - A stock row belongs to one book and one shop
/// - A sale belongs to one stock row
/// - Referenced rows must exist before the referencing row is inserted; the
///   store rejects dangling identifiers with [`ErrorKind::Constraint`]
#[derive(Debug)]
pub struct Repository<'db> {
    db: &'db mut Database,
}
impl<'db> From<&'db mut Database> for Repository<'db> {
    fn from(db: &'db mut Database) -> Self {
        Self { db }
    }
}
impl Repository<'_> {
    // =========================================================================
    // Insert
    // =========================================================================

    /// Start a transaction for inserting several related rows.
    ///
    /// Rows inserted through the returned [`Batch`] are only visible once
    /// [`Batch::commit`] succeeds.
    pub async fn begin(&mut self) -> Result<Batch<'_>> {
        let tx = self.db.connection()?.begin().await.or_raise(|| ErrorKind::Query)?;
        Ok(Batch { tx, inserted: 0 })
    }

    /// Insert a single row in its own transaction and return its identifier.
    ///
    /// Returns [`ErrorKind::Constraint`] if a referenced row does not exist;
    /// nothing is written in that case.
    pub async fn insert<E: Entity>(&mut self, entity: &E) -> Result<Id<E>> {
        let mut batch = self.begin().await?;
        let id = batch.insert(entity).await?;
        batch.commit().await?;
        Ok(id)
    }

    /// Insert several rows of the same kind in one transaction.
    ///
    /// Identifiers are returned in input order. If any row is rejected the
    /// whole batch is rolled back and the error of the first failing row is
    /// returned.
    #[instrument(skip_all, fields(table = %E::TABLE, rows = entities.len()))]
    pub async fn insert_batch<E: Entity>(&mut self, entities: &[E]) -> Result<Vec<Id<E>>> {
        let mut batch = self.begin().await?;
        let mut ids = Vec::with_capacity(entities.len());
        for entity in entities {
            match batch.insert(entity).await {
                Ok(id) => ids.push(id),
                Err(err) => {
                    batch.rollback().await?;
                    return Err(err);
                },
            }
        }
        batch.commit().await?;
        Ok(ids)
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Get a row by identifier, e.g. to resolve a belongs-to reference.
    pub async fn get<E: Entity>(&mut self, id: Id<E>) -> Result<Option<Stored<E>>> {
        Ok(self.find_by::<E>("id", id).await?.into_iter().next())
    }

    /// Find every row whose `column` equals `value`, ordered by identifier.
    ///
    /// The column must be declared for the entity's table (or be `id`),
    /// otherwise [`ErrorKind::UnknownColumn`] is returned without querying the
    /// store. No match is an empty vector, not an error.
    pub async fn find_by<E: Entity>(&mut self, column: &str, value: impl Into<Value>) -> Result<Vec<Stored<E>>> {
        let table = E::TABLE;
        let Some(column) = table.column(column) else {
            exn::bail!(ErrorKind::UnknownColumn(table.name(), column.to_string()));
        };
        let value = value.into();
        debug!(%table, column, %value, "finding rows");
        let sql = format!("{} WHERE {column} = $1 ORDER BY id", schema::select_statement(table));
        let args = models::arguments([value])?;
        let rows: Vec<E::Row> = sqlx::query_as_with::<Any, E::Row, _>(&sql, args)
            .fetch_all(self.db.connection()?)
            .await
            .or_raise(|| ErrorKind::Query)?;
        rows.into_iter().map(E::from_row).collect()
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List every row of the entity's table, ordered by identifier.
    pub async fn list<E: Entity>(&mut self) -> Result<Vec<Stored<E>>> {
        let sql = format!("{} ORDER BY id", schema::select_statement(E::TABLE));
        let rows: Vec<E::Row> = sqlx::query_as::<Any, E::Row>(&sql)
            .fetch_all(self.db.connection()?)
            .await
            .or_raise(|| ErrorKind::Query)?;
        rows.into_iter().map(E::from_row).collect()
    }

    /// List the shops that stock at least one book from the named publisher.
    ///
    /// Each shop appears once, however many matching stock rows it has, in
    /// identifier order. The name is bound as a parameter, so it may contain
    /// anything. An unknown publisher yields an empty vector.
    #[instrument(skip(self))]
    pub async fn shops_for_publisher(&mut self, publisher: &str) -> Result<Vec<Stored<Shop>>> {
        let rows: Vec<ShopRow> = sqlx::query_as(include_str!("../queries/shops_for_publisher.sql"))
            .bind(publisher)
            .fetch_all(self.db.connection()?)
            .await
            .or_raise(|| ErrorKind::Query)?;
        debug!(shops = rows.len(), "found shops for publisher");
        rows.into_iter().map(Shop::from_row).collect()
    }
}

/// An open transaction on the repository's connection.
///
/// Dropping a batch without calling [`commit`](Self::commit) rolls it back,
/// so an early return (or `?`) never leaves a transaction open.
pub struct Batch<'c> {
    tx: Transaction<'c, Any>,
    inserted: usize,
}
impl Batch<'_> {
    /// Insert one row and return its identifier, which later rows of the same
    /// batch may reference.
    ///
    /// After an error the batch must be rolled back (or dropped): PostgreSQL
    /// aborts the whole transaction on a failed statement, so later inserts
    /// and the commit would fail too.
    pub async fn insert<E: Entity>(&mut self, entity: &E) -> Result<Id<E>> {
        let table = E::TABLE;
        let sql = schema::insert_statement(table);
        let args = models::arguments(entity.values())?;
        let result = sqlx::query_scalar_with::<Any, i64, _>(&sql, args).fetch_one(&mut *self.tx).await;
        let id = match result {
            Ok(id) => id,
            Err(err) => {
                let kind = ErrorKind::from_write(&err, table.name());
                warn!(%table, error = %err, "insert rejected");
                return Err(err).or_raise(|| kind);
            },
        };
        self.inserted += 1;
        debug!(%table, id, "inserted row");
        Ok(Id::new(id))
    }

    /// Number of rows inserted so far.
    pub fn len(&self) -> usize {
        self.inserted
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Make every row of the batch visible.
    pub async fn commit(self) -> Result<()> {
        let inserted = self.inserted;
        self.tx.commit().await.or_raise(|| ErrorKind::Query)?;
        debug!(rows = inserted, "committed transaction");
        Ok(())
    }

    /// Discard every row of the batch.
    pub async fn rollback(self) -> Result<()> {
        let inserted = self.inserted;
        self.tx.rollback().await.or_raise(|| ErrorKind::Query)?;
        debug!(rows = inserted, "rolled back transaction");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, Publisher, Sale, Stock};

    async fn database() -> Database {
        let mut db = Database::connect_in_memory().await.unwrap();
        db.ensure_schema().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let mut db = database().await;
        let mut repo = db.repository();
        let publisher = repo.insert(&Publisher::new("Penguin Books")).await.unwrap();
        let book = repo.insert(&Book::new("1984", publisher)).await.unwrap();
        let stored = repo.get(book).await.unwrap().unwrap();
        assert_eq!(stored.title, "1984");
        assert_eq!(stored.publisher, publisher);
        let owner = repo.get(stored.publisher).await.unwrap().unwrap();
        assert_eq!(owner.name, "Penguin Books");
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let mut db = database().await;
        let mut repo = db.repository();
        assert!(repo.get(Id::<Shop>::new(42)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dangling_reference_is_rejected() {
        let mut db = database().await;
        let mut repo = db.repository();
        let err = repo.insert(&Book::new("Orphan", Id::new(999))).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Constraint("book"));
        assert!(repo.list::<Book>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dangling_stock_and_sale_references_are_rejected() {
        let mut db = database().await;
        let mut repo = db.repository();
        let shop = repo.insert(&Shop::new("City Bookstore")).await.unwrap();
        let err = repo.insert(&Stock::new(Id::new(5), shop, 1)).await.unwrap_err();
        assert!(err.is_constraint());
        let err = repo.insert(&Sale::new(9.99, "2024-01-15", Id::new(5), 1)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Constraint("sale"));
        assert!(repo.list::<Stock>().await.unwrap().is_empty());
        assert!(repo.list::<Sale>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_batch_returns_ids_in_order() {
        let mut db = database().await;
        let mut repo = db.repository();
        let ids = repo
            .insert_batch(&[Shop::new("City Bookstore"), Shop::new("University Books"), Shop::new("Mall Bookshop")])
            .await
            .unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        let shops = repo.list::<Shop>().await.unwrap();
        assert_eq!(shops.iter().map(|s| s.id).collect::<Vec<_>>(), ids);
    }

    #[tokio::test]
    async fn test_insert_batch_is_atomic() {
        let mut db = database().await;
        let mut repo = db.repository();
        let publisher = repo.insert(&Publisher::new("Penguin Books")).await.unwrap();
        let books = [
            Book::new("The Great Gatsby", publisher),
            Book::new("1984", publisher),
            Book::new("Dangling", Id::new(publisher.get() + 100)),
        ];
        let err = repo.insert_batch(&books).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Constraint("book"));
        assert!(repo.list::<Book>().await.unwrap().is_empty());
        // The connection is still usable after the rollback.
        repo.insert(&Book::new("1984", publisher)).await.unwrap();
        assert_eq!(repo.list::<Book>().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_batch_row_then_rollback() {
        let mut db = database().await;
        let mut repo = db.repository();
        let mut batch = repo.begin().await.unwrap();
        let publisher = batch.insert(&Publisher::new("Penguin Books")).await.unwrap();
        let err = batch.insert(&Book::new("Dangling", Id::new(publisher.get() + 1))).await.unwrap_err();
        assert!(err.is_constraint());
        batch.rollback().await.unwrap();
        assert!(repo.list::<Publisher>().await.unwrap().is_empty());
        assert!(repo.list::<Book>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_batch_is_rolled_back() {
        let mut db = database().await;
        let mut repo = db.repository();
        {
            let mut batch = repo.begin().await.unwrap();
            batch.insert(&Publisher::new("Penguin Books")).await.unwrap();
            assert_eq!(batch.len(), 1);
        }
        assert!(repo.list::<Publisher>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_rows_reference_each_other() {
        let mut db = database().await;
        let mut repo = db.repository();
        let mut batch = repo.begin().await.unwrap();
        let publisher = batch.insert(&Publisher::new("HarperCollins")).await.unwrap();
        let book = batch.insert(&Book::new("To Kill a Mockingbird", publisher)).await.unwrap();
        let shop = batch.insert(&Shop::new("City Bookstore")).await.unwrap();
        let stock = batch.insert(&Stock::new(book, shop, 8)).await.unwrap();
        batch.insert(&Sale::new(14.5, "2024-03-02", stock, 1)).await.unwrap();
        batch.commit().await.unwrap();
        let sales = repo.find_by::<Sale>("stock_id", stock).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].price, 14.5);
        assert_eq!(sales[0].count, 1);
    }

    #[tokio::test]
    async fn test_find_by_on_empty_table() {
        let mut db = database().await;
        let mut repo = db.repository();
        assert!(repo.find_by::<Publisher>("name", "Penguin Books").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_unknown_column() {
        let mut db = database().await;
        let mut repo = db.repository();
        let err = repo.find_by::<Shop>("title", "1984").await.unwrap_err();
        assert_eq!(*err, ErrorKind::UnknownColumn("shop", "title".to_string()));
    }

    #[tokio::test]
    async fn test_find_by_matches_only_equal_values() {
        let mut db = database().await;
        let mut repo = db.repository();
        repo.insert_batch(&[Publisher::new("Penguin Books"), Publisher::new("Random House")]).await.unwrap();
        let found = repo.find_by::<Publisher>("name", "Random House").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Random House");
    }

    #[tokio::test]
    async fn test_shops_for_publisher_are_distinct() {
        let mut db = database().await;
        let mut repo = db.repository();
        let penguin = repo.insert(&Publisher::new("Penguin Books")).await.unwrap();
        let books = repo.insert_batch(&[Book::new("The Great Gatsby", penguin), Book::new("1984", penguin)]).await.unwrap();
        let shop = repo.insert(&Shop::new("City Bookstore")).await.unwrap();
        repo.insert_batch(&[Stock::new(books[0], shop, 15), Stock::new(books[1], shop, 12)]).await.unwrap();
        let shops = repo.shops_for_publisher("Penguin Books").await.unwrap();
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].id, shop);
    }

    #[tokio::test]
    async fn test_shops_for_publisher_binds_name() {
        let mut db = database().await;
        let mut repo = db.repository();
        let shops = repo.shops_for_publisher("x' OR '1'='1").await.unwrap();
        assert!(shops.is_empty());
    }

    #[tokio::test]
    async fn test_repository_after_close() {
        let mut db = database().await;
        db.close().await.unwrap();
        let mut repo = db.repository();
        let err = repo.insert(&Shop::new("City Bookstore")).await.unwrap_err();
        assert_eq!(*err, ErrorKind::NotConnected);
        let err = repo.list::<Shop>().await.unwrap_err();
        assert_eq!(*err, ErrorKind::NotConnected);
    }
}
