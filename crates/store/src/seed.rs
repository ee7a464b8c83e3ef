//! Sample data set: three publishers, four books, three shops, their stock and
//! a first sale.

use crate::Repository;
use crate::error::Result;
use crate::models::{Book, Publisher, Sale, Shop, Stock};
use tracing::info;

/// Number of rows inserted per table by [`sample_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub publishers: usize,
    pub books: usize,
    pub shops: usize,
    pub stock: usize,
    pub sales: usize,
}
impl Summary {
    pub fn total(&self) -> usize {
        self.publishers + self.books + self.shops + self.stock + self.sales
    }
}

/// Insert the sample data set in a single transaction.
///
/// The tables must already exist. Running it twice inserts a second copy;
/// there are no uniqueness constraints on names.
pub async fn sample_data(repo: &mut Repository<'_>) -> Result<Summary> {
    let mut batch = repo.begin().await?;

    let penguin = batch.insert(&Publisher::new("Penguin Books")).await?;
    let harper = batch.insert(&Publisher::new("HarperCollins")).await?;
    let random_house = batch.insert(&Publisher::new("Random House")).await?;

    let gatsby = batch.insert(&Book::new("The Great Gatsby", penguin)).await?;
    let mockingbird = batch.insert(&Book::new("To Kill a Mockingbird", harper)).await?;
    let nineteen_eighty_four = batch.insert(&Book::new("1984", penguin)).await?;
    let pride = batch.insert(&Book::new("Pride and Prejudice", random_house)).await?;

    let city = batch.insert(&Shop::new("City Bookstore")).await?;
    let university = batch.insert(&Shop::new("University Books")).await?;
    let mall = batch.insert(&Shop::new("Mall Bookshop")).await?;

    let gatsby_at_city = batch.insert(&Stock::new(gatsby, city, 15)).await?;
    batch.insert(&Stock::new(mockingbird, city, 8)).await?;
    batch.insert(&Stock::new(nineteen_eighty_four, university, 12)).await?;
    batch.insert(&Stock::new(gatsby, mall, 5)).await?;
    batch.insert(&Stock::new(pride, university, 10)).await?;

    batch.insert(&Sale::new(29.99, "2024-01-15", gatsby_at_city, 2)).await?;

    let summary = Summary {
        publishers: 3,
        books: 4,
        shops: 3,
        stock: 5,
        sales: 1,
    };
    debug_assert_eq!(summary.total(), batch.len());
    batch.commit().await?;
    info!(rows = summary.total(), "inserted sample data");
    Ok(summary)
}
