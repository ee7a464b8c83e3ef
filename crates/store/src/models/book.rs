use crate::error::{Error, Result};
use crate::models::{Entity, Id, Publisher, Stored, Value};
use crate::schema::Table;

/// A book title, published by exactly one [`Publisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub publisher: Id<Publisher>,
}
impl Book {
    pub fn new(title: impl Into<String>, publisher: Id<Publisher>) -> Self {
        Self { title: title.into(), publisher }
    }
}

#[derive(sqlx::FromRow)]
pub struct BookRow {
    id: i64,
    title: String,
    publisher_id: i64,
}
impl TryFrom<BookRow> for Stored<Book> {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self> {
        Ok(Self {
            id: Id::new(row.id),
            entity: Book {
                title: row.title,
                publisher: Id::new(row.publisher_id),
            },
        })
    }
}

impl Entity for Book {
    const TABLE: Table = Table::Book;
    type Row = BookRow;

    fn values(&self) -> Vec<Value> {
        vec![Value::from(self.title.as_str()), Value::from(self.publisher)]
    }

    fn from_row(row: Self::Row) -> Result<Stored<Self>> {
        row.try_into()
    }
}
