use crate::error::{Error, Result};
use crate::models::{Entity, Id, Stored, Value};
use crate::schema::Table;

/// A book publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub name: String,
}
impl Publisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(sqlx::FromRow)]
pub struct PublisherRow {
    id: i64,
    name: String,
}
impl TryFrom<PublisherRow> for Stored<Publisher> {
    type Error = Error;
    fn try_from(row: PublisherRow) -> Result<Self> {
        Ok(Self {
            id: Id::new(row.id),
            entity: Publisher { name: row.name },
        })
    }
}

impl Entity for Publisher {
    const TABLE: Table = Table::Publisher;
    type Row = PublisherRow;

    fn values(&self) -> Vec<Value> {
        vec![Value::from(self.name.as_str())]
    }

    fn from_row(row: Self::Row) -> Result<Stored<Self>> {
        row.try_into()
    }
}
