use crate::error::{Error, Result};
use crate::models::{Entity, Id, Stored, Value};
use crate::schema::Table;

/// A shop that stocks books.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shop {
    pub name: String,
}
impl Shop {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(sqlx::FromRow)]
pub struct ShopRow {
    id: i64,
    name: String,
}
impl TryFrom<ShopRow> for Stored<Shop> {
    type Error = Error;
    fn try_from(row: ShopRow) -> Result<Self> {
        Ok(Self {
            id: Id::new(row.id),
            entity: Shop { name: row.name },
        })
    }
}

impl Entity for Shop {
    const TABLE: Table = Table::Shop;
    type Row = ShopRow;

    fn values(&self) -> Vec<Value> {
        vec![Value::from(self.name.as_str())]
    }

    fn from_row(row: Self::Row) -> Result<Stored<Self>> {
        row.try_into()
    }
}
