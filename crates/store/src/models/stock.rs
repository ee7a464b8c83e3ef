use crate::error::{Error, ErrorKind, Result};
use crate::models::{Book, Entity, Id, Shop, Stored, Value};
use crate::schema::Table;
use exn::ResultExt;

/// Number of copies of a [`Book`] held by a [`Shop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stock {
    pub book: Id<Book>,
    pub shop: Id<Shop>,
    pub count: u32,
}
impl Stock {
    pub fn new(book: Id<Book>, shop: Id<Shop>, count: u32) -> Self {
        Self { book, shop, count }
    }
}

#[derive(sqlx::FromRow)]
pub struct StockRow {
    id: i64,
    book_id: i64,
    shop_id: i64,
    count: i64,
}
impl TryFrom<StockRow> for Stored<Stock> {
    type Error = Error;
    fn try_from(row: StockRow) -> Result<Self> {
        Ok(Self {
            id: Id::new(row.id),
            entity: Stock {
                book: Id::new(row.book_id),
                shop: Id::new(row.shop_id),
                count: u32::try_from(row.count).or_raise(|| ErrorKind::InvalidData("stock count"))?,
            },
        })
    }
}

impl Entity for Stock {
    const TABLE: Table = Table::Stock;
    type Row = StockRow;

    fn values(&self) -> Vec<Value> {
        vec![Value::from(self.book), Value::from(self.shop), Value::from(self.count)]
    }

    fn from_row(row: Self::Row) -> Result<Stored<Self>> {
        row.try_into()
    }
}
