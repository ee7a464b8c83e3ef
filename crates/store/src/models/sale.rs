use crate::error::{Error, ErrorKind, Result};
use crate::models::{Entity, Id, Stock, Stored, Value};
use crate::schema::Table;
use exn::ResultExt;

/// A sale of one or more copies out of a [`Stock`] row.
///
/// `date_sale` is kept as the text the caller supplied (the sample data uses
/// ISO-8601 dates, e.g. `2024-01-15`).
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub price: f64,
    pub date_sale: String,
    pub stock: Id<Stock>,
    pub count: u32,
}
impl Sale {
    pub fn new(price: f64, date_sale: impl Into<String>, stock: Id<Stock>, count: u32) -> Self {
        Self { price, date_sale: date_sale.into(), stock, count }
    }
}

#[derive(sqlx::FromRow)]
pub struct SaleRow {
    id: i64,
    price: f64,
    date_sale: String,
    stock_id: i64,
    count: i64,
}
impl TryFrom<SaleRow> for Stored<Sale> {
    type Error = Error;
    fn try_from(row: SaleRow) -> Result<Self> {
        Ok(Self {
            id: Id::new(row.id),
            entity: Sale {
                price: row.price,
                date_sale: row.date_sale,
                stock: Id::new(row.stock_id),
                count: u32::try_from(row.count).or_raise(|| ErrorKind::InvalidData("sale count"))?,
            },
        })
    }
}

impl Entity for Sale {
    const TABLE: Table = Table::Sale;
    type Row = SaleRow;

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.price),
            Value::from(self.date_sale.as_str()),
            Value::from(self.stock),
            Value::from(self.count),
        ]
    }

    fn from_row(row: Self::Row) -> Result<Stored<Self>> {
        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_to_values() {
        let sale = Sale::new(29.99, "2024-01-15", Id::new(1), 2);
        assert_eq!(
            sale.values(),
            vec![
                Value::Real(29.99),
                Value::Text("2024-01-15".to_string()),
                Value::Integer(1),
                Value::Integer(2),
            ]
        );
    }

    #[test]
    fn test_row_to_model() {
        let row = SaleRow {
            id: 9,
            price: 12.5,
            date_sale: "2024-02-01".to_string(),
            stock_id: 3,
            count: 1,
        };
        let stored = Stored::<Sale>::try_from(row).unwrap();
        assert_eq!(stored.id.get(), 9);
        assert_eq!(stored.stock, Id::new(3));
        assert_eq!(stored.date_sale, "2024-02-01");
    }
}
