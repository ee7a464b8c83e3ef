//! Static table/column mapping for the bookshop schema.
//!
//! Everything that touches SQL identifiers (DDL, insert statements, select
//! lists and the column whitelist for [`find_by`](crate::Repository::find_by))
//! is derived from the tables declared here, so a column only has to be named
//! once.

use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// SQL flavour spoken by the connected store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Sqlite,
    Postgres,
}
impl Dialect {
    fn primary_key(&self) -> &'static str {
        match self {
            Self::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
            Self::Postgres => "BIGSERIAL PRIMARY KEY",
        }
    }

    fn column_type(&self, kind: ColumnKind) -> &'static str {
        match (self, kind) {
            (_, ColumnKind::Text) => "TEXT",
            (Self::Sqlite, ColumnKind::Count | ColumnKind::ForeignKey(_)) => "INTEGER",
            (Self::Postgres, ColumnKind::Count | ColumnKind::ForeignKey(_)) => "BIGINT",
            (Self::Sqlite, ColumnKind::Real) => "REAL",
            (Self::Postgres, ColumnKind::Real) => "DOUBLE PRECISION",
        }
    }

    /// Catalog query returning the number of tables matching `$1`.
    pub(crate) fn table_exists_query(&self) -> &'static str {
        match self {
            Self::Sqlite => include_str!("../queries/table_exists_sqlite.sql"),
            Self::Postgres => include_str!("../queries/table_exists_postgres.sql"),
        }
    }
}
impl Display for Dialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        })
    }
}

/// Storage class of a non-key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Text,
    Real,
    /// Non-negative integer, enforced with a `CHECK` constraint.
    Count,
    /// Identifier of a row in another table.
    ForeignKey(Table),
}

/// A non-key column of a table. Every table also has an `id` primary key,
/// which is not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}
const fn column(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

const PUBLISHER: &[Column] = &[column("name", ColumnKind::Text)];
const BOOK: &[Column] = &[
    column("title", ColumnKind::Text),
    column("publisher_id", ColumnKind::ForeignKey(Table::Publisher)),
];
const SHOP: &[Column] = &[column("name", ColumnKind::Text)];
const STOCK: &[Column] = &[
    column("book_id", ColumnKind::ForeignKey(Table::Book)),
    column("shop_id", ColumnKind::ForeignKey(Table::Shop)),
    column("count", ColumnKind::Count),
];
const SALE: &[Column] = &[
    column("price", ColumnKind::Real),
    column("date_sale", ColumnKind::Text),
    column("stock_id", ColumnKind::ForeignKey(Table::Stock)),
    column("count", ColumnKind::Count),
];

/// The five tables of the bookshop schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Publisher,
    Book,
    Shop,
    Stock,
    Sale,
}
impl Table {
    /// All tables, ordered so that every table comes after the tables it
    /// references.
    pub const ALL: [Self; 5] = [Self::Publisher, Self::Book, Self::Shop, Self::Stock, Self::Sale];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Publisher => "publisher",
            Self::Book => "book",
            Self::Shop => "shop",
            Self::Stock => "stock",
            Self::Sale => "sale",
        }
    }

    /// Non-key columns, in insert order.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Self::Publisher => PUBLISHER,
            Self::Book => BOOK,
            Self::Shop => SHOP,
            Self::Stock => STOCK,
            Self::Sale => SALE,
        }
    }

    /// Resolve a user-supplied column name against the declared columns
    /// (including `id`), returning the canonical static name.
    pub fn column(&self, name: &str) -> Option<&'static str> {
        if name.eq_ignore_ascii_case("id") {
            return Some("id");
        }
        self.columns().iter().find(|c| c.name.eq_ignore_ascii_case(name)).map(|c| c.name)
    }
}
impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}
impl FromStr for Table {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| exn::Exn::from(ErrorKind::UnknownTable(s.to_string())))
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement for a table.
pub(crate) fn create_table(table: Table, dialect: Dialect) -> String {
    let mut definitions = vec![format!("id {}", dialect.primary_key())];
    let mut foreign_keys = Vec::new();
    for column in table.columns() {
        let sql_type = dialect.column_type(column.kind);
        match column.kind {
            ColumnKind::Count => {
                definitions.push(format!("{0} {sql_type} NOT NULL CHECK ({0} >= 0)", column.name));
            },
            ColumnKind::ForeignKey(parent) => {
                definitions.push(format!("{} {sql_type} NOT NULL", column.name));
                foreign_keys.push(format!("FOREIGN KEY ({}) REFERENCES {} (id)", column.name, parent.name()));
            },
            ColumnKind::Text | ColumnKind::Real => {
                definitions.push(format!("{} {sql_type} NOT NULL", column.name));
            },
        }
    }
    definitions.extend(foreign_keys);
    format!("CREATE TABLE IF NOT EXISTS {} (\n    {}\n)", table.name(), definitions.join(",\n    "))
}

/// Parameterised insert returning the assigned identifier.
pub(crate) fn insert_statement(table: Table) -> String {
    let columns = table.columns();
    let names = columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", ");
    let placeholders = (1..=columns.len()).map(|n| format!("${n}")).collect::<Vec<_>>().join(", ");
    format!("INSERT INTO {} ({names}) VALUES ({placeholders}) RETURNING id", table.name())
}

/// `SELECT` of every column of a table, without any clauses.
pub(crate) fn select_statement(table: Table) -> String {
    let mut names = vec!["id"];
    names.extend(table.columns().iter().map(|c| c.name));
    format!("SELECT {} FROM {}", names.join(", "), table.name())
}
