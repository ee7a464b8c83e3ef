//! Entity types and their row mappings.
//!
//! Entities never embed each other: a belongs-to relationship is an [`Id`] of
//! the referenced entity, resolved with a separate
//! [`get`](crate::Repository::get) when needed.

mod book;
mod publisher;
mod sale;
mod shop;
mod stock;
mod value;

pub use self::book::Book;
pub use self::publisher::Publisher;
pub use self::sale::Sale;
pub use self::shop::Shop;
pub(crate) use self::shop::ShopRow;
pub use self::stock::Stock;
pub use self::value::Value;
pub(crate) use self::value::arguments;
use crate::error::Result;
use crate::schema::Table;
use sqlx::any::AnyRow;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;

/// Store-assigned identifier of an entity of type `E`.
///
/// The type parameter only exists at compile time; it stops an `Id<Book>`
/// from being used where an `Id<Shop>` is expected.
pub struct Id<E> {
    value: i64,
    entity: PhantomData<fn() -> E>,
}
impl<E> Id<E> {
    pub const fn new(value: i64) -> Self {
        Self { value, entity: PhantomData }
    }

    pub const fn get(&self) -> i64 {
        self.value
    }
}
impl<E> Clone for Id<E> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<E> Copy for Id<E> {}
impl<E> PartialEq for Id<E> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl<E> Eq for Id<E> {}
impl<E> PartialOrd for Id<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<E> Ord for Id<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}
impl<E> Hash for Id<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}
impl<E> Debug for Id<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Id({})", self.value)
    }
}
impl<E> Display for Id<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.value, f)
    }
}

/// An entity as read back from the store, together with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<E> {
    pub id: Id<E>,
    pub entity: E,
}
impl<E> Deref for Stored<E> {
    type Target = E;
    fn deref(&self) -> &Self::Target {
        &self.entity
    }
}

/// Mapping between an entity and its table.
///
/// [`values`](Entity::values) must yield one value per column of
/// [`Table::columns`], in the same order; the row type must decode the `id`
/// column plus every declared column.
pub trait Entity: Sized + Send + Sync {
    const TABLE: Table;
    type Row: for<'r> sqlx::FromRow<'r, AnyRow> + Send + Unpin;

    /// Column values for an insert.
    fn values(&self) -> Vec<Value>;

    /// Convert a decoded row back into the entity.
    fn from_row(row: Self::Row) -> Result<Stored<Self>>;
}
