use crate::error::{ErrorKind, Result};
use crate::models::Id;
use exn::ResultExt;
use sqlx::Arguments;
use sqlx::any::AnyArguments;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A single column value, bound as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
}
impl Value {
    fn add_to<'q>(self, args: &mut AnyArguments<'q>) -> Result<()> {
        match self {
            Self::Integer(v) => args.add(v),
            Self::Real(v) => args.add(v),
            Self::Text(v) => args.add(v),
        }
        .map_err(sqlx::Error::Encode)
        .or_raise(|| ErrorKind::Query)
    }
}
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Integer(v) => Display::fmt(v, f),
            Self::Real(v) => Display::fmt(v, f),
            Self::Text(v) => write!(f, "{v:?}"),
        }
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}
impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
impl<E> From<Id<E>> for Value {
    fn from(id: Id<E>) -> Self {
        Self::Integer(id.get())
    }
}

/// Collect values into positional (`$1`, `$2`, ...) query arguments.
pub(crate) fn arguments<'q>(values: impl IntoIterator<Item = Value>) -> Result<AnyArguments<'q>> {
    let mut args = AnyArguments::default();
    for value in values {
        value.add_to(&mut args)?;
    }
    Ok(args)
}
