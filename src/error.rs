//! Binary Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("database operation failed")]
    Store,
    /// The table named on the command line is not present in the database.
    #[display("table does not exist: {_0}")]
    MissingTable(#[error(not(source))] String),
    #[display("could not read publisher name from standard input")]
    Input,
    #[display("could not write to standard output")]
    Output,
}
