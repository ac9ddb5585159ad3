use thiserror::Error;

/// A symbol a Qt filter cannot map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{filter}: Unknown symbol {symbol} of type {ty}")]
    UnknownType {
        filter: &'static str,
        symbol: String,
        ty: String,
    },

    #[error("{filter}: value in annotation for symbol {symbol} is supposed to be a {expected}")]
    Shape {
        filter: &'static str,
        symbol: String,
        expected: &'static str,
    },

    #[error(
        "{filter}: argument count in annotation for symbol {symbol} and number of struct fields does not match: Expected {expected} instead of {actual}"
    )]
    FieldCount {
        filter: &'static str,
        symbol: String,
        expected: usize,
        actual: usize,
    },

    #[error("{filter}: enum {name} has no members")]
    EmptyEnum { filter: &'static str, name: String },

    #[error("comment_text: The provided comment needs to be start with one of these strings: {0:?}")]
    NotAComment(&'static [&'static str]),

    #[error("symbol is not a module")]
    NotAModule,
}

impl From<MappingError> for minijinja::Error {
    fn from(err: MappingError) -> Self {
        minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, err.to_string())
    }
}
