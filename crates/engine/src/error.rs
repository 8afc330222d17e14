use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorError {
    /// The lookup service failed to answer a request.
    Lookup { column: String, message: String },
    /// A lookup was requested for a column that has no lookup descriptor.
    NotALookup(String),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookup { column, message } => {
                write!(f, "lookup for column '{column}' failed: {message}")
            }
            Self::NotALookup(column) => write!(f, "column '{column}' is not a lookup column"),
        }
    }
}

impl std::error::Error for EditorError {}
