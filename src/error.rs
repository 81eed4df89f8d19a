// src/error.rs
use std::fmt;

use thiserror::Error;

use crate::catalog::Field;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What an operation needed but did not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// A field that has to be selected first.
    Selection(Field),
    /// A cascading catalog that is stale or was never discovered.
    Options(Field),
    /// No view token yet: the session was never connected.
    ViewToken,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Selection(field) => write!(f, "a selected {field}"),
            Missing::Options(field) => write!(f, "fresh {field} options (refresh them first)"),
            Missing::ViewToken => f.write_str("a view token"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{operation} requires {missing}")]
    Precondition { operation: &'static str, missing: Missing },

    #[error("'{value}' is not a valid {field} option")]
    InvalidSelection { field: Field, value: String },

    #[error("index {index} is out of range for {field} ({len} options)")]
    IndexOutOfRange { field: Field, index: usize, len: usize },

    #[error("{field} takes a single value")]
    MultipleNotAllowed { field: Field },

    #[error("expected UI element '{element}' is missing from the response")]
    Extraction { element: String },

    #[error("malformed CSV envelope: expected two blank-line delimiters, found {found}")]
    EnvelopeFormat { found: usize },

    #[error("malformed partial response: {0}")]
    PartialResponse(#[from] quick_xml::Error),

    #[error("unsupported area level '{0}'")]
    UnsupportedArea(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn precondition(operation: &'static str, missing: Missing) -> Self {
        Error::Precondition { operation, missing }
    }

    pub(crate) fn extraction(element: impl Into<String>) -> Self {
        Error::Extraction { element: element.into() }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
