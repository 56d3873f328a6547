use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by table construction and typed lookup.
///
/// Malformed lines are not represented here: the parser skips them and keeps
/// going. A [`Error::Coercion`] for one key leaves the table and every other
/// key intact.
#[derive(Debug, Error)]
pub enum Error {
    /// The file-name check was enabled and the path does not carry the
    /// `.env` marker.
    #[error("expected a .env file but got extension {extension:?}")]
    UnexpectedExtension { extension: String },

    /// A non-defaulted lookup on a key the table does not hold.
    #[error("key {key:?} does not exist")]
    NotFound { key: String },

    /// The stored text could not be parsed into the requested type.
    #[error("failed to coerce {value:?} into {target}{}", display_expected(.expected))]
    Coercion {
        value: String,
        target: &'static str,
        expected: Option<&'static str>,
    },

    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether this is a lookup miss rather than a hard failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn display_expected(expected: &Option<&'static str>) -> String {
    match expected {
        Some(values) => format!(", expected one of: {values}"),
        None => String::new(),
    }
}
