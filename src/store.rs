use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

use tracing::debug;

use crate::env::EnvSource;
use crate::error::Error;
use crate::model::ParseFlags;
use crate::parser;
use crate::value::FromValue;

/// Builder-style reader for dotenv files.
///
/// The defaults (no flags, process-environment lookups) fit most callers;
/// tests swap in [`EnvSource::from_memory`] to stay hermetic.
#[derive(Debug, Clone, Default)]
pub struct EnvReader {
    flags: ParseFlags,
    env: EnvSource,
}

impl EnvReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(mut self, flags: ParseFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn env_source(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Read and parse the file at `path` into a frozen table.
    ///
    /// Fails with [`Error::UnexpectedExtension`] when the file-name check is
    /// enabled and the path lacks the `.env` marker, or [`Error::Io`] when
    /// the file cannot be read. Malformed content never fails.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<EnvTable, Error> {
        let path = path.as_ref();
        if !self.flags.contains(ParseFlags::NO_CHECK_EXT) && !EnvTable::is_env_file(path) {
            let extension = path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(Error::UnexpectedExtension { extension });
        }

        let input = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "parsing dotenv file");
        Ok(self.read_str(&input))
    }

    /// Parse already-read content. Infallible: the extension check does not
    /// apply and malformed lines are skipped.
    pub fn read_str(&self, input: &str) -> EnvTable {
        EnvTable {
            entries: parser::parse_source(input, self.flags, &self.env),
            flags: self.flags,
        }
    }
}

/// An immutable key/value table parsed from dotenv content.
///
/// Built once at construction and read-only afterward; replacing the whole
/// table is the only mutation. Concurrent reads are safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvTable {
    entries: HashMap<String, String>,
    flags: ParseFlags,
}

impl EnvTable {
    /// File-name marker required by the extension check.
    pub const FILE_MARKER: &'static str = ".env";

    /// Read `path` with default flags and the process environment.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        EnvReader::new().read(path)
    }

    /// Read `path` with explicit flags.
    pub fn from_path_with(path: impl AsRef<Path>, flags: ParseFlags) -> Result<Self, Error> {
        EnvReader::new().flags(flags).read(path)
    }

    /// Whether the file name carries the `.env` marker, case-insensitively
    /// and anywhere in the name, so `.env.production` and `local.ENV` both
    /// qualify.
    pub fn is_env_file(path: impl AsRef<Path>) -> bool {
        path.as_ref()
            .file_name()
            .and_then(OsStr::to_str)
            .is_some_and(|name| name.to_ascii_lowercase().contains(Self::FILE_MARKER))
    }

    /// Exact-match key lookup.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up `key` and coerce its value into `T`.
    ///
    /// Fails with [`Error::NotFound`] for an absent key or
    /// [`Error::Coercion`] when the stored text does not parse as `T`;
    /// neither affects the table or other keys.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T, Error> {
        let value = self.entries.get(key).ok_or_else(|| Error::NotFound {
            key: key.to_owned(),
        })?;
        T::parse_value(value).ok_or_else(|| Error::Coercion {
            value: value.clone(),
            target: T::TYPE_NAME,
            expected: T::EXPECTED,
        })
    }

    /// Like [`EnvTable::get`], but returns `default` on any failure.
    pub fn get_or<T: FromValue>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Like [`EnvTable::get`], but folds every failure into `None`.
    pub fn try_get<T: FromValue>(&self, key: &str) -> Option<T> {
        self.get(key).ok()
    }

    /// Borrow the stored text for `key` without coercion.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The flags this table was parsed with.
    pub fn flags(&self) -> ParseFlags {
        self.flags
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
