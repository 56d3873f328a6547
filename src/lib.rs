//! Parse `.env` configuration files into typed, read-only tables.
//!
//! [`EnvTable::from_path`] reads and fully resolves a file in one pass:
//! quoting, escaping, multi-line literals, inline comments and POSIX-style
//! `$VAR` / `${VAR}` / `${VAR:-default}` interpolation against the process
//! environment and earlier entries in the same file. Malformed lines are
//! skipped, never fatal.
//!
//! The resulting table is immutable; values come back typed through
//! [`EnvTable::get`] and friends. [`EnvReader`] exposes the parse flags and
//! lets tests substitute an in-memory environment via [`EnvSource`].

mod env;
mod error;
mod interp;
mod model;
mod parser;
mod scan;
mod store;
mod value;

pub use env::EnvSource;
pub use error::Error;
pub use model::ParseFlags;
pub use store::{EnvReader, EnvTable};
pub use value::FromValue;
