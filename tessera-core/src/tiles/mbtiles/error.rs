//! Error types for `MBTiles` operations.

use std::path::PathBuf;

/// Errors that can occur when reading `MBTiles` files.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum MbtilesError {
    /// The `SQLite` file could not be opened.
    #[error("Unable to open MBTiles file {path}: {0}", path = .1.display())]
    OpenError(#[source] sqlx::Error, PathBuf),

    /// A query against the `SQLite` file failed.
    #[error("MBTiles query failed in {path}: {0}", path = .1.display())]
    QueryError(#[source] sqlx::Error, PathBuf),
}
