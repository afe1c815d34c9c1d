//! Error types for `PMTiles` operations.

use std::path::PathBuf;

use pmtiles::PmtError;

/// Errors that can occur when working with `PMTiles` archives.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum PmtilesError {
    /// Wrapper for underlying `PMTiles` library errors.
    #[error(transparent)]
    PmtError(#[from] PmtError),

    /// `PMTiles` error with additional context.
    #[error(r"PMTiles error {0:?} processing {1}")]
    PmtErrorWithCtx(#[source] PmtError, String),

    /// The archive location could not be turned into an object store.
    #[error("Failed to parse object store URL of {1}: {0}")]
    ObjectStoreUrlParsing(#[source] object_store::Error, String),

    /// A local archive path could not be expressed as a `file://` URL.
    #[error("Could not parse source path {} as a URL", .0.display())]
    PathNotConvertibleToUrl(PathBuf),

    /// IO error.
    #[error("IO error {0}: {path}", path = .1.display())]
    IoError(#[source] std::io::Error, PathBuf),

    /// Unknown tile type encountered while processing `PMTiles` archive.
    #[error("Unknown tile type of archive {0}")]
    UnknownTileType(String),
}
