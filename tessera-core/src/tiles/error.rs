use std::path::PathBuf;

use tessera_tile_utils::TileCoord;

/// Errors that can occur while registering tile sources or serving tiles.
///
/// The first four variants are expected outcomes of a tile request and are
/// never logged as failures. See [`TileError::is_expected`].
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum TileError {
    /// No source is registered under the requested id.
    #[error("Source {0} does not exist")]
    UnknownSource(String),

    /// The requested extension is neither the native format of the source
    /// nor an accepted conversion.
    #[error("Invalid format")]
    InvalidFormat(String),

    /// The tile address is outside of the source zoom range or the `2^z` grid.
    #[error("Out of bounds")]
    OutOfBounds {
        /// Requested zoom
        z: u64,
        /// Requested column
        x: u64,
        /// Requested row
        y: u64,
    },

    /// The backend has no data for this tile.
    #[error("Not found")]
    NotFound(String, TileCoord),

    /// Errors raised by the [`pmtiles`](crate::tiles::pmtiles) backend.
    #[error(transparent)]
    PmtilesError(#[from] super::pmtiles::PmtilesError),

    /// Errors raised by the [`mbtiles`](crate::tiles::mbtiles) backend.
    #[error(transparent)]
    MbtilesError(#[from] super::mbtiles::MbtilesError),

    /// Errors raised while converting a vector tile to [`geojson`](crate::tiles::geojson).
    #[error(transparent)]
    TranscodeError(#[from] super::geojson::TranscodeError),

    /// Tile bytes could not be compressed or decompressed.
    #[error("Unable to {1} tile data of source {2}: {0}")]
    CompressionError(#[source] std::io::Error, &'static str, String),

    /// The `TileJSON` document of a source could not be built.
    #[error("Unable to assemble TileJSON of source {1}: {0}")]
    InvalidTileJson(#[source] serde_json::Error, String),

    /// A source is configured in a way that can never work, e.g. an `MBTiles` file given as a URL.
    #[error("{0}")]
    ConfigurationError(String),

    /// A local source file is missing, is not a regular file, or is empty.
    #[error("Not valid input file: \"{}\"", .0.display())]
    InvalidSourceFile(PathBuf),
}

impl TileError {
    /// True for the common-path outcomes of a tile request: unknown source,
    /// invalid format, out of bounds, and missing tile.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::UnknownSource(_)
                | Self::InvalidFormat(_)
                | Self::OutOfBounds { .. }
                | Self::NotFound(..)
        )
    }
}

/// A convenience [`Result`] for tile operations of `tessera-core`.
pub type TileResult<T> = Result<T, TileError>;
