use std::collections::BTreeMap;

use tessera_tile_utils::{Encoding, TileData, TileInfo};

/// HTTP-style response headers of a tile, keyed by lowercase header name.
pub type TileHeaders = BTreeMap<String, String>;

/// A single tile with its raw data, format and encoding, and response headers.
///
/// Produced by a [`TileStore`](crate::tiles::TileStore) and rewritten by
/// [`encode_tile`](crate::tiles::encode_tile) before it is sent. A tile is never
/// cached across requests.
///
/// # Examples
///
/// ```rust
/// use tessera_core::tiles::Tile;
/// use tessera_tile_utils::{Encoding, Format, TileInfo};
///
/// let data = vec![0x1f, 0x8b, 0x08, 0x00];
/// let tile = Tile::new(data, TileInfo::new(Format::Mvt, Encoding::Gzip))
///     .with_header("Content-Type", "application/x-protobuf");
/// assert!(tile.is_gzipped());
/// assert_eq!(tile.header("content-type"), Some("application/x-protobuf"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Raw tile data as bytes (PNG, MVT, etc.)
    pub data: TileData,
    /// Metadata about the tile's format and encoding
    pub info: TileInfo,
    /// Response headers supplied by the backend or the encoder
    pub headers: TileHeaders,
}

impl Tile {
    /// Creates a new tile with no headers.
    #[must_use]
    pub fn new(data: TileData, info: TileInfo) -> Self {
        Self {
            data,
            info,
            headers: TileHeaders::new(),
        }
    }

    /// Sets a header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets a header, replacing any previous value. Names are case-insensitive.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Removes a header. Names are case-insensitive.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_ascii_lowercase())
    }

    /// Returns the value of a header. Names are case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// True if the data is already gzip-compressed.
    #[must_use]
    pub fn is_gzipped(&self) -> bool {
        self.info.encoding == Encoding::Gzip
    }
}
