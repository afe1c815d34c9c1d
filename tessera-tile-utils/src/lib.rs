//! Tile format and compression detection, tile coordinates, and the
//! tile-to-geographic projection shared by the Tessera crates.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

mod decoders;
pub use decoders::*;

mod projection;
pub use projection::*;

/// Raw tile bytes, as stored by a backend.
pub type TileData = Vec<u8>;

/// Zoom level of a tile
pub type ZoomLevel = u8;

/// The highest zoom level any tile source may declare.
pub const MAX_ZOOM: ZoomLevel = 30;

/// Address of a single tile in the XYZ grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: ZoomLevel,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    #[must_use]
    pub fn new(z: ZoomLevel, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Row index in the TMS scheme, where row 0 is at the bottom of the grid.
    #[must_use]
    pub fn tms_y(&self) -> u32 {
        let last_row = 1_u32
            .checked_shl(u32::from(self.z))
            .map_or(u32::MAX, |rows| rows - 1);
        last_row.saturating_sub(self.y)
    }
}

impl Display for TileCoord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}/{}/{}", self.z, self.x, self.y)
        } else {
            write!(f, "{},{},{}", self.z, self.x, self.y)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Avif,
    Gif,
    Jpeg,
    Json,
    Mvt,
    Png,
    Webp,
}

impl Format {
    /// Parse a `TileJSON` `format` value or a file extension.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.to_ascii_lowercase().as_str() {
            "avif" => Self::Avif,
            "gif" => Self::Gif,
            "jpg" | "jpeg" => Self::Jpeg,
            "json" => Self::Json,
            "pbf" | "mvt" => Self::Mvt,
            "png" => Self::Png,
            "webp" => Self::Webp,
            _ => None?,
        })
    }

    /// The token used for this format in `TileJSON` documents and tile URLs.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match *self {
            Self::Avif => "avif",
            Self::Gif => "gif",
            Self::Jpeg => "jpg",
            Self::Json => "json",
            Self::Mvt => "pbf",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match *self {
            Self::Avif => "image/avif",
            Self::Gif => "image/gif",
            Self::Jpeg => "image/jpeg",
            Self::Json => "application/json",
            Self::Mvt => "application/x-protobuf",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    #[must_use]
    pub fn is_raster(&self) -> bool {
        match *self {
            Self::Avif | Self::Gif | Self::Jpeg | Self::Png | Self::Webp => true,
            Self::Json | Self::Mvt => false,
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// Data is not compressed, but it can be
    #[default]
    Uncompressed,
    /// Some formats like JPEG and PNG are already compressed
    Internal,
    Gzip,
    Zlib,
    Brotli,
    Zstd,
}

impl Encoding {
    /// Value of the `Content-Encoding` header for this encoding, if any.
    #[must_use]
    pub fn content_encoding(&self) -> Option<&'static str> {
        match *self {
            Self::Uncompressed | Self::Internal => None,
            Self::Gzip => Some("gzip"),
            Self::Zlib => Some("deflate"),
            Self::Brotli => Some("br"),
            Self::Zstd => Some("zstd"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileInfo {
    pub format: Format,
    pub encoding: Encoding,
}

impl TileInfo {
    #[must_use]
    pub fn new(format: Format, encoding: Encoding) -> Self {
        Self { format, encoding }
    }

    /// Try to figure out the format and encoding of the raw tile data.
    ///
    /// Compressed payloads are assumed to be vector tiles.
    #[must_use]
    pub fn detect(value: &[u8]) -> Option<Self> {
        Some(match value {
            v if v.starts_with(b"\x1f\x8b") => Self::new(Format::Mvt, Encoding::Gzip),
            v if v.starts_with(b"\x78\x9c") => Self::new(Format::Mvt, Encoding::Zlib),
            v if v.starts_with(b"\x89\x50\x4E\x47\x0D\x0A\x1A\x0A") => {
                Self::new(Format::Png, Encoding::Internal)
            }
            v if v.starts_with(b"\x47\x49\x46\x38\x39\x61") => {
                Self::new(Format::Gif, Encoding::Internal)
            }
            v if v.starts_with(b"\xFF\xD8\xFF") => Self::new(Format::Jpeg, Encoding::Internal),
            v if v.starts_with(b"RIFF") && v.get(8..12) == Some(b"WEBP".as_slice()) => {
                Self::new(Format::Webp, Encoding::Internal)
            }
            v if v.get(4..12) == Some(b"ftypavif".as_slice()) => {
                Self::new(Format::Avif, Encoding::Internal)
            }
            v if v.starts_with(b"{") => Self::new(Format::Json, Encoding::Uncompressed),
            _ => None?,
        })
    }

    #[must_use]
    pub fn encoding(self, encoding: Encoding) -> Self {
        Self { encoding, ..self }
    }
}

impl From<Format> for TileInfo {
    fn from(format: Format) -> Self {
        Self::new(
            format,
            if format.is_raster() {
                Encoding::Internal
            } else {
                Encoding::Uncompressed
            },
        )
    }
}

impl Display for TileInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format.content_type())?;
        if let Some(encoding) = self.encoding.content_encoding() {
            write!(f, "; encoding={encoding}")?;
        }
        Ok(())
    }
}
