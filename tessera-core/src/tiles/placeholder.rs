use std::io;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tessera_tile_utils::{Encoding, Format, TileInfo, encode_gzip};

use crate::tiles::Tile;

/// Fully transparent 256x256 PNG.
const EMPTY_PNG_TILE_256: &str = "iVBORw0KGgoAAAANSUhEUgAAAQAAAAEACAQAAAD2e2DtAAABu0lEQVR42u3SQREAAAzCsOHf9F6oIJXQS07TxQIABIAAEAACQAAIAAEgAASAABAAAkAACAABIAAEgAAQAAJAAAgAASAABIAAEAACQAAIAAEgAASAABAAAkAACAABIAAEgAAQAAJAAAgAASAABIAAEAACQAAIAAEgAASAABAAAkAACAABIAAEgAAQAAJAAAgAASAABIAAEAACQAAIAAEgAASAABAAAgAACwAQAAJAAAgAASAABIAAEAACQAAIAAEgAASAABAAAkAACAABIAAEgAAQAAJAAAgAASAABIAAEAACQAAIAAEgAASAABAAAkAACAABIAAEgAAQAAJAAAgAASAABIAAEAACQAAIAAEgAASAABAAAkAACAABIAAEgAAQAAJAAAgAASAABIAAEAACQAAIAAAsAEAACAABIAAEgAAQAAJAAAgAASAABIAAEAACQAAIAAEgAASAABAAAkAACAABIAAEgAAQAAJAAAgAASAABIAAEAACQAAIAAEgAASAABAAAkAACAABIAAEgAAQAAJAAAgAASAABIAAEAACQAAIAAEgAASAABAAAkAACAABIAAEgAAQAAJAAKg9kK0BATSHu+YAAAAASUVORK5CYII=";

static PLACEHOLDER: LazyLock<Result<Vec<u8>, String>> = LazyLock::new(|| {
    let png = STANDARD
        .decode(EMPTY_PNG_TILE_256)
        .map_err(|e| e.to_string())?;
    encode_gzip(&png).map_err(|e| e.to_string())
});

/// The empty raster tile served when an `MBTiles` raster source has no tile at an address.
///
/// The PNG is gzip-compressed once per process and carries
/// `Content-Type: image/png` and `Content-Encoding: gzip`.
pub fn placeholder_tile() -> Result<Tile, io::Error> {
    let data = PLACEHOLDER
        .as_ref()
        .map_err(|e| io::Error::other(e.clone()))?;
    Ok(Tile::new(data.clone(), TileInfo::new(Format::Png, Encoding::Gzip))
        .with_header("content-type", Format::Png.content_type())
        .with_header("content-encoding", "gzip"))
}
