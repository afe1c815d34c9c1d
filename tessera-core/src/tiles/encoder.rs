use std::io;
use std::mem;

use tessera_tile_utils::{Encoding, decode, encode_gzip};

use crate::tiles::Tile;

/// Prepares a tile for transmission.
///
/// The result is always gzip-compressed and carries `Content-Encoding: gzip`.
/// Data that is already gzipped is passed through byte for byte. Other transport
/// encodings are decoded first and then gzipped. Any backend `ETag` is dropped.
///
/// `content_type` replaces the backend `Content-Type` when given. Otherwise the
/// backend value is kept, falling back to the one implied by the tile format.
pub fn encode_tile(mut tile: Tile, content_type: Option<&str>) -> io::Result<Tile> {
    tile.remove_header("etag");

    if !tile.is_gzipped() {
        let data = mem::take(&mut tile.data);
        let raw = decode(data, tile.info.encoding)?;
        tile.data = encode_gzip(&raw)?;
        tile.info = tile.info.encoding(Encoding::Gzip);
    }

    if let Some(content_type) = content_type {
        tile.set_header("content-type", content_type);
    } else if tile.header("content-type").is_none() {
        tile.set_header("content-type", tile.info.format.content_type());
    }
    tile.set_header("content-encoding", "gzip");
    Ok(tile)
}
