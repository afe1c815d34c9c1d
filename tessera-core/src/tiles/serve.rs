use std::mem;

use tessera_tile_utils::{Encoding, Format, TileCoord, TileInfo, decode};
use tracing::debug;

use crate::tiles::format::VECTOR_FORMAT;
use crate::tiles::geojson::transcode_to_json;
use crate::tiles::{
    OutputFormat, StoreKind, Tile, TileError, TileLookup, TileRepository, TileResult, encode_tile,
    placeholder_tile, resolve_format, validate_address,
};

/// A single tile request, as parsed from `/data/{source_id}/{z}/{x}/{y}.{format}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    /// ID of the source
    pub source_id: String,
    /// Zoom level
    pub z: u64,
    /// Column
    pub x: u64,
    /// Row, counted from the north
    pub y: u64,
    /// Requested extension, possibly an alias
    pub format: String,
}

/// A successful answer to a [`TileRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum TileReply {
    /// Gzipped tile data with its response headers.
    Tile(Tile),
    /// The empty raster tile, sent in place of a missing `MBTiles` raster tile.
    Placeholder(Tile),
    /// A vector tile missing from an `MBTiles` source.
    NoContent,
}

fn decompress(mut tile: Tile, id: &str) -> TileResult<Tile> {
    let data = mem::take(&mut tile.data);
    tile.data = decode(data, tile.info.encoding)
        .map_err(|e| TileError::CompressionError(e, "decompress", id.to_string()))?;
    tile.info = tile.info.encoding(Encoding::Uncompressed);
    Ok(tile)
}

impl TileRepository {
    /// Runs a tile request through lookup, validation, format resolution, the backend
    /// fetch, the optional decoration and transcoding, and the final gzip encoding.
    ///
    /// Unknown sources, invalid formats, out of bounds addresses, and missing tiles are
    /// reported as errors for which [`TileError::is_expected`] is true.
    pub async fn serve_tile(&self, req: &TileRequest) -> TileResult<TileReply> {
        let result = self.serve_tile_unlogged(req).await;
        if let Err(e) = &result
            && e.is_expected()
        {
            debug!(
                "{}/{}/{}/{}.{}: {e}",
                req.source_id, req.z, req.x, req.y, req.format
            );
        }
        result
    }

    async fn serve_tile_unlogged(&self, req: &TileRequest) -> TileResult<TileReply> {
        let id = req.source_id.as_str();
        let record = self
            .get(id)
            .ok_or_else(|| TileError::UnknownSource(id.to_string()))?;

        let xyz = validate_address(req.z, req.x, req.y, record.zoom()).ok_or(
            TileError::OutOfBounds {
                z: req.z,
                x: req.x,
                y: req.y,
            },
        )?;

        let native = record.format();
        let output = resolve_format(&req.format, native, &self.options().format_aliases)
            .ok_or_else(|| TileError::InvalidFormat(req.format.clone()))?;

        let tile = match record.store().fetch_tile(xyz).await? {
            TileLookup::Found(tile) => tile,
            TileLookup::Missing if record.kind() == StoreKind::Mbtiles => {
                return if native == VECTOR_FORMAT {
                    Ok(TileReply::NoContent)
                } else {
                    let tile = placeholder_tile()
                        .map_err(|e| TileError::CompressionError(e, "compress", id.to_string()))?;
                    Ok(TileReply::Placeholder(tile))
                };
            }
            TileLookup::Missing | TileLookup::Empty => {
                return Err(TileError::NotFound(id.to_string(), xyz));
            }
        };

        let tile = self.transform(id, tile, xyz, native, output)?;
        let tile = encode_tile(tile, output.content_type(native))
            .map_err(|e| TileError::CompressionError(e, "compress", id.to_string()))?;
        Ok(TileReply::Tile(tile))
    }

    fn transform(
        &self,
        id: &str,
        mut tile: Tile,
        xyz: TileCoord,
        native: &str,
        output: OutputFormat,
    ) -> TileResult<Tile> {
        if native == VECTOR_FORMAT
            && let Some(decorator) = &self.options().decorator
        {
            tile = decompress(tile, id)?;
            tile.data = decorator.decorate_data(id, tile.data, xyz);
        }

        if output == OutputFormat::GeoJson {
            tile = decompress(tile, id)?;
            tile.data = transcode_to_json(&tile.data, xyz)?;
            tile.info = TileInfo::new(Format::Json, Encoding::Uncompressed);
        }
        Ok(tile)
    }
}
