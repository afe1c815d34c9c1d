use std::fmt::Debug;
use std::sync::Arc;

use tessera_tile_utils::{TileCoord, TileData};
use tilejson::TileJSON;

/// Pluggable hook that can rewrite metadata and vector tile data of a source.
///
/// It is called at exactly two points:
/// - once per source, after its `TileJSON` has been assembled and before it is stored
/// - for every vector tile, after the fetch and before any `GeoJSON` conversion.
///   The data it receives is always decompressed.
///
/// Both methods return their input unchanged by default.
pub trait TileDecorator: Send + Sync + Debug {
    /// Rewrites the assembled `TileJSON` of the source `id`.
    fn decorate_tilejson(&self, id: &str, tilejson: TileJSON) -> TileJSON {
        let _ = id;
        tilejson
    }

    /// Rewrites the decompressed vector tile `data` of the source `id` at `xyz`.
    fn decorate_data(&self, id: &str, data: TileData, xyz: TileCoord) -> TileData {
        let _ = (id, xyz);
        data
    }
}

/// Shared decorator trait object.
pub type BoxedDecorator = Arc<dyn TileDecorator>;
