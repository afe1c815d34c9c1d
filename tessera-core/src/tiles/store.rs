use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tessera_tile_utils::TileCoord;
use tilejson::TileJSON;

use crate::tiles::{Tile, TileResult};

/// Which storage backend a source is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Random-access `PMTiles` archive, local or over HTTP(S)
    Pmtiles,
    /// `MBTiles` `SQLite` container, local only
    Mbtiles,
}

impl Display for StoreKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pmtiles => "pmtiles",
            Self::Mbtiles => "mbtiles",
        })
    }
}

/// Outcome of a single tile lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum TileLookup {
    /// The tile exists.
    Found(Tile),
    /// The backend has no tile at this address.
    Missing,
    /// The backend has an entry for this address, but it carries no data.
    Empty,
}

/// Uniform access to a tile storage backend.
///
/// Implementations normalize every backend-specific way of saying "no such tile"
/// into [`TileLookup::Missing`]. Anything returned as an error is a real failure.
#[async_trait]
pub trait TileStore: Send + Sync + Debug {
    /// The backend variant.
    fn kind(&self) -> StoreKind;

    /// Reads the metadata document of the backend. Only used when a source is added.
    async fn fetch_info(&self) -> TileResult<TileJSON>;

    /// Reads the raw bytes of one tile, without decompressing them.
    async fn fetch_tile(&self, xyz: TileCoord) -> TileResult<TileLookup>;

    /// Releases the backend handle. Lookups issued afterwards may fail.
    async fn close(&self) {}
}

/// Shared tile store trait object.
pub type BoxedStore = Arc<dyn TileStore>;
