//! `MBTiles` `SQLite` store.

use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row as _, SqlitePool, query};
use tessera_tile_utils::{Encoding, Format, TileCoord, TileInfo};
use tilejson::TileJSON;
use tracing::{debug, trace};
use xxhash_rust::xxh3::xxh3_128;

use crate::tiles::mbtiles::MbtilesError;
use crate::tiles::{StoreKind, Tile, TileLookup, TileResult, TileStore};

/// Read-only connection pool for concurrent access to an `MBTiles` file.
///
/// Tile rows are addressed in the TMS scheme, so the requested row is flipped
/// before the lookup.
#[derive(Clone)]
pub struct MbtilesStore {
    path: PathBuf,
    pool: SqlitePool,
}

#[expect(clippy::missing_fields_in_debug)]
impl Debug for MbtilesStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MbtilesStore")
            .field("path", &self.path)
            .finish()
    }
}

/// `SQLite` and the `MBTiles` tooling report a missing tile or table this way.
fn is_missing_tile_error(err: &sqlx::Error) -> bool {
    err.to_string().contains("does not exist")
}

/// A query error that means the tile is absent becomes [`TileLookup::Missing`].
fn lookup_failure(err: sqlx::Error, xyz: TileCoord, path: &Path) -> TileResult<TileLookup> {
    if is_missing_tile_error(&err) {
        trace!("Tile {xyz:#} of {} does not exist: {err}", path.display());
        Ok(TileLookup::Missing)
    } else {
        Err(MbtilesError::QueryError(err, path.to_path_buf()).into())
    }
}

impl MbtilesStore {
    /// Opens an `MBTiles` file in read-only mode.
    pub async fn open(path: &Path) -> Result<Self, MbtilesError> {
        debug!("Opening as readonly {}", path.display());
        let opt = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePool::connect_with(opt)
            .await
            .map_err(|e| MbtilesError::OpenError(e, path.to_path_buf()))?;
        Ok(Self {
            path: path.to_path_buf(),
            pool,
        })
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TileStore for MbtilesStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Mbtiles
    }

    async fn fetch_info(&self) -> TileResult<TileJSON> {
        Ok(self.read_tilejson().await?)
    }

    async fn fetch_tile(&self, xyz: TileCoord) -> TileResult<TileLookup> {
        let row = query(
            "SELECT tile_data FROM tiles WHERE zoom_level = ? AND tile_column = ? AND tile_row = ?",
        )
        .bind(i64::from(xyz.z))
        .bind(i64::from(xyz.x))
        .bind(i64::from(xyz.tms_y()))
        .fetch_optional(&self.pool)
        .await;

        let row = match row {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(TileLookup::Missing),
            Err(e) => return lookup_failure(e, xyz, &self.path),
        };

        let data: Option<Vec<u8>> = row
            .try_get(0)
            .map_err(|e| MbtilesError::QueryError(e, self.path.clone()))?;
        let Some(data) = data else {
            return Ok(TileLookup::Empty);
        };

        let info =
            TileInfo::detect(&data).unwrap_or(TileInfo::new(Format::Mvt, Encoding::Uncompressed));
        let etag = xxh3_128(&data);
        Ok(TileLookup::Found(
            Tile::new(data, info)
                .with_header("content-type", info.format.content_type())
                .with_header("etag", format!("\"{etag:x}\"")),
        ))
    }

    async fn close(&self) {
        debug!("Closing {}", self.path.display());
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use sqlx::Error;

    use super::*;
    use crate::tiles::TileError;

    #[test]
    fn missing_tile_errors() {
        let path = Path::new("roads.mbtiles");
        let xyz = TileCoord::new(1, 0, 0);
        for msg in ["Tile does not exist", "table tiles does not exist"] {
            let lookup = lookup_failure(Error::Protocol(msg.into()), xyz, path);
            assert!(matches!(lookup, Ok(TileLookup::Missing)), "{msg}");
        }
        let lookup = lookup_failure(Error::Protocol("database is locked".into()), xyz, path);
        assert!(matches!(
            lookup,
            Err(TileError::MbtilesError(MbtilesError::QueryError(..)))
        ));
        assert!(lookup_failure(Error::PoolClosed, xyz, path).is_err());
    }
}
