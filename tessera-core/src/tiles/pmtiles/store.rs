//! `PMTiles` archive store.

use std::fmt::{self, Debug, Formatter};
use std::path::Path;

use async_trait::async_trait;
use object_store::ObjectStore;
use pmtiles::{AsyncPmTilesReader, Compression, NoCache, ObjectStoreBackend, TileType};
use serde_json::Value;
use tessera_tile_utils::{Encoding, Format, TileCoord, TileInfo};
use tilejson::TileJSON;
use tracing::{trace, warn};
use url::Url;

use crate::tiles::pmtiles::PmtilesError;
use crate::tiles::{StoreKind, Tile, TileLookup, TileResult, TileStore};

/// Reads tiles from a `PMTiles` archive through an [`ObjectStore`].
///
/// Local files and HTTP(S) URLs are both supported. Tiles are returned exactly
/// as stored, with the encoding declared by the archive header.
pub struct PmtilesStore {
    locator: String,
    reader: AsyncPmTilesReader<ObjectStoreBackend, NoCache>,
    tile_info: TileInfo,
}

#[expect(clippy::missing_fields_in_debug)]
impl Debug for PmtilesStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PmtilesStore")
            .field("locator", &self.locator)
            .field("tile_info", &self.tile_info)
            .finish()
    }
}

impl PmtilesStore {
    /// Opens a local archive.
    pub async fn open_path(path: &Path) -> Result<Self, PmtilesError> {
        let path = path
            .canonicalize()
            .map_err(|e| PmtilesError::IoError(e, path.to_path_buf()))?;
        let url = Url::from_file_path(&path)
            .map_err(|()| PmtilesError::PathNotConvertibleToUrl(path.clone()))?;
        Self::open_url(&url).await
    }

    /// Opens an archive from a `file://`, `http://` or `https://` URL.
    pub async fn open_url(url: &Url) -> Result<Self, PmtilesError> {
        let (store, path) = object_store::parse_url(url)
            .map_err(|e| PmtilesError::ObjectStoreUrlParsing(e, url.to_string()))?;
        Self::new(url.to_string(), store, path).await
    }

    /// Opens an archive at `path` within an existing [`ObjectStore`].
    pub async fn new(
        locator: String,
        store: Box<dyn ObjectStore>,
        path: impl Into<object_store::path::Path>,
    ) -> Result<Self, PmtilesError> {
        let backend = ObjectStoreBackend::new(store, path.into());
        let reader = AsyncPmTilesReader::try_from_source(backend)
            .await
            .map_err(|e| PmtilesError::PmtErrorWithCtx(e, locator.clone()))?;

        let hdr = reader.get_header();
        let format = match hdr.tile_type {
            TileType::Mvt => Format::Mvt,
            TileType::Png => Format::Png,
            TileType::Jpeg => Format::Jpeg,
            TileType::Webp => Format::Webp,
            TileType::Unknown => return Err(PmtilesError::UnknownTileType(locator)),
        };
        let encoding = match hdr.tile_compression {
            Compression::Gzip => Encoding::Gzip,
            Compression::Brotli => Encoding::Brotli,
            Compression::Zstd => Encoding::Zstd,
            Compression::None | Compression::Unknown => {
                if hdr.tile_compression == Compression::Unknown {
                    warn!("Tiles of {locator} have unknown compression, assuming none");
                }
                TileInfo::from(format).encoding
            }
        };

        Ok(Self {
            locator,
            reader,
            tile_info: TileInfo::new(format, encoding),
        })
    }

    /// Format and encoding of every tile in the archive.
    #[must_use]
    pub fn tile_info(&self) -> TileInfo {
        self.tile_info
    }
}

#[async_trait]
impl TileStore for PmtilesStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Pmtiles
    }

    async fn fetch_info(&self) -> TileResult<TileJSON> {
        let mut tilejson = match self.reader.parse_tilejson(Vec::new()).await {
            Ok(tilejson) => tilejson,
            Err(e) => {
                warn!("{e:?}: Unable to parse metadata of {}", self.locator);
                self.reader.get_header().get_tilejson(Vec::new())
            }
        };
        tilejson.other.insert(
            "format".to_string(),
            Value::String(self.tile_info.format.extension().to_string()),
        );
        Ok(tilejson)
    }

    async fn fetch_tile(&self, xyz: TileCoord) -> TileResult<TileLookup> {
        let coord =
            pmtiles::TileCoord::new(xyz.z, xyz.x, xyz.y).map_err(PmtilesError::PmtError)?;
        let data = self
            .reader
            .get_tile(coord)
            .await
            .map_err(|e| PmtilesError::PmtErrorWithCtx(e, self.locator.clone()))?;

        Ok(if let Some(data) = data {
            TileLookup::Found(
                Tile::new(data.to_vec(), self.tile_info)
                    .with_header("content-type", self.tile_info.format.content_type()),
            )
        } else {
            trace!("Couldn't find tile data in {xyz:#} of {}", self.locator);
            TileLookup::Missing
        })
    }
}
