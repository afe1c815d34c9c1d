use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_tile_utils::Format;
use tilejson::TileJSON;
use tracing::{debug, info};
use url::Url;

use crate::tiles::catalog::{CatalogSourceEntry, TileCatalog};
use crate::tiles::format::VECTOR_FORMAT;
use crate::tiles::mbtiles::MbtilesStore;
use crate::tiles::pmtiles::PmtilesStore;
use crate::tiles::{
    BoxedDecorator, BoxedStore, FormatAliases, StoreKind, TileError, TileResult, TileUrlContext,
    ZoomRange, assemble_tilejson, tile_urls,
};

/// Base directories for relative source locators.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePaths {
    /// Directory of `PMTiles` archives
    pub pmtiles: Option<PathBuf>,
    /// Directory of `MBTiles` files
    pub mbtiles: Option<PathBuf>,
}

/// Settings shared by all sources of a [`TileRepository`].
#[derive(Clone, Debug, Default)]
pub struct RepositoryOptions {
    /// Base directories for relative locators
    pub paths: SourcePaths,
    /// Default `tiles` domains for sources that do not define their own
    pub domains: Vec<String>,
    /// Alternative request extensions
    pub format_aliases: FormatAliases,
    /// Optional hook applied to every `TileJSON` and vector tile
    pub decorator: Option<BoxedDecorator>,
}

/// How to register a single source.
///
/// Exactly one of `pmtiles` and `mbtiles` must be set.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceParams {
    /// Path or HTTP(S) URL of a `PMTiles` archive
    pub pmtiles: Option<String>,
    /// Path of an `MBTiles` file
    pub mbtiles: Option<String>,
    /// Fields that override the `TileJSON` read from the backend
    pub tilejson: Option<Map<String, Value>>,
    /// Domains of this source, replacing [`RepositoryOptions::domains`]
    pub domains: Option<Vec<String>>,
}

/// A registered tile source.
///
/// The record owns its storage handle. The native format is fixed when the record
/// is created.
#[derive(Debug)]
pub struct SourceRecord {
    id: String,
    store: BoxedStore,
    tilejson: TileJSON,
    format: String,
    zoom: ZoomRange,
    public_url: Option<String>,
}

impl SourceRecord {
    /// Unique identifier of the source.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Backend the tiles are read from.
    #[must_use]
    pub fn kind(&self) -> StoreKind {
        self.store.kind()
    }

    /// Storage handle of the source.
    #[must_use]
    pub fn store(&self) -> &BoxedStore {
        &self.store
    }

    /// Assembled `TileJSON` as registered. Its `tiles` holds domains, not URLs.
    #[must_use]
    pub fn tilejson(&self) -> &TileJSON {
        &self.tilejson
    }

    /// Native tile format, e.g. `pbf` or `png`.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Zoom levels with tiles.
    #[must_use]
    pub fn zoom(&self) -> ZoomRange {
        self.zoom
    }

    /// Public base URL of the server, if configured.
    #[must_use]
    pub fn public_url(&self) -> Option<&str> {
        self.public_url.as_deref()
    }

    /// The `TileJSON` returned to a client, with absolute tile URL templates.
    #[must_use]
    pub fn tilejson_for_request(&self, ctx: &TileUrlContext, aliases: &FormatAliases) -> TileJSON {
        let mut tilejson = self.tilejson.clone();
        tilejson.tiles = tile_urls(
            ctx,
            &self.tilejson.tiles,
            &self.id,
            &self.format,
            self.public_url(),
            aliases,
        );
        tilejson
    }

    /// Summary of the source for the catalog.
    #[must_use]
    pub fn catalog_entry(&self) -> CatalogSourceEntry {
        let content_type =
            Format::parse(&self.format).map_or("application/octet-stream", |f| f.content_type());
        CatalogSourceEntry {
            source_type: self.kind(),
            format: self.format.clone(),
            content_type: content_type.to_string(),
            name: self.tilejson.name.clone(),
            description: self.tilejson.description.clone(),
            attribution: self.tilejson.attribution.clone(),
        }
    }
}

/// All registered sources, keyed by ID.
///
/// Lookups are lock-free for readers, and each request works on its own [`Arc`]
/// of the record. Callers are expected to serialize [`add`](Self::add) and
/// [`remove`](Self::remove) of the same ID. The last write wins.
#[derive(Debug, Default)]
pub struct TileRepository {
    sources: DashMap<String, Arc<SourceRecord>>,
    options: RepositoryOptions,
}

fn http_url(locator: &str) -> Option<Url> {
    Url::parse(locator)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Resolves a local locator and checks that it is a non-empty regular file.
fn resolve_file(base: Option<&Path>, locator: &str) -> TileResult<PathBuf> {
    let path = base.map_or_else(|| PathBuf::from(locator), |base| base.join(locator));
    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(path),
        _ => Err(TileError::InvalidSourceFile(path)),
    }
}

impl TileRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new(options: RepositoryOptions) -> Self {
        Self {
            sources: DashMap::new(),
            options,
        }
    }

    /// Settings shared by all sources.
    #[must_use]
    pub fn options(&self) -> &RepositoryOptions {
        &self.options
    }

    /// Opens a source and registers it under `id`, replacing any previous source.
    ///
    /// Nothing is registered if the backend cannot be opened or its metadata cannot
    /// be read. A replaced source has its storage handle closed.
    pub async fn add(
        &self,
        id: &str,
        params: &SourceParams,
        public_url: Option<&str>,
    ) -> TileResult<()> {
        let store = self.open_store(id, params).await?;
        let backend = store.fetch_info().await?;

        let domains = params.domains.as_deref().unwrap_or(&self.options.domains);
        let mut tilejson = assemble_tilejson(id, domains, &backend, params.tilejson.as_ref())?;
        if let Some(decorator) = &self.options.decorator {
            tilejson = decorator.decorate_tilejson(id, tilejson);
        }

        let format = tilejson
            .other
            .get("format")
            .and_then(Value::as_str)
            .unwrap_or(VECTOR_FORMAT)
            .to_string();
        let zoom = ZoomRange::from_tilejson(&tilejson);
        info!(
            "Registered {} source {id} with {format} tiles at zoom {}..={}",
            store.kind(),
            zoom.min,
            zoom.max
        );

        let record = SourceRecord {
            id: id.to_string(),
            store,
            tilejson,
            format,
            zoom,
            public_url: public_url.map(str::to_string),
        };
        if let Some(old) = self.sources.insert(id.to_string(), Arc::new(record)) {
            debug!("Source {id} was replaced, closing its previous storage");
            old.store.close().await;
        }
        Ok(())
    }

    async fn open_store(&self, id: &str, params: &SourceParams) -> TileResult<BoxedStore> {
        let paths = &self.options.paths;
        match (&params.pmtiles, &params.mbtiles) {
            (Some(locator), None) => Ok(if let Some(url) = http_url(locator) {
                Arc::new(PmtilesStore::open_url(&url).await?)
            } else {
                let path = resolve_file(paths.pmtiles.as_deref(), locator)?;
                Arc::new(PmtilesStore::open_path(&path).await?)
            }),
            (None, Some(locator)) => {
                if http_url(locator).is_some() {
                    return Err(TileError::ConfigurationError(format!(
                        "MBTiles does not support web based files. \"{locator}\" is not a valid data file."
                    )));
                }
                let path = resolve_file(paths.mbtiles.as_deref(), locator)?;
                Ok(Arc::new(MbtilesStore::open(&path).await?))
            }
            (Some(_), Some(_)) => Err(TileError::ConfigurationError(format!(
                "Source {id} must define either pmtiles or mbtiles, not both"
            ))),
            (None, None) => Err(TileError::ConfigurationError(format!(
                "Source {id} must define a pmtiles or mbtiles file"
            ))),
        }
    }

    /// Unregisters a source and closes its storage. Returns false if `id` is unknown.
    ///
    /// Requests that already hold the record may fail once the storage is closed.
    pub async fn remove(&self, id: &str) -> bool {
        let Some((_, record)) = self.sources.remove(id) else {
            return false;
        };
        info!("Removed source {id}");
        record.store.close().await;
        true
    }

    /// The record registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<SourceRecord>> {
        self.sources.get(id).map(|r| Arc::clone(r.value()))
    }

    /// IDs of all registered sources, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sources.iter().map(|r| r.key().clone()).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True if no source is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Catalog entries of all registered sources.
    #[must_use]
    pub fn catalog(&self) -> TileCatalog {
        self.sources
            .iter()
            .map(|r| (r.key().clone(), r.value().catalog_entry()))
            .collect()
    }
}

#[cfg(test)]
impl SourceRecord {
    pub(crate) fn new_for_tests(
        id: &str,
        store: BoxedStore,
        format: &str,
        zoom: ZoomRange,
    ) -> Self {
        Self {
            id: id.to_string(),
            store,
            tilejson: tilejson::tilejson! { tiles: vec![] },
            format: format.to_string(),
            zoom,
            public_url: None,
        }
    }
}

#[cfg(test)]
impl TileRepository {
    pub(crate) fn insert_record(&self, record: SourceRecord) {
        self.sources.insert(record.id.clone(), Arc::new(record));
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use rstest::rstest;

    use super::*;

    fn params(pmtiles: Option<&str>, mbtiles: Option<&str>) -> SourceParams {
        SourceParams {
            pmtiles: pmtiles.map(str::to_string),
            mbtiles: mbtiles.map(str::to_string),
            ..SourceParams::default()
        }
    }

    #[rstest]
    #[case(params(None, None))]
    #[case(params(Some("a.pmtiles"), Some("a.mbtiles")))]
    #[case(params(None, Some("https://example.com/world.mbtiles")))]
    #[tokio::test]
    async fn configuration_errors(#[case] params: SourceParams) {
        let repo = TileRepository::default();
        let err = repo.add("src", &params, None).await.unwrap_err();
        assert!(matches!(err, TileError::ConfigurationError(_)), "{err:?}");
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn mbtiles_url_message() {
        let repo = TileRepository::default();
        let err = repo
            .add("src", &params(None, Some("http://example.com/a.mbtiles")), None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"MBTiles does not support web based files. "http://example.com/a.mbtiles" is not a valid data file."#
        );
    }

    #[tokio::test]
    async fn invalid_source_files() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("empty.mbtiles")).unwrap();
        fs::create_dir(dir.path().join("folder.pmtiles")).unwrap();
        let repo = TileRepository::new(RepositoryOptions {
            paths: SourcePaths {
                pmtiles: Some(dir.path().to_path_buf()),
                mbtiles: Some(dir.path().to_path_buf()),
            },
            ..RepositoryOptions::default()
        });

        for params in [
            params(None, Some("empty.mbtiles")),
            params(None, Some("missing.mbtiles")),
            params(Some("folder.pmtiles"), None),
        ] {
            let err = repo.add("src", &params, None).await.unwrap_err();
            assert!(matches!(err, TileError::InvalidSourceFile(_)), "{err:?}");
        }
        assert!(repo.is_empty());
        assert!(!repo.remove("src").await);
    }

    #[test]
    fn http_locators() {
        assert!(http_url("https://example.com/a.pmtiles").is_some());
        assert!(http_url("http://example.com/a.pmtiles").is_some());
        assert!(http_url("file:///tmp/a.pmtiles").is_none());
        assert!(http_url("data/a.pmtiles").is_none());
    }
}
