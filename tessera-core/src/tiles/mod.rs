//! Tile management for the Tessera tile server.
//!
//! A tile request flows through these parts, in order:
//! - the [`TileRepository`] lookup of the [`SourceRecord`]
//! - [`validate_address`] against the source zoom range and the `2^z` grid
//! - [`resolve_format`] of the requested extension
//! - a [`TileStore`] fetch ([`mbtiles`] or [`pmtiles`])
//! - the optional [`TileDecorator`] and the [`geojson`] transcoder
//! - [`encode_tile`], which guarantees a gzip body

/// The public facing API for listing registered tile sources
pub mod catalog;

/// Implementation of the `MBTiles` [`TileStore`].
pub mod mbtiles;

/// Implementation of the `PMTiles` [`TileStore`].
pub mod pmtiles;

/// Vector tile to `GeoJSON` conversion.
pub mod geojson;

mod address;
pub use address::{ZoomRange, validate_address};

mod decorator;
pub use decorator::{BoxedDecorator, TileDecorator};

mod encoder;
pub use encoder::encode_tile;

mod error;
pub use error::{TileError, TileResult};

mod format;
pub use format::{FormatAliases, OutputFormat, resolve_format};

mod metadata;
pub use metadata::{TileUrlContext, assemble_tilejson, center_from_bounds, tile_urls};

mod placeholder;
pub use placeholder::placeholder_tile;

mod repository;
pub use repository::{RepositoryOptions, SourceParams, SourcePaths, SourceRecord, TileRepository};

mod serve;
pub use serve::{TileReply, TileRequest};

mod store;
pub use store::{BoxedStore, StoreKind, TileLookup, TileStore};

mod tile;
pub use tile::{Tile, TileHeaders};
