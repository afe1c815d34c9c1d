//! Builders of small `MBTiles` and `PMTiles` files for tests.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use geozero::mvt::{Message as _, Tile, tile};
use pmtiles::{Compression, PmTilesWriter, TileType};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Executor as _, SqlitePool, query};
use tessera_tile_utils::TileCoord;

fn other(e: impl ToString) -> io::Error {
    io::Error::other(e.to_string())
}

/// A tile to store in a fixture, addressed in the XYZ scheme. `None` data writes a NULL row.
#[derive(Debug, Clone)]
pub struct FixtureTile {
    /// Address of the tile
    pub xyz: TileCoord,
    /// Tile bytes
    pub data: Option<Vec<u8>>,
}

impl FixtureTile {
    /// A tile with data.
    #[must_use]
    pub fn new(z: u8, x: u32, y: u32, data: Vec<u8>) -> Self {
        Self {
            xyz: TileCoord::new(z, x, y),
            data: Some(data),
        }
    }

    /// A row whose `tile_data` is NULL.
    #[must_use]
    pub fn null(z: u8, x: u32, y: u32) -> Self {
        Self {
            xyz: TileCoord::new(z, x, y),
            data: None,
        }
    }
}

/// A vector tile with a single `roads` layer of `count` point features.
#[must_use]
pub fn roads_tile(count: u32) -> Vec<u8> {
    let features = (0..count)
        .map(|i| tile::Feature {
            id: Some(u64::from(i) + 1),
            tags: vec![0, 0],
            r#type: Some(tile::GeomType::Point as i32),
            // MoveTo(100 + 10 * i, 100)
            geometry: vec![9, (100 + 10 * i) << 1, 200],
        })
        .collect();
    Tile {
        layers: vec![tile::Layer {
            version: 2,
            name: "roads".to_string(),
            features,
            keys: vec!["kind".to_string()],
            values: vec![tile::Value {
                string_value: Some("highway".to_string()),
                ..Default::default()
            }],
            extent: Some(4096),
        }],
    }
    .encode_to_vec()
}

/// Writes an `MBTiles` file with the given metadata rows and tiles.
pub async fn create_mbtiles(
    dir: &Path,
    name: &str,
    metadata: &[(&str, &str)],
    tiles: &[FixtureTile],
) -> io::Result<PathBuf> {
    let path = dir.join(name);
    let opts = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await.map_err(other)?;
    pool.execute(
        "CREATE TABLE metadata (name text, value text);
         CREATE TABLE tiles (zoom_level integer, tile_column integer, tile_row integer, tile_data blob);
         CREATE UNIQUE INDEX tile_index ON tiles (zoom_level, tile_column, tile_row);",
    )
    .await
    .map_err(other)?;

    for (name, value) in metadata {
        query("INSERT INTO metadata (name, value) VALUES (?, ?)")
            .bind(*name)
            .bind(*value)
            .execute(&pool)
            .await
            .map_err(other)?;
    }
    for tile in tiles {
        query(
            "INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?, ?, ?, ?)",
        )
        .bind(i64::from(tile.xyz.z))
        .bind(i64::from(tile.xyz.x))
        .bind(i64::from(tile.xyz.tms_y()))
        .bind(tile.data.as_deref())
        .execute(&pool)
        .await
        .map_err(other)?;
    }
    pool.close().await;
    Ok(path)
}

/// Writes an uncompressed `PMTiles` archive with the given tiles and JSON metadata.
pub fn create_pmtiles(
    dir: &Path,
    name: &str,
    tile_type: TileType,
    min_zoom: u8,
    max_zoom: u8,
    metadata: &str,
    tiles: &[FixtureTile],
) -> io::Result<PathBuf> {
    let path = dir.join(name);
    let file = File::create(&path)?;
    let mut writer = PmTilesWriter::new(tile_type)
        .tile_compression(Compression::None)
        .min_zoom(min_zoom)
        .max_zoom(max_zoom)
        .metadata(metadata)
        .create(file)
        .map_err(other)?;
    for tile in tiles {
        let Some(data) = &tile.data else {
            continue;
        };
        let coord = pmtiles::TileCoord::new(tile.xyz.z, tile.xyz.x, tile.xyz.y).map_err(other)?;
        writer.add_tile(coord, data).map_err(other)?;
    }
    writer.finalize().map_err(other)?;
    Ok(path)
}
