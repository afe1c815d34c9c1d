use std::path::Path;

use rstest::rstest;
use tessera_core::fixtures::{FixtureTile, create_mbtiles, roads_tile};
use tessera_core::tiles::mbtiles::MbtilesStore;
use tessera_core::tiles::{
    RepositoryOptions, SourceParams, SourcePaths, StoreKind, TileError, TileLookup, TileReply,
    TileRepository, TileRequest, TileStore as _,
};
use tessera_tile_utils::{Encoding, Format, TileCoord, decode_gzip, encode_gzip};
use tempfile::TempDir;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

async fn world(dir: &Path) -> MbtilesStore {
    let path = create_mbtiles(
        dir,
        "world.mbtiles",
        &[
            ("name", "World"),
            ("format", "pbf"),
            ("minzoom", "0"),
            ("maxzoom", "6"),
            ("bounds", "-180,-85,180,85"),
        ],
        &[
            FixtureTile::new(0, 0, 0, encode_gzip(&roads_tile(2)).unwrap()),
            FixtureTile::new(1, 0, 0, roads_tile(1)),
            FixtureTile::null(1, 1, 1),
        ],
    )
    .await
    .unwrap();
    MbtilesStore::open(&path).await.unwrap()
}

#[tokio::test]
async fn tiles_are_read_with_tms_rows() {
    let dir = TempDir::new().unwrap();
    let store = world(dir.path()).await;
    assert_eq!(store.kind(), StoreKind::Mbtiles);

    let TileLookup::Found(tile) = store.fetch_tile(TileCoord::new(0, 0, 0)).await.unwrap() else {
        panic!("tile 0/0/0 must exist");
    };
    assert_eq!(tile.info.format, Format::Mvt);
    assert_eq!(tile.info.encoding, Encoding::Gzip);
    assert!(tile.header("etag").is_some());
    assert_eq!(decode_gzip(&tile.data).unwrap(), roads_tile(2));

    let TileLookup::Found(tile) = store.fetch_tile(TileCoord::new(1, 0, 0)).await.unwrap() else {
        panic!("tile 1/0/0 must exist");
    };
    assert_eq!(tile.data, roads_tile(1));
    assert_eq!(tile.info.encoding, Encoding::Uncompressed);
}

#[rstest]
#[case(TileCoord::new(1, 0, 1), TileLookup::Missing)]
#[case(TileCoord::new(1, 1, 1), TileLookup::Empty)]
#[case(TileCoord::new(5, 3, 3), TileLookup::Missing)]
#[tokio::test]
async fn absent_tiles(#[case] xyz: TileCoord, #[case] expected: TileLookup) {
    let dir = TempDir::new().unwrap();
    let store = world(dir.path()).await;
    assert_eq!(store.fetch_tile(xyz).await.unwrap(), expected);
}

async fn repository(dir: &Path) -> TileRepository {
    create_mbtiles(
        dir,
        "vector.mbtiles",
        &[("format", "pbf"), ("maxzoom", "4")],
        &[FixtureTile::new(0, 0, 0, roads_tile(3))],
    )
    .await
    .unwrap();
    create_mbtiles(
        dir,
        "raster.mbtiles",
        &[("format", "png"), ("maxzoom", "4"), ("name", "Satellite")],
        &[FixtureTile::new(0, 0, 0, PNG.to_vec()), FixtureTile::null(1, 0, 0)],
    )
    .await
    .unwrap();

    let repo = TileRepository::new(RepositoryOptions {
        paths: SourcePaths {
            mbtiles: Some(dir.to_path_buf()),
            ..SourcePaths::default()
        },
        ..RepositoryOptions::default()
    });
    for (id, file) in [("vector", "vector.mbtiles"), ("raster", "raster.mbtiles")] {
        let params = SourceParams {
            mbtiles: Some(file.to_string()),
            ..SourceParams::default()
        };
        repo.add(id, &params, None).await.unwrap();
    }
    repo
}

fn request(id: &str, z: u64, x: u64, y: u64, format: &str) -> TileRequest {
    TileRequest {
        source_id: id.to_string(),
        z,
        x,
        y,
        format: format.to_string(),
    }
}

#[tokio::test]
async fn registered_sources() {
    let dir = TempDir::new().unwrap();
    let repo = repository(dir.path()).await;
    assert_eq!(repo.ids(), vec!["raster", "vector"]);

    let raster = repo.get("raster").unwrap();
    assert_eq!(raster.format(), "png");
    assert_eq!(raster.tilejson().name.as_deref(), Some("Satellite"));
    let vector = repo.get("vector").unwrap();
    assert_eq!(vector.format(), "pbf");
    assert_eq!(vector.tilejson().name.as_deref(), Some("vector"));
    assert_eq!(vector.zoom().max, 4);

    let catalog = repo.catalog();
    assert_eq!(catalog["raster"].content_type, "image/png");
    assert_eq!(catalog["vector"].content_type, "application/x-protobuf");
}

#[tokio::test]
async fn missing_raster_tile_is_a_placeholder() {
    let dir = TempDir::new().unwrap();
    let repo = repository(dir.path()).await;
    let reply = repo.serve_tile(&request("raster", 2, 1, 1, "png")).await.unwrap();
    let TileReply::Placeholder(tile) = reply else {
        panic!("expected a placeholder, got {reply:?}");
    };
    assert_eq!(tile.header("content-type"), Some("image/png"));
    assert_eq!(tile.header("content-encoding"), Some("gzip"));
}

#[tokio::test]
async fn missing_vector_tile_is_no_content() {
    let dir = TempDir::new().unwrap();
    let repo = repository(dir.path()).await;
    let reply = repo.serve_tile(&request("vector", 2, 1, 1, "pbf")).await.unwrap();
    assert_eq!(reply, TileReply::NoContent);
}

#[tokio::test]
async fn null_tile_is_not_found() {
    let dir = TempDir::new().unwrap();
    let repo = repository(dir.path()).await;
    let err = repo
        .serve_tile(&request("raster", 1, 0, 0, "png"))
        .await
        .unwrap_err();
    assert!(matches!(err, TileError::NotFound(..)), "{err:?}");
}

#[tokio::test]
async fn raster_tile_is_gzipped() {
    let dir = TempDir::new().unwrap();
    let repo = repository(dir.path()).await;
    let TileReply::Tile(tile) = repo.serve_tile(&request("raster", 0, 0, 0, "png")).await.unwrap()
    else {
        panic!("expected a tile");
    };
    assert_eq!(tile.header("content-type"), Some("image/png"));
    assert_eq!(tile.header("etag"), None);
    assert_eq!(decode_gzip(&tile.data).unwrap(), PNG);
}

#[tokio::test]
async fn remove_closes_the_source() {
    let dir = TempDir::new().unwrap();
    let repo = repository(dir.path()).await;
    let record = repo.get("vector").unwrap();
    assert!(repo.remove("vector").await);
    assert!(repo.get("vector").is_none());
    assert!(matches!(
        repo.serve_tile(&request("vector", 0, 0, 0, "pbf")).await,
        Err(TileError::UnknownSource(_))
    ));
    // In-flight holders of the record now see a backend error
    assert!(record.store().fetch_tile(TileCoord::new(0, 0, 0)).await.is_err());
}

#[tokio::test]
async fn add_replaces_existing_source() {
    let dir = TempDir::new().unwrap();
    let repo = repository(dir.path()).await;
    let params = SourceParams {
        mbtiles: Some("raster.mbtiles".to_string()),
        ..SourceParams::default()
    };
    repo.add("vector", &params, None).await.unwrap();
    assert_eq!(repo.len(), 2);
    assert_eq!(repo.get("vector").unwrap().format(), "png");
}

#[tokio::test]
async fn center_is_derived_from_bounds() {
    let dir = TempDir::new().unwrap();
    create_mbtiles(
        dir.path(),
        "bounded.mbtiles",
        &[("format", "pbf"), ("bounds", "10,40,20,50")],
        &[],
    )
    .await
    .unwrap();
    let repo = TileRepository::default();
    let params = SourceParams {
        mbtiles: Some(dir.path().join("bounded.mbtiles").display().to_string()),
        ..SourceParams::default()
    };
    repo.add("bounded", &params, None).await.unwrap();

    let center = repo.get("bounded").unwrap().tilejson().center.unwrap();
    assert_eq!(
        (center.longitude, center.latitude, center.zoom),
        (15.0, 45.0, 7)
    );
}
