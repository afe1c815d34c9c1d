use geozero::mvt::{Message as _, Tile, tile};
use proptest::prelude::*;
use tessera_core::tiles::geojson::{LAYER_PROPERTY, transcode, transcode_to_json};
use tessera_tile_utils::TileCoord;

fn layer(name: String, features: &[(u32, u32)]) -> tile::Layer {
    tile::Layer {
        version: 2,
        name,
        features: features
            .iter()
            .map(|&(x, y)| tile::Feature {
                id: None,
                tags: vec![],
                r#type: Some(tile::GeomType::Point as i32),
                geometry: vec![9, x << 1, y << 1],
            })
            .collect(),
        keys: vec![],
        values: vec![],
        extent: Some(4096),
    }
}

fn layers() -> impl Strategy<Value = Vec<Vec<(u32, u32)>>> {
    prop::collection::vec(
        prop::collection::vec((0..4096_u32, 0..4096_u32), 0..8),
        0..6,
    )
}

proptest! {
    #[test]
    fn layers_and_counts_survive(layers in layers(), z in 0..10_u8) {
        let names: Vec<String> = (0..layers.len()).map(|i| format!("layer{i}")).collect();
        let data = Tile {
            layers: names
                .iter()
                .zip(&layers)
                .map(|(name, features)| layer(name.clone(), features))
                .collect(),
        }
        .encode_to_vec();

        let fc = transcode(&data, TileCoord::new(z, 0, 0)).unwrap();
        let seen: Vec<&str> = fc
            .features
            .iter()
            .map(|f| f.property(LAYER_PROPERTY).and_then(|v| v.as_str()).unwrap())
            .collect();
        let expected: Vec<&str> = names
            .iter()
            .zip(&layers)
            .flat_map(|(name, features)| std::iter::repeat_n(name.as_str(), features.len()))
            .collect();
        prop_assert_eq!(seen, expected);
    }
}

#[test]
fn json_document_parses_back() {
    let data = Tile {
        layers: vec![
            layer("water".to_string(), &[(1, 2)]),
            layer("roads".to_string(), &[(3, 4), (5, 6)]),
        ],
    }
    .encode_to_vec();
    let json = transcode_to_json(&data, TileCoord::new(4, 3, 2)).unwrap();
    let fc: geojson::FeatureCollection = serde_json::from_slice(&json).unwrap();
    let layers: Vec<_> = fc
        .features
        .iter()
        .map(|f| f.property(LAYER_PROPERTY).unwrap().clone())
        .collect();
    assert_eq!(layers, ["water", "roads", "roads"]);
}

#[test]
fn garbage_is_an_error() {
    assert!(transcode(b"\xff\xff\xff", TileCoord::new(0, 0, 0)).is_err());
}
