//! Conversion of Mapbox vector tiles into `GeoJSON`.
//!
//! [MVT](https://github.com/mapbox/vector-tile-spec/tree/master/2.1) geometry is stored
//! in tile-local integer units, while [GeoJSON](https://datatracker.ietf.org/doc/html/rfc7946)
//! uses WGS84 longitude and latitude. Features keep their tags as properties and gain a
//! `layer` property with the name of the layer they come from.

mod error;
mod geometry;

pub use error::TranscodeError;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, feature};
use geozero::mvt::{Message as _, Tile, tile};
use tessera_tile_utils::{DEFAULT_EXTENT, TileCoord, TileProjection};

/// Name of the property holding the layer name of each feature.
pub const LAYER_PROPERTY: &str = "layer";

/// Decodes an uncompressed vector tile at `xyz` into a single `FeatureCollection`.
///
/// Features are ordered by layer, then by their position within the layer.
/// Any malformed feature fails the whole tile.
pub fn transcode(data: &[u8], xyz: TileCoord) -> Result<FeatureCollection, TranscodeError> {
    let tile = Tile::decode(data).map_err(|e| TranscodeError::InvalidProtobuf(e.to_string()))?;
    let mut features = Vec::new();

    for layer in &tile.layers {
        let projection = TileProjection::new(xyz, layer.extent.unwrap_or(DEFAULT_EXTENT));
        for (index, feat) in layer.features.iter().enumerate() {
            let value = geometry::to_geojson(feat.r#type(), &feat.geometry, &projection)?
                .ok_or_else(|| {
                    TranscodeError::UnknownGeometryType(
                        layer.name.clone(),
                        index,
                        feat.r#type.unwrap_or_default(),
                    )
                })?;

            let mut properties = properties(layer, &feat.tags)
                .ok_or_else(|| TranscodeError::InvalidTags(layer.name.clone(), index))?;
            properties.insert(
                LAYER_PROPERTY.to_string(),
                JsonValue::String(layer.name.clone()),
            );

            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(value)),
                id: feat.id.map(|id| feature::Id::Number(id.into())),
                properties: Some(properties),
                foreign_members: None,
            });
        }
    }

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Same as [`transcode`], serialized as a JSON document.
pub fn transcode_to_json(data: &[u8], xyz: TileCoord) -> Result<Vec<u8>, TranscodeError> {
    Ok(serde_json::to_vec(&transcode(data, xyz)?)?)
}

/// Resolves the key and value index pairs of a feature. `None` if any index is invalid.
fn properties(layer: &tile::Layer, tags: &[u32]) -> Option<JsonObject> {
    if tags.len() % 2 != 0 {
        return None;
    }
    let mut properties = JsonObject::new();
    for pair in tags.chunks_exact(2) {
        let key = layer.keys.get(usize::try_from(pair[0]).ok()?)?;
        let value = layer.values.get(usize::try_from(pair[1]).ok()?)?;
        properties.insert(key.clone(), json_value(value));
    }
    Some(properties)
}

fn json_value(value: &tile::Value) -> JsonValue {
    if let Some(v) = &value.string_value {
        JsonValue::String(v.clone())
    } else if let Some(v) = value.float_value {
        JsonValue::from(f64::from(v))
    } else if let Some(v) = value.double_value {
        JsonValue::from(v)
    } else if let Some(v) = value.int_value {
        JsonValue::from(v)
    } else if let Some(v) = value.uint_value {
        JsonValue::from(v)
    } else if let Some(v) = value.sint_value {
        JsonValue::from(v)
    } else if let Some(v) = value.bool_value {
        JsonValue::Bool(v)
    } else {
        JsonValue::Null
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geojson::Value;
    use insta::assert_json_snapshot;
    use serde_json::json;

    use super::*;

    fn string(v: &str) -> tile::Value {
        tile::Value {
            string_value: Some(v.to_string()),
            ..Default::default()
        }
    }

    fn uint(v: u64) -> tile::Value {
        tile::Value {
            uint_value: Some(v),
            ..Default::default()
        }
    }

    fn feature(
        id: Option<u64>,
        geom: tile::GeomType,
        tags: Vec<u32>,
        geometry: Vec<u32>,
    ) -> tile::Feature {
        tile::Feature {
            id,
            tags,
            r#type: Some(geom as i32),
            geometry,
        }
    }

    fn roads() -> tile::Layer {
        tile::Layer {
            version: 2,
            name: "roads".to_string(),
            features: vec![
                // MoveTo(0, 0), LineTo(4096, 4096)
                feature(
                    Some(1),
                    tile::GeomType::Linestring,
                    vec![0, 0, 1, 1],
                    vec![9, 0, 0, 10, 8192, 8192],
                ),
                // MoveTo(2048, 2048)
                feature(None, tile::GeomType::Point, vec![0, 2], vec![9, 4096, 4096]),
            ],
            keys: vec!["name".to_string(), "lanes".to_string()],
            values: vec![string("Main"), uint(2), string("Side")],
            extent: Some(4096),
        }
    }

    fn encode(layers: Vec<tile::Layer>) -> Vec<u8> {
        Tile { layers }.encode_to_vec()
    }

    #[test]
    fn features_are_tagged_with_layer() {
        let data = encode(vec![roads()]);
        let fc = transcode(&data, TileCoord::new(0, 0, 0)).unwrap();
        assert_eq!(fc.features.len(), 2);
        for feat in &fc.features {
            assert_eq!(feat.property(LAYER_PROPERTY), Some(&JsonValue::from("roads")));
        }
        assert_eq!(
            fc.features[0].properties.as_ref(),
            json!({"name": "Main", "lanes": 2, "layer": "roads"}).as_object()
        );
        assert_eq!(
            fc.features[1].properties.as_ref(),
            json!({"name": "Side", "layer": "roads"}).as_object()
        );
        assert_eq!(fc.features[0].id, Some(feature::Id::Number(1.into())));
        assert_eq!(fc.features[1].id, None);
    }

    #[test]
    fn geometry_is_projected() {
        let data = encode(vec![roads()]);
        let fc = transcode(&data, TileCoord::new(0, 0, 0)).unwrap();

        let geometry = fc.features[0].geometry.as_ref().map(|g| &g.value);
        let Some(Value::LineString(line)) = geometry else {
            panic!("expected a linestring");
        };
        assert_relative_eq!(line[0][0], -180.0);
        assert_relative_eq!(line[0][1], 85.051_128_779_806_59, epsilon = 1e-9);
        assert_relative_eq!(line[1][0], 180.0);
        assert_relative_eq!(line[1][1], -85.051_128_779_806_59, epsilon = 1e-9);

        let Some(Value::Point(point)) = fc.features[1].geometry.as_ref().map(|g| &g.value) else {
            panic!("expected a point");
        };
        assert_relative_eq!(point[0], 0.0);
        assert_relative_eq!(point[1], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn layer_order_is_preserved() {
        let mut water = roads();
        water.name = "water".to_string();
        water.features.truncate(1);
        let data = encode(vec![water, roads()]);
        let fc = transcode(&data, TileCoord::new(3, 1, 2)).unwrap();
        let layers: Vec<_> = fc
            .features
            .iter()
            .filter_map(|f| f.property(LAYER_PROPERTY)?.as_str())
            .collect();
        assert_eq!(layers, ["water", "roads", "roads"]);
    }

    #[test]
    fn unknown_geometry_fails_the_tile() {
        let mut layer = roads();
        layer.features[1].r#type = Some(tile::GeomType::Unknown as i32);
        let err = transcode(&encode(vec![layer]), TileCoord::new(0, 0, 0)).unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::UnknownGeometryType(ref name, 1, 0) if name == "roads"
        ));
    }

    #[test]
    fn dangling_tag_fails_the_tile() {
        let mut layer = roads();
        layer.features[0].tags = vec![0, 7];
        let err = transcode(&encode(vec![layer]), TileCoord::new(0, 0, 0)).unwrap_err();
        assert!(matches!(err, TranscodeError::InvalidTags(_, 0)));
    }

    #[test]
    fn malformed_protobuf() {
        let err = transcode(b"\x1a\xff\xff\xff", TileCoord::new(0, 0, 0)).unwrap_err();
        assert!(matches!(err, TranscodeError::InvalidProtobuf(_)));
    }

    #[test]
    fn empty_tile() {
        let fc = transcode(&[], TileCoord::new(0, 0, 0)).unwrap();
        assert!(fc.features.is_empty());
        let json = transcode_to_json(&[], TileCoord::new(0, 0, 0)).unwrap();
        assert_json_snapshot!(serde_json::from_slice::<JsonValue>(&json).unwrap(), @r#"
        {
          "features": [],
          "type": "FeatureCollection"
        }
        "#);
    }
}
