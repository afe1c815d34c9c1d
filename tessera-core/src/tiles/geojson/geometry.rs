use geojson::Value;
use geozero::mvt::tile::GeomType;
use geozero::mvt::{Command, CommandInteger, ParameterInteger};
use tessera_tile_utils::TileProjection;

use super::TranscodeError;

/// One `MoveTo`-started run of points, in tile-local integer units.
type Ring = Vec<[i64; 2]>;

/// Decodes the command stream of a feature into runs of points.
///
/// Every `MoveTo` starts a new run, `LineTo` extends the current one, and
/// `ClosePath` repeats the first point of the current run.
pub fn decode_commands(geometry: &[u32]) -> Result<Vec<Ring>, TranscodeError> {
    let mut rings = Vec::new();
    let mut current: Option<Ring> = None;
    let (mut x, mut y) = (0_i64, 0_i64);
    let mut values = geometry.iter().copied();

    while let Some(value) = values.next() {
        let command = CommandInteger(value);
        let (id, count) = (command.id(), command.count());
        if id == Command::MoveTo as u32 || id == Command::LineTo as u32 {
            for _ in 0..count {
                let (Some(dx), Some(dy)) = (values.next(), values.next()) else {
                    return Err(TranscodeError::TruncatedGeometry(id));
                };
                x = x
                    .checked_add(i64::from(ParameterInteger(dx).value()))
                    .ok_or(TranscodeError::CoordinateOverflow)?;
                y = y
                    .checked_add(i64::from(ParameterInteger(dy).value()))
                    .ok_or(TranscodeError::CoordinateOverflow)?;
                if id == Command::MoveTo as u32 {
                    if let Some(ring) = current.take() {
                        rings.push(ring);
                    }
                    current = Some(Vec::new());
                }
                current
                    .as_mut()
                    .ok_or(TranscodeError::LineToWithoutMoveTo)?
                    .push([x, y]);
            }
        } else if id == Command::ClosePath as u32 {
            for _ in 0..count {
                if let Some(ring) = current.as_mut()
                    && let Some(&first) = ring.first()
                {
                    ring.push(first);
                }
            }
        } else {
            return Err(TranscodeError::UnknownCommand(id));
        }
    }

    if let Some(ring) = current {
        rings.push(ring);
    }
    Ok(rings)
}

/// Twice the signed area of a ring, positive for clockwise rings in tile space.
fn signed_area(ring: &[[i64; 2]]) -> Result<i128, TranscodeError> {
    let mut sum = 0_i128;
    for (i, p1) in ring.iter().enumerate() {
        let p2 = ring[(i + ring.len() - 1) % ring.len()];
        let [x1, y1] = p1.map(i128::from);
        let [x2, y2] = p2.map(i128::from);
        sum = (x2 - x1)
            .checked_mul(y1 + y2)
            .and_then(|term| sum.checked_add(term))
            .ok_or(TranscodeError::CoordinateOverflow)?;
    }
    Ok(sum)
}

/// Groups rings into polygons. A ring with the same winding as the first
/// non-degenerate ring starts a new polygon, any other ring is a hole of the
/// current one. Rings with zero area are dropped.
pub fn classify_rings(rings: Vec<Ring>) -> Result<Vec<Vec<Ring>>, TranscodeError> {
    if rings.len() <= 1 {
        return Ok(vec![rings]);
    }

    let mut polygons = Vec::new();
    let mut polygon: Option<Vec<Ring>> = None;
    let mut winding = None;

    for ring in rings {
        let area = signed_area(&ring)?;
        if area == 0 {
            continue;
        }
        let ccw = area < 0;
        let outer_is_ccw = *winding.get_or_insert(ccw);
        match polygon.as_mut() {
            Some(current) if ccw != outer_is_ccw => current.push(ring),
            _ => {
                if let Some(done) = polygon.replace(vec![ring]) {
                    polygons.push(done);
                }
            }
        }
    }

    if let Some(done) = polygon {
        polygons.push(done);
    }
    Ok(polygons)
}

fn project_ring(ring: &[[i64; 2]], projection: &TileProjection) -> Vec<Vec<f64>> {
    ring.iter()
        .map(|&[x, y]| projection.project(x, y).to_vec())
        .collect()
}

/// Converts the geometry of one feature into projected `GeoJSON`.
///
/// Returns `None` for [`GeomType::Unknown`], which callers must treat as an error.
pub fn to_geojson(
    geom_type: GeomType,
    geometry: &[u32],
    projection: &TileProjection,
) -> Result<Option<Value>, TranscodeError> {
    let rings = decode_commands(geometry)?;
    Ok(Some(match geom_type {
        GeomType::Unknown => return Ok(None),
        GeomType::Point => {
            let mut points: Vec<Vec<f64>> = rings
                .iter()
                .filter_map(|ring| ring.first())
                .map(|&[x, y]| projection.project(x, y).to_vec())
                .collect();
            if points.len() == 1 {
                Value::Point(points.remove(0))
            } else {
                Value::MultiPoint(points)
            }
        }
        GeomType::Linestring => {
            let mut lines: Vec<_> = rings
                .iter()
                .map(|ring| project_ring(ring, projection))
                .collect();
            if lines.len() == 1 {
                Value::LineString(lines.remove(0))
            } else {
                Value::MultiLineString(lines)
            }
        }
        GeomType::Polygon => {
            let mut polygons: Vec<_> = classify_rings(rings)?
                .iter()
                .map(|polygon| {
                    polygon
                        .iter()
                        .map(|ring| project_ring(ring, projection))
                        .collect::<Vec<_>>()
                })
                .collect();
            if polygons.len() == 1 {
                Value::Polygon(polygons.remove(0))
            } else {
                Value::MultiPolygon(polygons)
            }
        }
    }))
}
