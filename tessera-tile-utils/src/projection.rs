use std::f64::consts::PI;

use crate::TileCoord;

/// Default number of integer units along one side of a vector tile.
pub const DEFAULT_EXTENT: u32 = 4096;

/// Projects tile-local vector geometry coordinates of one tile to WGS84
/// longitude and latitude.
///
/// Tile coordinates are measured from the top-left corner of the tile,
/// in `extent` units per tile side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileProjection {
    size: f64,
    x0: f64,
    y0: f64,
}

impl TileProjection {
    #[must_use]
    pub fn new(coord: TileCoord, extent: u32) -> Self {
        let extent = f64::from(extent);
        Self {
            size: extent * 2_f64.powi(i32::from(coord.z)),
            x0: extent * f64::from(coord.x),
            y0: extent * f64::from(coord.y),
        }
    }

    /// Returns `[longitude, latitude]` for a point in tile-local units.
    #[must_use]
    pub fn project(&self, x: i64, y: i64) -> [f64; 2] {
        #[allow(clippy::cast_precision_loss)]
        let (px, py) = (x as f64, y as f64);
        let lon = (px + self.x0) * 360.0 / self.size - 180.0;
        let y2 = 180.0 - (py + self.y0) * 360.0 / self.size;
        let lat = 360.0 / PI * (y2 * PI / 180.0).exp().atan() - 90.0;
        [lon, lat]
    }
}
