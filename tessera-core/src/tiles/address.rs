use tessera_tile_utils::{MAX_ZOOM, TileCoord, ZoomLevel};
use tilejson::TileJSON;

/// Inclusive zoom range a source declares in its `TileJSON`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoomRange {
    /// Lowest servable zoom
    pub min: ZoomLevel,
    /// Highest servable zoom, never above [`MAX_ZOOM`]
    pub max: ZoomLevel,
}

impl ZoomRange {
    /// Creates a range, capping `max` at [`MAX_ZOOM`].
    #[must_use]
    pub fn new(min: ZoomLevel, max: ZoomLevel) -> Self {
        Self {
            min,
            max: max.min(MAX_ZOOM),
        }
    }

    /// Reads `minzoom` and `maxzoom`, defaulting to `0` and [`MAX_ZOOM`].
    #[must_use]
    pub fn from_tilejson(tilejson: &TileJSON) -> Self {
        Self::new(
            tilejson.minzoom.unwrap_or(0),
            tilejson.maxzoom.unwrap_or(MAX_ZOOM),
        )
    }

    /// True if `zoom` is within the range.
    #[must_use]
    pub fn contains(&self, zoom: u64) -> bool {
        u64::from(self.min) <= zoom && zoom <= u64::from(self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::new(0, MAX_ZOOM)
    }
}

/// Checks a requested tile address without touching any storage.
///
/// Returns the tile coordinate if `z` is within `zoom` and both `x` and `y` are
/// below `2^z`, or `None` if the address is out of bounds.
#[must_use]
pub fn validate_address(z: u64, x: u64, y: u64, zoom: ZoomRange) -> Option<TileCoord> {
    if !zoom.contains(z) {
        return None;
    }
    let z = ZoomLevel::try_from(z).ok()?;
    let side = 1_u64.checked_shl(u32::from(z))?;
    if x >= side || y >= side {
        return None;
    }
    Some(TileCoord::new(z, u32::try_from(x).ok()?, u32::try_from(y).ok()?))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0, 0, true)]
    #[case(0, 1, 0, false)]
    #[case(14, 16383, 16383, true)]
    #[case(14, 16384, 0, false)]
    #[case(15, 0, 0, false)]
    #[case(20, 0, 0, false)]
    #[case(u64::MAX, 0, 0, false)]
    fn sample_source_bounds(#[case] z: u64, #[case] x: u64, #[case] y: u64, #[case] ok: bool) {
        let zoom = ZoomRange::new(0, 14);
        assert_eq!(validate_address(z, x, y, zoom).is_some(), ok);
    }

    #[test]
    fn below_min_zoom() {
        let zoom = ZoomRange::new(3, 10);
        assert_eq!(validate_address(2, 0, 0, zoom), None);
        assert_eq!(validate_address(3, 7, 7, zoom), Some(TileCoord::new(3, 7, 7)));
    }

    #[test]
    fn max_zoom_is_capped() {
        assert_eq!(ZoomRange::new(0, 200).max, MAX_ZOOM);
        assert_eq!(validate_address(31, 0, 0, ZoomRange::new(0, 255)), None);
    }

    fn zoom_range() -> impl Strategy<Value = ZoomRange> {
        (0..=MAX_ZOOM)
            .prop_flat_map(|min| (Just(min), min..=MAX_ZOOM))
            .prop_map(|(min, max)| ZoomRange::new(min, max))
    }

    proptest! {
        #[test]
        fn accepts_every_address_in_range(
            zoom in zoom_range(),
            z_offset in 0_u8..=MAX_ZOOM,
            x_seed in any::<u64>(),
            y_seed in any::<u64>(),
        ) {
            let z = zoom.min + z_offset % (zoom.max - zoom.min + 1);
            let side = 1_u64 << z;
            let (x, y) = (x_seed % side, y_seed % side);
            let coord = validate_address(u64::from(z), x, y, zoom);
            prop_assert_eq!(coord, Some(TileCoord::new(z, x as u32, y as u32)));
        }

        #[test]
        fn agrees_with_bounds_definition(
            zoom in zoom_range(),
            z in 0_u64..40,
            x in prop_oneof![0_u64..64, any::<u64>()],
            y in prop_oneof![0_u64..64, any::<u64>()],
        ) {
            let expected = zoom.contains(z) && x < (1_u64 << z) && y < (1_u64 << z);
            prop_assert_eq!(validate_address(z, x, y, zoom).is_some(), expected);
        }
    }
}
