use std::f64::consts::PI;

/// Edge length of a single tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Latitude limit of the Web-Mercator projection in degrees.
pub const LAT_LIMIT: f64 = 85.051_128_779_806_59;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;

/// A slippy-map tile with x, y and z-coordinate.
/// ref: https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub z: u8,
}

impl Tile {
    pub fn new(x: usize, y: usize, z: u8) -> Self {
        Self { x, y, z }
    }
}

/// A geographic point projected onto the tile pyramid: the tile containing
/// the point plus the point's pixel offset inside that tile.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TileCoord {
    pub tile: Tile,
    pub px: u32,
    pub py: u32,
}

impl TileCoord {
    /// Projects a longitude/latitude pair given in degrees at `zoom`.
    ///
    /// Latitudes beyond the Web-Mercator limit are clamped to it.
    ///
    /// # Example
    /// ```rust
    /// # use gsi_maps::TileCoord;
    /// let coord = TileCoord::from_lon_lat(130.0, 33.0, 12);
    /// assert_eq!((coord.tile.x, coord.tile.y), (3527, 1649));
    /// ```
    pub fn from_lon_lat(lon: f64, lat: f64, zoom: u8) -> Self {
        let lat_rad = lat.max(-LAT_LIMIT).min(LAT_LIMIT).to_radians();

        // world size in pixels
        let scale = 2_f64.powi(zoom as i32 + 8);
        let size = TILE_SIZE as f64;

        let x = scale * (lon + 180_f64) / 360_f64;
        let y = scale * (1_f64 - (lat_rad.tan() + 1_f64 / lat_rad.cos()).ln() / PI)
            / 2_f64;

        // keep the antimeridian and the southern limit on the last tile
        let last = scale - 1e-6;
        let (x, y) = (x.max(0_f64).min(last), y.max(0_f64).min(last));

        Self {
            tile: Tile::new(
                (x / size).floor() as usize,
                (y / size).floor() as usize,
                zoom,
            ),
            px: x.rem_euclid(size).floor() as u32,
            py: y.rem_euclid(size).floor() as u32,
        }
    }
}
