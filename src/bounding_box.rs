use crate::tile::{TileCoord, MAX_ZOOM, MIN_ZOOM};

/// A geographic bounding box given by its bottom-left (`lon1`, `lat1`) and
/// top-right (`lon2`, `lat2`) corners in degrees.
///
/// # Example
/// ```rust
/// # use gsi_maps::BoundingBox;
/// let kumamoto = BoundingBox::new(130.098381, 32.576906, 130.455437, 32.892849);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub lon1: f64,
    pub lat1: f64,
    pub lon2: f64,
    pub lat2: f64,
}

impl BoundingBox {
    pub fn new(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Self {
        BoundingBox {
            lon1,
            lat1,
            lon2,
            lat2,
        }
    }

    /// The larger of the longitude and latitude extents in degrees.
    pub fn max_span(&self) -> f64 {
        (self.lon2 - self.lon1).max(self.lat2 - self.lat1)
    }

    /// Picks a zoom level so that the box is covered by a bounded number of
    /// tiles: one level per halving of the span, starting from 720°.
    ///
    /// # Example
    /// ```rust
    /// # use gsi_maps::BoundingBox;
    /// assert_eq!(BoundingBox::new(0.0, 0.0, 1.0, 0.5).select_zoom(), 10);
    /// ```
    pub fn select_zoom(&self) -> u8 {
        let span = self.max_span();
        if !(span > 0_f64) {
            return MAX_ZOOM;
        }

        let zoom = (720_f64 / span).log2().floor() + 1_f64;
        zoom.max(MIN_ZOOM as f64).min(MAX_ZOOM as f64) as u8
    }

    /// Projects the north-west and south-east corners of the box at `zoom`.
    pub fn corners(&self, zoom: u8) -> (TileCoord, TileCoord) {
        (
            TileCoord::from_lon_lat(self.lon1, self.lat2, zoom),
            TileCoord::from_lon_lat(self.lon2, self.lat1, zoom),
        )
    }
}

/// A bounding box fixture containing preset coordinates for a known geographic
/// region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fixture {
    Japan,
    Kumamoto,
    Tokyo,
}

impl std::str::FromStr for Fixture {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Fixture::*;

        let s = s.to_lowercase();
        if s.starts_with("jap") {
            return Ok(Japan);
        }

        if s.starts_with("kuma") {
            return Ok(Kumamoto);
        }

        if s.starts_with("tok") {
            return Ok(Tokyo);
        }

        Err("unrecognized fixture")
    }
}

impl std::convert::From<Fixture> for BoundingBox {
    fn from(fixture: Fixture) -> Self {
        use Fixture::*;

        match fixture {
            Japan => Self::new(122.9, 24.0, 146.0, 45.6),
            Kumamoto => Self::new(130.098381, 32.576906, 130.455437, 32.892849),
            Tokyo => Self::new(139.56, 35.52, 139.92, 35.82),
        }
    }
}
