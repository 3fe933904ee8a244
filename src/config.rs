use std::{path::PathBuf, time::Duration};

use crate::bounding_box::BoundingBox;
use crate::bucket::Scale;
use crate::colormap::Colormap;
use crate::kml::IconSize;
use crate::render::ColorbarStyle;
use crate::url::{MapType, UrlFormat};

/// Refuse to download more tiles than this unless told otherwise.
pub const DEFAULT_MAX_TILES: usize = 500;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Mosaic building configuration.
#[derive(Debug, PartialEq)]
pub struct MosaicConfig {
    /// Region to cover, bottom-left and top-right corners.
    pub bounding_box: BoundingBox,

    /// Zoom level of the tiles. Derived from the bounding box if unset.
    pub zoom: Option<u8>,

    /// Tile id of the map layer.
    pub map_type: MapType,

    /// The URL to download individual tiles from.
    pub url: UrlFormat,

    /// Timeout for fetching a single tile.
    ///
    /// Pass the zero duration to disable the timeout.
    pub timeout: Duration,

    /// Upper bound on the number of tiles a single mosaic may consist of.
    pub max_tiles: usize,

    /// The image file to write. Its extension selects the format.
    pub output: PathBuf,
}

impl MosaicConfig {
    pub fn new(bounding_box: BoundingBox, output: impl Into<PathBuf>) -> Self {
        Self {
            bounding_box,
            zoom: None,
            map_type: MapType::default(),
            url: UrlFormat::default(),
            timeout: DEFAULT_TIMEOUT,
            max_tiles: DEFAULT_MAX_TILES,
            output: output.into(),
        }
    }

    /// The configured zoom level, or the one fitting the bounding box.
    pub fn resolve_zoom(&self) -> u8 {
        self.zoom
            .unwrap_or_else(|| self.bounding_box.select_zoom())
    }
}

/// KMZ overlay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct KmzConfig {
    /// The archive to write.
    pub output: PathBuf,

    /// Name of the KML document.
    pub name: String,

    pub colormap: Colormap,

    /// Number of discrete colors.
    pub n_colors: usize,

    /// Lower end of the color scale. Defaults to the smallest value.
    pub vmin: Option<f64>,

    /// Upper end of the color scale. Defaults to the largest value.
    pub vmax: Option<f64>,

    pub scale: Scale,

    pub icon_size: IconSize,

    /// Draw a black edge around the icon.
    pub icon_edge: bool,

    pub colorbar: ColorbarStyle,
}

impl KmzConfig {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            name: "untitled".to_owned(),
            colormap: Colormap::Jet,
            n_colors: 10,
            vmin: None,
            vmax: None,
            scale: Scale::Linear,
            icon_size: IconSize::Uniform(0.5),
            icon_edge: true,
            colorbar: ColorbarStyle::default(),
        }
    }
}
