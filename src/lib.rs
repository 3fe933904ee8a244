//! Stitch GSI map tiles into a single image, and plot point data as a
//! colored KMZ overlay.
//!
//! # Usage
//!
//! The crate ships a CLI, `gsi-maps`, with the subcommands `mosaic` and
//! `kmz`. You can access its help via `-h` / `--help`.
//!
//! It is also available as a library.
//!
//! # CLI Example
//!
//! ```bash
//! gsi-maps mosaic \
//!   --lon1 130.098381 --lat1 32.576906 \
//!   --lon2 130.455437 --lat2 32.892849 \
//!   --zoom 12 \
//!   --map-type seamlessphoto \
//!   --output kumamoto.png
//!
//! gsi-maps kmz --input quakes.csv --vmin 0 --vmax 40 --output quakes.kmz
//! ```
//!
//! # Library Example
//! ```rust,no_run
//! use gsi_maps::{create_image, BoundingBox, MosaicConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bbox = BoundingBox::new(130.098381, 32.576906, 130.455437, 32.892849);
//! let config = MosaicConfig::new(bbox, "kumamoto.png");
//!
//! create_image(&config).await.expect("failed building mosaic");
//! # }
//! ```

mod bounding_box;
mod bucket;
mod colormap;
mod config;
mod error;
mod fetch;
mod kml;
mod kmz;
mod mosaic;
mod output;
mod points;
mod render;
mod tile;
mod url;

pub use bounding_box::{BoundingBox, Fixture};
pub use bucket::{bucketize, Scale, ValueRange};
pub use colormap::{kml_color, Colormap};
pub use config::{KmzConfig, MosaicConfig, DEFAULT_MAX_TILES, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use fetch::{HttpTileSource, TileSource};
pub use kml::{write_kml, IconSize, PointRecord};
pub use kmz::{make_kmz, write_kmz, KML_ENTRY};
pub use mosaic::{
    build_mosaic, create_image, create_image_with, plan, resolve_grid, Corner, Crop, Placement,
    Region, TileGrid,
};
pub use points::{read_points, PointSet};
pub use render::{encode_png, render_colorbar, render_icon, ColorbarStyle, TickDirection};
pub use tile::{Tile, TileCoord, MAX_ZOOM, MIN_ZOOM, TILE_SIZE};
pub use url::{MapType, TileFormat, UrlFormat, GSI_HOST, GSI_URL_FORMAT};
