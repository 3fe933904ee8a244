//! Tile grid arithmetic and compositing of tiles into a single image.

use image::{imageops, RgbImage};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::bounding_box::BoundingBox;
use crate::config::MosaicConfig;
use crate::error::{Error, Result};
use crate::fetch::{HttpTileSource, TileSource};
use crate::output;
use crate::tile::{Tile, TILE_SIZE};

/// The tiles covering a bounding box at one zoom level, along with the
/// pixel offsets of the box edges inside the outermost tiles.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TileGrid {
    pub zoom: u8,
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
    pub left_px: u32,
    pub right_px: u32,
    pub top_px: u32,
    pub bottom_px: u32,
}

impl TileGrid {
    /// Computes the grid for `bbox` at `zoom`.
    ///
    /// Fails if the box collapses to an empty or inverted image.
    pub fn new(bbox: &BoundingBox, zoom: u8) -> Result<Self> {
        let (nw, se) = bbox.corners(zoom);
        let grid = TileGrid {
            zoom,
            left: nw.tile.x,
            right: se.tile.x,
            top: nw.tile.y,
            bottom: se.tile.y,
            left_px: nw.px,
            right_px: se.px,
            top_px: nw.py,
            bottom_px: se.py,
        };

        let size = TILE_SIZE as i64;
        let x_span = grid.right as i64 * size + grid.right_px as i64;
        let y_span = grid.bottom as i64 * size + grid.bottom_px as i64;
        if x_span <= grid.left as i64 * size + grid.left_px as i64
            || y_span <= grid.top as i64 * size + grid.top_px as i64
        {
            return Err(Error::config(format!(
                "bounding box {:?} is empty at zoom level {}",
                bbox, zoom
            )));
        }

        Ok(grid)
    }

    pub fn tiles_x(&self) -> usize {
        self.right - self.left + 1
    }

    pub fn tiles_y(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_x() * self.tiles_y()
    }

    pub fn width(&self) -> u32 {
        TILE_SIZE * self.tiles_x() as u32 - self.left_px - (TILE_SIZE - self.right_px)
    }

    pub fn height(&self) -> u32 {
        TILE_SIZE * self.tiles_y() as u32 - self.top_px - (TILE_SIZE - self.bottom_px)
    }

    /// Iterates over every tile of the grid, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> {
        let (left, right, zoom) = (self.left, self.right, self.zoom);
        (self.top..=self.bottom)
            .flat_map(move |y| (left..=right).map(move |x| Tile::new(x, y, zoom)))
    }

    // Crop bounds of the far column/row when the grid is one tile wide/tall.
    fn x_bounds(&self) -> (u32, u32) {
        if self.tiles_x() >= 2 {
            (0, TILE_SIZE)
        } else {
            (self.left_px, self.right_px)
        }
    }

    fn y_bounds(&self) -> (u32, u32) {
        if self.tiles_y() >= 2 {
            (0, TILE_SIZE)
        } else {
            (self.top_px, self.bottom_px)
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

/// Where a tile sits inside the grid. Each region has its own crop rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Region {
    Corner(Corner),
    EdgeTop,
    EdgeBottom,
    EdgeLeft,
    EdgeRight,
    Interior,
}

/// Pixel rectangle inside a tile, `x0..x1` by `y0..y1`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Crop {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Crop {
    const FULL: Crop = Crop {
        x0: 0,
        y0: 0,
        x1: TILE_SIZE,
        y1: TILE_SIZE,
    };

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}

/// One step of the mosaic plan: which part of which tile goes where.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Placement {
    pub tile: Tile,
    pub region: Region,
    pub crop: Crop,
    pub offset: (u32, u32),
}

impl Region {
    fn crop(self, grid: &TileGrid) -> Crop {
        let (x_min, x_max) = grid.x_bounds();
        let (y_min, y_max) = grid.y_bounds();
        let (left, right) = (grid.left_px, grid.right_px);
        let (top, bottom) = (grid.top_px, grid.bottom_px);

        let (x0, y0, x1, y1) = match self {
            Region::Corner(Corner::NorthWest) => (left, top, x_max, y_max),
            Region::Corner(Corner::SouthWest) => (left, y_min, x_max, bottom),
            Region::Corner(Corner::NorthEast) => (x_min, top, right, y_max),
            Region::Corner(Corner::SouthEast) => (x_min, y_min, right, bottom),
            Region::EdgeTop => (0, top, TILE_SIZE, y_max),
            Region::EdgeBottom => (0, y_min, TILE_SIZE, bottom),
            Region::EdgeLeft => (left, 0, x_max, TILE_SIZE),
            Region::EdgeRight => (x_min, 0, right, TILE_SIZE),
            Region::Interior => return Crop::FULL,
        };

        Crop { x0, y0, x1, y1 }
    }
}

/// Lays out every tile of the grid in fetch order: corners, top and bottom
/// strips, left and right strips, then the interior row by row.
///
/// Placements that address the same tile (single row or column grids) are
/// only visited once.
pub fn plan(grid: &TileGrid) -> Vec<Placement> {
    let (nx, ny) = (grid.tiles_x(), grid.tiles_y());
    let (x_min, _) = grid.x_bounds();
    let (y_min, _) = grid.y_bounds();
    let size = TILE_SIZE as usize;

    // offsets of the inner columns/rows and of the far column/row; on a
    // single column/row x_min == left_px, so the far offset is 0
    let col_x = |i: usize| (i * size) as u32 - grid.left_px;
    let row_y = |j: usize| (j * size) as u32 - grid.top_px;
    let right_x = ((nx - 1) * size) as u32 + x_min - grid.left_px;
    let bottom_y = ((ny - 1) * size) as u32 + y_min - grid.top_px;

    let tile = |x: usize, y: usize| Tile::new(x, y, grid.zoom);
    let mut placements = Vec::with_capacity(nx * ny);
    let mut push = |tile: Tile, region: Region, offset: (u32, u32)| {
        placements.push(Placement {
            tile,
            region,
            crop: region.crop(grid),
            offset,
        })
    };

    let mut seen = HashSet::new();
    let corners = [
        (Corner::NorthWest, grid.left, grid.top, (0, 0)),
        (Corner::SouthWest, grid.left, grid.bottom, (0, bottom_y)),
        (Corner::NorthEast, grid.right, grid.top, (right_x, 0)),
        (Corner::SouthEast, grid.right, grid.bottom, (right_x, bottom_y)),
    ];
    for &(corner, x, y, offset) in corners.iter() {
        if seen.insert((x, y)) {
            push(tile(x, y), Region::Corner(corner), offset);
        }
    }

    for i in 1..nx.saturating_sub(1) {
        let x = grid.left + i;
        push(tile(x, grid.top), Region::EdgeTop, (col_x(i), 0));
        if ny >= 2 {
            push(tile(x, grid.bottom), Region::EdgeBottom, (col_x(i), bottom_y));
        }
    }

    for j in 1..ny.saturating_sub(1) {
        let y = grid.top + j;
        push(tile(grid.left, y), Region::EdgeLeft, (0, row_y(j)));
        if nx >= 2 {
            push(tile(grid.right, y), Region::EdgeRight, (right_x, row_y(j)));
        }
    }

    for j in 1..ny.saturating_sub(1) {
        for i in 1..nx.saturating_sub(1) {
            let offset = (col_x(i), row_y(j));
            push(tile(grid.left + i, grid.top + j), Region::Interior, offset);
        }
    }

    placements
}

/// Fetches every tile of `grid` from `source` one at a time and pastes the
/// cropped tiles into a new image.
///
/// The first failing tile aborts the whole build.
pub async fn build_mosaic<S>(grid: &TileGrid, source: &S, pb: &ProgressBar) -> Result<RgbImage>
where
    S: TileSource + ?Sized,
{
    let placements = plan(grid);
    pb.set_length(placements.len() as u64);

    let mut canvas = RgbImage::new(grid.width(), grid.height());
    for placement in placements {
        let Placement {
            tile,
            region,
            crop,
            offset: (x, y),
        } = placement;

        let img = source.fetch(tile).await?.to_rgb8();
        debug!(?tile, ?region, x, y, "pasting tile");

        let cropped =
            imageops::crop_imm(&img, crop.x0, crop.y0, crop.width(), crop.height()).to_image();
        imageops::replace(&mut canvas, &cropped, x as i64, y as i64);
        pb.inc(1);
    }

    Ok(canvas)
}

/// Resolves the zoom level and tile grid of `cfg`, refusing grids with more
/// tiles than allowed.
pub fn resolve_grid(cfg: &MosaicConfig) -> Result<TileGrid> {
    let zoom = cfg.resolve_zoom();
    if cfg.zoom.is_none() {
        info!(zoom, "selected zoom level");
    }

    let grid = TileGrid::new(&cfg.bounding_box, zoom)?;
    let tile_count = grid.tile_count();
    if tile_count > cfg.max_tiles {
        return Err(Error::config(format!(
            "too many tiles ({} > {}), reduce the zoom level",
            tile_count, cfg.max_tiles
        )));
    }

    Ok(grid)
}

/// Downloads the tiles covering the configured bounding box and saves them
/// as a single image.
///
/// The output file is only created once every tile has been fetched and
/// pasted; on error nothing is written.
///
/// # Example
/// ```rust,no_run
/// use gsi_maps::{create_image, BoundingBox, MapType, MosaicConfig};
///
/// # #[tokio::main]
/// # async fn main() {
/// let bbox = BoundingBox::new(130.098381, 32.576906, 130.455437, 32.892849);
/// let mut config = MosaicConfig::new(bbox, "kumamoto.png");
/// config.zoom = Some(12);
/// config.map_type = MapType::new("seamlessphoto");
///
/// create_image(&config).await.expect("failed building mosaic");
/// # }
/// ```
pub async fn create_image(cfg: &MosaicConfig) -> Result<PathBuf> {
    let source = HttpTileSource::new(cfg.url.clone(), cfg.map_type.clone(), cfg.timeout)?;
    create_image_with(cfg, &source).await
}

/// Like [`create_image`], but takes the tiles from `source` instead of the
/// configured tile server.
///
/// The output path and tile count are checked before the first fetch.
pub async fn create_image_with<S>(cfg: &MosaicConfig, source: &S) -> Result<PathBuf>
where
    S: TileSource + ?Sized,
{
    output::image_format(&cfg.output)?;
    let grid = resolve_grid(cfg)?;
    info!(
        zoom = grid.zoom,
        tiles = grid.tile_count(),
        width = grid.width(),
        height = grid.height(),
        "building mosaic"
    );

    let pb = ProgressBar::new(grid.tile_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} ETA: {eta} {msg}")
            .progress_chars("##-"),
    );

    let mosaic = build_mosaic(&grid, source, &pb).await;
    pb.finish_and_clear();

    output::write_image(&mosaic?, &cfg.output)?;
    info!(path = %cfg.output.display(), "wrote mosaic");

    Ok(cfg.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kyushu_grid() -> TileGrid {
        TileGrid::new(&BoundingBox::new(130.0, 32.5, 130.5, 33.0), 12).unwrap()
    }

    #[test]
    fn grid_matches_fixture() {
        let grid = kyushu_grid();
        assert_eq!((grid.left, grid.right), (3527, 3532));
        assert_eq!((grid.top, grid.bottom), (1649, 1656));
        assert_eq!((grid.left_px, grid.right_px), (28, 204));
        assert_eq!((grid.top_px, grid.bottom_px), (222, 161));
        assert_eq!(grid.tile_count(), 48);
        assert_eq!((grid.width(), grid.height()), (1456, 1731));
    }

    #[test]
    fn plan_visits_every_tile_once() {
        let grid = kyushu_grid();
        let placements = plan(&grid);
        assert_eq!(placements.len(), grid.tile_count());

        let planned: HashSet<_> = placements.iter().map(|p| p.tile).collect();
        let all: HashSet<_> = grid.tiles().collect();
        assert_eq!(planned, all);
    }

    #[test]
    fn plan_order_is_corners_edges_interior() {
        let placements = plan(&kyushu_grid());
        let regions: Vec<_> = placements.iter().map(|p| p.region).collect();

        assert_eq!(
            &regions[..4],
            &[
                Region::Corner(Corner::NorthWest),
                Region::Corner(Corner::SouthWest),
                Region::Corner(Corner::NorthEast),
                Region::Corner(Corner::SouthEast),
            ]
        );
        // 4 inner columns, top and bottom each
        assert!(regions[4..12]
            .iter()
            .all(|r| *r == Region::EdgeTop || *r == Region::EdgeBottom));
        // 6 inner rows, left and right each
        assert!(regions[12..24]
            .iter()
            .all(|r| *r == Region::EdgeLeft || *r == Region::EdgeRight));
        assert!(regions[24..].iter().all(|r| *r == Region::Interior));
        assert_eq!(regions.len() - 24, 4 * 6);
    }

    #[test]
    fn placements_tile_the_canvas() {
        let grid = kyushu_grid();
        let mut covered = 0_u64;
        for p in plan(&grid) {
            assert!(p.offset.0 + p.crop.width() <= grid.width());
            assert!(p.offset.1 + p.crop.height() <= grid.height());
            covered += p.crop.width() as u64 * p.crop.height() as u64;
        }
        assert_eq!(covered, grid.width() as u64 * grid.height() as u64);
    }

    #[test]
    fn corner_crops() {
        let grid = kyushu_grid();
        let placements = plan(&grid);

        let nw = placements[0];
        assert_eq!(nw.crop, Crop { x0: 28, y0: 222, x1: 256, y1: 256 });
        assert_eq!(nw.offset, (0, 0));

        let se = placements[3];
        assert_eq!(se.tile, Tile::new(3532, 1656, 12));
        assert_eq!(se.crop, Crop { x0: 0, y0: 0, x1: 204, y1: 161 });
        assert_eq!(se.offset, (5 * 256 - 28, 7 * 256 - 222));
    }

    #[test]
    fn single_tile_grid() {
        let bbox = BoundingBox::new(130.01, 32.95, 130.05, 32.99);
        let grid = TileGrid::new(&bbox, 12).unwrap();
        assert_eq!(grid.tile_count(), 1);
        assert_eq!(grid.width(), grid.right_px - grid.left_px);
        assert_eq!(grid.height(), grid.bottom_px - grid.top_px);

        let placements = plan(&grid);
        assert_eq!(placements.len(), 1);
        assert_eq!(
            placements[0].crop,
            Crop {
                x0: grid.left_px,
                y0: grid.top_px,
                x1: grid.right_px,
                y1: grid.bottom_px,
            }
        );
        assert_eq!(placements[0].offset, (0, 0));
    }

    #[test]
    fn single_column_grid() {
        let grid = TileGrid {
            zoom: 10,
            left: 5,
            right: 5,
            top: 7,
            bottom: 9,
            left_px: 10,
            right_px: 50,
            top_px: 100,
            bottom_px: 30,
        };
        let placements = plan(&grid);
        assert_eq!(placements.len(), 3);
        assert_eq!(grid.width(), 40);
        assert_eq!(grid.height(), 3 * 256 - 100 - (256 - 30));

        let left = placements
            .iter()
            .find(|p| p.region == Region::EdgeLeft)
            .unwrap();
        assert_eq!(left.crop, Crop { x0: 10, y0: 0, x1: 50, y1: 256 });
        assert_eq!(left.offset, (0, 256 - 100));
    }

    #[test]
    fn single_row_grid() {
        let grid = TileGrid {
            zoom: 10,
            left: 5,
            right: 8,
            top: 7,
            bottom: 7,
            left_px: 200,
            right_px: 30,
            top_px: 40,
            bottom_px: 90,
        };
        let placements = plan(&grid);
        assert_eq!(placements.len(), 4);
        assert_eq!(grid.height(), 50);

        let ne = placements
            .iter()
            .find(|p| p.region == Region::Corner(Corner::NorthEast))
            .unwrap();
        assert_eq!(ne.tile, Tile::new(8, 7, 10));
        assert_eq!(ne.crop, Crop { x0: 0, y0: 40, x1: 30, y1: 90 });
        assert_eq!(ne.offset, (3 * 256 - 200, 0));

        for p in &placements {
            assert_eq!(p.offset.1, 0);
            assert_eq!(p.crop.height(), 50);
        }
    }

    #[test]
    fn inverted_box_is_rejected() {
        let bbox = BoundingBox::new(130.5, 32.5, 130.0, 33.0);
        assert!(matches!(TileGrid::new(&bbox, 12), Err(Error::Config(_))));
    }

    #[test]
    fn tile_cap_is_enforced() {
        let mut cfg = MosaicConfig::new(BoundingBox::new(130.0, 32.5, 130.5, 33.0), "out.png");
        cfg.zoom = Some(16);
        assert!(matches!(resolve_grid(&cfg), Err(Error::Config(_))));

        cfg.zoom = Some(12);
        assert_eq!(resolve_grid(&cfg).unwrap().tile_count(), 48);
    }
}
