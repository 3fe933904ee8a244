use futures::future::{BoxFuture, FutureExt};
use image::{DynamicImage, Rgb, RgbImage};
use indicatif::ProgressBar;
use std::sync::Mutex;

use gsi_maps::{
    build_mosaic, create_image_with, BoundingBox, Error, MosaicConfig, Result, Tile, TileGrid,
    TileSource, TILE_SIZE,
};

/// Serves solid tiles whose color encodes the tile position, failing on
/// `broken` if set.
#[derive(Default)]
struct SolidTiles {
    fetched: Mutex<Vec<Tile>>,
    broken: Option<Tile>,
}

fn tile_color(tile: Tile) -> Rgb<u8> {
    Rgb([(tile.x % 256) as u8, (tile.y % 256) as u8, 7])
}

impl TileSource for SolidTiles {
    fn fetch<'a>(&'a self, tile: Tile) -> BoxFuture<'a, Result<DynamicImage>> {
        async move {
            self.fetched.lock().unwrap().push(tile);
            if self.broken == Some(tile) {
                let source = image::load_from_memory(b"not an image").unwrap_err();
                return Err(Error::Decode { tile, source });
            }

            let img = RgbImage::from_pixel(TILE_SIZE, TILE_SIZE, tile_color(tile));
            Ok(DynamicImage::ImageRgb8(img))
        }
        .boxed()
    }
}

fn kyushu() -> BoundingBox {
    BoundingBox::new(130.0, 32.5, 130.5, 33.0)
}

#[tokio::test]
async fn stitches_cropped_tiles() {
    let grid = TileGrid::new(&kyushu(), 12).unwrap();
    let source = SolidTiles::default();

    let img = build_mosaic(&grid, &source, &ProgressBar::hidden())
        .await
        .unwrap();

    assert_eq!(img.dimensions(), (1456, 1731));
    assert_eq!(source.fetched.lock().unwrap().len(), 48);

    // left_px = 28 and top_px = 222 are cut from the first column and row
    let first_col_end = TILE_SIZE - 28;
    let first_row_end = TILE_SIZE - 222;
    assert_eq!(*img.get_pixel(0, 0), tile_color(Tile::new(3527, 1649, 12)));
    assert_eq!(
        *img.get_pixel(first_col_end - 1, first_row_end - 1),
        tile_color(Tile::new(3527, 1649, 12))
    );
    assert_eq!(
        *img.get_pixel(first_col_end, first_row_end),
        tile_color(Tile::new(3528, 1650, 12))
    );
    assert_eq!(
        *img.get_pixel(1455, 1730),
        tile_color(Tile::new(3532, 1656, 12))
    );
    assert_eq!(*img.get_pixel(0, 1730), tile_color(Tile::new(3527, 1656, 12)));
}

#[tokio::test]
async fn fetches_corners_first() {
    let grid = TileGrid::new(&kyushu(), 12).unwrap();
    let source = SolidTiles::default();
    build_mosaic(&grid, &source, &ProgressBar::hidden())
        .await
        .unwrap();

    let fetched = source.fetched.lock().unwrap();
    let corners: Vec<_> = fetched[..4].iter().map(|t| (t.x, t.y)).collect();
    assert_eq!(
        corners,
        vec![(3527, 1649), (3527, 1656), (3532, 1649), (3532, 1656)]
    );
    assert_eq!(*fetched.last().unwrap(), Tile::new(3531, 1655, 12));
}

#[tokio::test]
async fn failing_tile_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("mosaic.png");
    let mut config = MosaicConfig::new(kyushu(), &output);
    config.zoom = Some(12);

    let source = SolidTiles {
        broken: Some(Tile::new(3529, 1652, 12)),
        ..SolidTiles::default()
    };

    let err = create_image_with(&config, &source).await.unwrap_err();
    assert!(matches!(err, Error::Decode { tile, .. } if tile == Tile::new(3529, 1652, 12)));
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn tile_cap_is_checked_before_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = MosaicConfig::new(kyushu(), dir.path().join("mosaic.png"));
    config.zoom = Some(16);

    let source = SolidTiles::default();
    let err = create_image_with(&config, &source).await.unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(source.fetched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn writes_single_tile_mosaic() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("tiny.png");
    let mut config = MosaicConfig::new(BoundingBox::new(130.01, 32.95, 130.05, 32.99), &output);
    config.zoom = Some(12);

    let source = SolidTiles::default();
    let path = create_image_with(&config, &source).await.unwrap();
    assert_eq!(path, output);

    let img = image::open(&output).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (174 - 57, 139));
    assert_eq!(*img.get_pixel(10, 10), tile_color(Tile::new(3527, 1650, 12)));
    assert_eq!(
        *source.fetched.lock().unwrap(),
        vec![Tile::new(3527, 1650, 12)]
    );
}

#[tokio::test]
async fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("tiny.xyz");
    let mut config = MosaicConfig::new(BoundingBox::new(130.01, 32.95, 130.05, 32.99), &output);
    config.zoom = Some(12);

    let source = SolidTiles::default();
    let err = create_image_with(&config, &source).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!output.exists());
    assert!(source.fetched.lock().unwrap().is_empty());
}

#[tokio::test]
async fn tile_cap_is_inclusive() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("mosaic.png");
    let mut config = MosaicConfig::new(kyushu(), &output);
    config.zoom = Some(12);

    config.max_tiles = 47;
    let source = SolidTiles::default();
    let err = create_image_with(&config, &source).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(source.fetched.lock().unwrap().is_empty());
    assert!(!output.exists());

    config.max_tiles = 48;
    let source = SolidTiles::default();
    create_image_with(&config, &source).await.unwrap();
    assert_eq!(source.fetched.lock().unwrap().len(), 48);
    assert!(output.exists());
}
