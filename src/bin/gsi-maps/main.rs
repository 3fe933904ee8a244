mod args;
mod validators;

use anyhow::{Context, Result};
use std::fs::File;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{Args, KmzArgs};
use gsi_maps::{create_image, make_kmz, read_points, MosaicConfig, TileGrid};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse() {
        Args::Mosaic(args) => {
            let dry_run = args.dry_run;
            let config: MosaicConfig = args.into();

            if dry_run {
                dry_run_mosaic(&config)
            } else {
                let path = create_image(&config)
                    .await
                    .context("failed building mosaic")?;
                println!("{}", path.display());
                Ok(())
            }
        }
        Args::Kmz(args) => kmz(args),
    }
}

fn dry_run_mosaic(config: &MosaicConfig) -> Result<()> {
    let zoom = config.resolve_zoom();
    let grid = TileGrid::new(&config.bounding_box, zoom).context("invalid region")?;
    let tile_count = grid.tile_count();

    eprintln!(
        "would download {} tiles at zoom level {} for a {}x{} image (approx {}, assuming 10 kb per tile)",
        tile_count,
        zoom,
        grid.width(),
        grid.height(),
        pretty_bytes::converter::convert((tile_count as f64) * 10_000f64)
    );
    if tile_count > config.max_tiles {
        eprintln!(
            "this exceeds the limit of {} tiles, reduce the zoom level",
            config.max_tiles
        );
    }

    Ok(())
}

fn kmz(args: KmzArgs) -> Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("failed opening {}", args.input.display()))?;
    let set = read_points(file)
        .with_context(|| format!("failed reading points from {}", args.input.display()))?;
    info!(points = set.points.len(), "read points");

    let icon_size = set.icon_size(args.icon_size);
    let config = args.into_config(icon_size);
    make_kmz(&config, &set.points).context("failed building KMZ")?;
    println!("{}", config.output.display());

    Ok(())
}
