//! Building KMZ point overlays.

use std::io::{Cursor, Seek, Write};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::bucket::{bucketize, ValueRange};
use crate::config::KmzConfig;
use crate::error::{Error, Result};
use crate::kml::{write_kml, IconSize, PointRecord, COLORBAR_HREF, ICON_HREF};
use crate::output;
use crate::render::{encode_png, render_colorbar, render_icon};

/// Name of the KML document inside the archive.
pub const KML_ENTRY: &str = "tmp.kml";

/// Writes a KMZ archive to `w` containing the KML document produced by
/// `kml` and the two images it references.
pub fn write_kmz<W, F>(w: W, kml: F, colorbar_png: &[u8], icon_png: &[u8]) -> Result<W>
where
    W: Write + Seek,
    F: FnOnce(&mut ZipWriter<W>) -> std::io::Result<()>,
{
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(w);

    zip.start_file(KML_ENTRY, options)?;
    kml(&mut zip)?;

    zip.start_file(COLORBAR_HREF, options)?;
    zip.write_all(colorbar_png)?;

    zip.start_file(ICON_HREF, options)?;
    zip.write_all(icon_png)?;

    Ok(zip.finish()?)
}

/// Creates a KMZ file of `points` colored by value.
///
/// # Example
/// ```rust,no_run
/// use gsi_maps::{make_kmz, KmzConfig, PointRecord};
///
/// let points = vec![PointRecord {
///     lon: 142.37,
///     lat: 38.3,
///     value: 29.0,
///     label: "Tohoku".to_owned(),
/// }];
/// let mut config = KmzConfig::new("earthquakes.kmz");
/// config.vmin = Some(0.0);
/// config.vmax = Some(40.0);
///
/// make_kmz(&config, &points).expect("failed building KMZ");
/// ```
pub fn make_kmz(cfg: &KmzConfig, points: &[PointRecord]) -> Result<()> {
    if cfg.n_colors == 0 {
        return Err(Error::config("at least one color is required"));
    }
    if let IconSize::PerPoint(sizes) = &cfg.icon_size {
        if sizes.len() != points.len() {
            return Err(Error::config(format!(
                "got {} icon sizes for {} points",
                sizes.len(),
                points.len()
            )));
        }
    }

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let range = ValueRange::resolve(&values, cfg.vmin, cfg.vmax, cfg.scale)?;
    let colors = cfg.colormap.discretize(cfg.n_colors);
    let buckets = bucketize(&values, &range, cfg.n_colors);
    info!(
        points = points.len(),
        vmin = range.vmin,
        vmax = range.vmax,
        colormap = %cfg.colormap,
        "building KMZ"
    );

    let colorbar = encode_png(&render_colorbar(&colors, &range, &cfg.colorbar))?;
    let icon = encode_png(&render_icon(cfg.icon_edge))?;

    let archive = write_kmz(
        Cursor::new(Vec::new()),
        |w| write_kml(w, &cfg.name, &colors, points, &buckets, &cfg.icon_size),
        &colorbar,
        &icon,
    )?;

    output::write_atomic(&cfg.output, archive.get_ref())?;
    info!(path = %cfg.output.display(), "wrote KMZ");

    Ok(())
}
