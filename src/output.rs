//! Writing finished artifacts to disk.
//!
//! Files are written to a uniquely named temporary file next to the target
//! and renamed into place once complete.

use image::{ImageFormat, RgbImage};
use std::io::{Cursor, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// The image format implied by the extension of `path`, if this build can
/// encode it.
pub fn image_format(path: &Path) -> Result<ImageFormat> {
    match ImageFormat::from_path(path) {
        Ok(format) if format.writing_enabled() => Ok(format),
        _ => Err(Error::config(format!(
            "cannot write an image format inferred from {}",
            path.display()
        ))),
    }
}

/// Encodes `img` in the format implied by the extension of `path` and
/// writes it there.
pub fn write_image(img: &RgbImage, path: &Path) -> Result<()> {
    let format = image_format(path)?;

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).map_err(Error::Encode)?;

    write_atomic(path, buf.get_ref())
}

/// Writes `bytes` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".gsi-maps-")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn writes_png_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let img = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        write_image(&img, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back, img);
        // no temporary files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbImage::new(1, 1);
        let res = write_image(&img, &dir.path().join("out.nope"));
        assert!(matches!(res, Err(Error::Config(_))));
    }

    #[test]
    fn formats_without_encoder_are_rejected() {
        assert_eq!(image_format(Path::new("a/map.jpg")).unwrap(), ImageFormat::Jpeg);
        assert_eq!(image_format(Path::new("map.PNG")).unwrap(), ImageFormat::Png);
        // known format, but no encoder compiled in
        assert!(matches!(
            image_format(Path::new("map.tif")),
            Err(Error::Config(_))
        ));
        assert!(image_format(Path::new("map")).is_err());
    }
}
