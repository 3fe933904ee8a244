use maplit::hashmap;
use std::fmt;
use strfmt::strfmt;

use crate::error::{Error, Result};
use crate::tile::Tile;

/// Host of the GSI tile server.
pub const GSI_HOST: &str = "cyberjapandata.gsi.go.jp";

/// URL layout of the GSI tile server.
pub const GSI_URL_FORMAT: &str = "https://{host}/xyz/{map_type}/{z}/{x}/{y}.{ext}";

/// Image encoding of the tiles of a map layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TileFormat {
    Png,
    Jpg,
}

impl TileFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TileFormat::Png => "png",
            TileFormat::Jpg => "jpg",
        }
    }
}

/// Tile id of a map layer, e.g. `std`, `pale`, `english` or `seamlessphoto`.
///
/// See https://maps.gsi.go.jp/development/ichiran.html for the full list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MapType(String);

impl MapType {
    pub fn new(id: impl Into<String>) -> Self {
        MapType(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Photo layers are served as JPEG, everything else as PNG.
    pub fn format(&self) -> TileFormat {
        match self.0.as_str() {
            "seamlessphoto" | "ort" => TileFormat::Jpg,
            _ => TileFormat::Png,
        }
    }
}

impl Default for MapType {
    fn default() -> Self {
        MapType::new("std")
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tile URL template with the specifiers `{host}`, `{map_type}`, `{z}`,
/// `{x}`, `{y}` and `{ext}`.
#[derive(Clone, PartialEq)]
pub struct UrlFormat {
    format_str: String,
    host: String,
}

impl UrlFormat {
    pub fn new(format_str: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            format_str: format_str.into(),
            host: host.into(),
        }
    }

    pub fn tile_url(&self, tile: &Tile, map_type: &MapType) -> Result<String> {
        let vars = hashmap! {
            "host".to_owned() => self.host.clone(),
            "map_type".to_owned() => map_type.as_str().to_owned(),
            "x".to_owned() => tile.x.to_string(),
            "y".to_owned() => tile.y.to_string(),
            "z".to_owned() => tile.z.to_string(),
            "ext".to_owned() => map_type.format().extension().to_owned(),
        };

        strfmt(&self.format_str, &vars).map_err(|e| Error::Url(e.to_string()))
    }
}

impl Default for UrlFormat {
    fn default() -> Self {
        Self::new(GSI_URL_FORMAT, GSI_HOST)
    }
}

impl fmt::Debug for UrlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlFormat")
            .field("format_str", &self.format_str)
            .field("host", &self.host)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gsi_url() {
        let url = UrlFormat::default()
            .tile_url(&Tile::new(3527, 1649, 12), &MapType::default())
            .unwrap();
        assert_eq!(
            url,
            "https://cyberjapandata.gsi.go.jp/xyz/std/12/3527/1649.png"
        );
    }

    #[test]
    fn photo_layers_use_jpg() {
        let url = UrlFormat::default()
            .tile_url(&Tile::new(1, 2, 3), &MapType::new("seamlessphoto"))
            .unwrap();
        assert!(url.ends_with("/seamlessphoto/3/1/2.jpg"));
        assert_eq!(MapType::new("ort").format(), TileFormat::Jpg);
        assert_eq!(MapType::new("pale").format(), TileFormat::Png);
    }

    #[test]
    fn unknown_specifier_is_an_error() {
        let fmt = UrlFormat::new("https://{host}/{nope}/{z}", GSI_HOST);
        let res = fmt.tile_url(&Tile::new(0, 0, 1), &MapType::default());
        assert!(matches!(res, Err(Error::Url(_))));
    }
}
