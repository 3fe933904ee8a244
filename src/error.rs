use std::io;

use thiserror::Error;

use crate::tile::Tile;

/// Errors produced while building a mosaic or a KMZ overlay.
#[derive(Debug, Error)]
pub enum Error {
    /// The request cannot be served as configured, e.g. too many tiles.
    #[error("{0}")]
    Config(String),

    #[error("failed creating HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("failed fetching tile {}x{}x{}", .tile.z, .tile.x, .tile.y)]
    Network {
        tile: Tile,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed decoding tile {}x{}x{}", .tile.z, .tile.x, .tile.y)]
    Decode {
        tile: Tile,
        #[source]
        source: image::ImageError,
    },

    #[error("failed encoding image")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed writing archive")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed formatting tile URL: {0}")]
    Url(String),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
