use clap::crate_version;
use futures::future::{BoxFuture, FutureExt};
use image::DynamicImage;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::tile::Tile;
use crate::url::{MapType, UrlFormat};

const ZERO_DURATION: Duration = Duration::from_secs(0);

/// Something that can hand out decoded tile images.
pub trait TileSource {
    fn fetch<'a>(&'a self, tile: Tile) -> BoxFuture<'a, Result<DynamicImage>>;
}

/// Downloads tiles of one map layer over HTTP, one request per tile.
#[derive(Debug)]
pub struct HttpTileSource {
    client: reqwest::Client,
    url: UrlFormat,
    map_type: MapType,
}

impl HttpTileSource {
    /// Creates a source with its own HTTP client.
    ///
    /// A zero `timeout` disables the per-request timeout.
    pub fn new(url: UrlFormat, map_type: MapType, timeout: Duration) -> Result<Self> {
        let user_agent = format!("gsi-maps_rs_{}", crate_version!());

        Ok(Self {
            client: build_client(timeout, &user_agent)?,
            url,
            map_type,
        })
    }

    async fn fetch_tile(&self, tile: Tile) -> Result<DynamicImage> {
        let formatted_url = self.url.tile_url(&tile, &self.map_type)?;
        debug!(url = %formatted_url, "fetching tile");

        let network = |source| Error::Network { tile, source };
        let bytes = self
            .client
            .get(&formatted_url)
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?
            .bytes()
            .await
            .map_err(network)?;

        image::load_from_memory(&bytes).map_err(|source| Error::Decode { tile, source })
    }
}

fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if timeout > ZERO_DURATION {
        builder = builder.timeout(timeout);
    }

    builder.user_agent(user_agent).build().map_err(Error::Client)
}

impl TileSource for HttpTileSource {
    fn fetch<'a>(&'a self, tile: Tile) -> BoxFuture<'a, Result<DynamicImage>> {
        self.fetch_tile(tile).boxed()
    }
}
