//! Relay to the external tile service.
//!
//! Every request is made against the configured raster. Bodies and content
//! types are passed through untouched, except for the tile descriptor whose
//! tile URLs are pointed back at the relay.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use crate::config::{TileConfig, TILE_RELAY_PREFIX};

const TILE_MATRIX_SET: &str = "WebMercatorQuad";

/// Upstream response body with its content type.
#[derive(Debug, Clone, PartialEq)]
pub struct Passthrough {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Tile address as requested by a map client. `y` may carry a `@<scale>x` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub z: u32,
    pub x: u32,
    pub y: u32,
    pub scale: u32,
}

impl TileCoord {
    pub fn parse(z: &str, x: &str, y: &str) -> Option<Self> {
        let (y, scale) = match y.split_once('@') {
            Some((y, suffix)) => (y, suffix.strip_suffix('x')?.parse().ok()?),
            None => (y, 1),
        };
        Some(Self {
            z: z.parse().ok()?,
            x: x.parse().ok()?,
            y: y.parse().ok()?,
            scale,
        })
    }
}

pub struct TileRelay {
    http: reqwest::Client,
    config: TileConfig,
}

impl TileRelay {
    pub fn new(config: TileConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build tile HTTP client")?;
        Ok(Self { http, config })
    }

    pub async fn tile(&self, coord: TileCoord) -> Result<Passthrough> {
        let url = format!(
            "{}/cog/tiles/{}/{}/{}/{}@{}x",
            self.config.titiler_url, TILE_MATRIX_SET, coord.z, coord.x, coord.y, coord.scale
        );
        self.fetch(&url, "image/png").await
    }

    pub async fn info(&self) -> Result<Passthrough> {
        let url = format!("{}/cog/info", self.config.titiler_url);
        self.fetch(&url, "application/json").await
    }

    /// Tile descriptor with every upstream tile URL rewritten to the relay prefix.
    pub async fn tilejson(&self) -> Result<Value> {
        let url = format!(
            "{}/cog/{}/tilejson.json",
            self.config.titiler_url, TILE_MATRIX_SET
        );
        let upstream = self.fetch(&url, "application/json").await?;
        let mut descriptor: Value =
            serde_json::from_slice(&upstream.body).context("tile descriptor is not JSON")?;

        let prefix = format!("{}/cog/tiles/{}", self.config.public_url, TILE_MATRIX_SET);
        rewrite_tiles(&mut descriptor, &prefix, TILE_RELAY_PREFIX)?;
        Ok(descriptor)
    }

    async fn fetch(&self, url: &str, default_content_type: &str) -> Result<Passthrough> {
        debug!("Relaying {}", url);
        let response = self
            .http
            .get(url)
            .query(&[("url", self.config.cog_url.as_str())])
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{} returned {}", url, status);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(default_content_type)
            .to_string();
        let body = response
            .bytes()
            .await
            .with_context(|| format!("failed to read body from {}", url))?;

        Ok(Passthrough {
            content_type,
            body: body.to_vec(),
        })
    }
}

fn rewrite_tiles(descriptor: &mut Value, from: &str, to: &str) -> Result<()> {
    let tiles = descriptor
        .get_mut("tiles")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| anyhow!("tile descriptor has no tiles"))?;

    for tile in tiles.iter_mut() {
        if let Some(url) = tile.as_str() {
            if let Some(rest) = url.strip_prefix(from) {
                *tile = Value::String(format!("{}{}", to, rest));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_accept_a_scale_suffix() {
        assert_eq!(
            TileCoord::parse("3", "4", "5"),
            Some(TileCoord { z: 3, x: 4, y: 5, scale: 1 })
        );
        assert_eq!(
            TileCoord::parse("3", "4", "5@2x"),
            Some(TileCoord { z: 3, x: 4, y: 5, scale: 2 })
        );
        assert_eq!(TileCoord::parse("3", "4", "5@2"), None);
        assert_eq!(TileCoord::parse("a", "4", "5"), None);
    }

    #[test]
    fn only_matching_tile_urls_are_rewritten() {
        let mut descriptor = json!({
            "tilejson": "2.2.0",
            "tiles": [
                "http://localhost:8080/cog/tiles/WebMercatorQuad/{z}/{x}/{y}@1x?url=%2Fdata%2Fr.tif",
                "https://elsewhere/tiles/{z}/{x}/{y}"
            ]
        });
        rewrite_tiles(
            &mut descriptor,
            "http://localhost:8080/cog/tiles/WebMercatorQuad",
            "/raster/tiles",
        )
        .unwrap();

        assert_eq!(
            descriptor["tiles"],
            json!([
                "/raster/tiles/{z}/{x}/{y}@1x?url=%2Fdata%2Fr.tif",
                "https://elsewhere/tiles/{z}/{x}/{y}"
            ])
        );
        assert_eq!(descriptor["tilejson"], "2.2.0");
    }

    #[test]
    fn descriptor_without_tiles_is_an_error() {
        let mut descriptor = json!({"bounds": [0, 0, 1, 1]});
        assert!(rewrite_tiles(&mut descriptor, "a", "b").is_err());
    }
}
