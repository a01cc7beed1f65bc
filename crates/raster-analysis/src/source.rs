//! Image sources and loading.
//!
//! An analysis accepts the same strings a browser image element would: an
//! `http(s)` URL or a base64 `data:` URI. Local paths (plain or `file://`)
//! are accepted too. Fetched bytes may be memoized in an injected
//! [`ImageCache`]; data URIs carry their bytes and are never cached.

use agro_common::{AnalysisError, AnalysisResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::ImageCache;
use tracing::{debug, instrument};

use crate::raster::DecodedRaster;

/// Where image bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Inline `data:<mime>;base64,<payload>` URI, already decoded.
    DataUri { mime: String, bytes: Bytes },
    /// Remote `http://` or `https://` URL.
    Url(String),
    /// Local file.
    Path(PathBuf),
}

impl ImageSource {
    /// Parse an image source string.
    pub fn parse(src: &str) -> AnalysisResult<Self> {
        let src = src.trim();
        if src.is_empty() {
            return Err(AnalysisError::image_load("image source is empty"));
        }

        if let Some(rest) = src.strip_prefix("data:") {
            return Self::parse_data_uri(rest);
        }

        let lower = src.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(ImageSource::Url(src.to_string()));
        }

        let path = src.strip_prefix("file://").unwrap_or(src);
        Ok(ImageSource::Path(PathBuf::from(path)))
    }

    fn parse_data_uri(rest: &str) -> AnalysisResult<Self> {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| AnalysisError::image_load("data URI has no payload"))?;

        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| AnalysisError::image_load("only base64 data URIs are supported"))?;

        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| AnalysisError::image_load(format!("invalid base64 payload: {}", e)))?;

        Ok(ImageSource::DataUri {
            mime: mime.to_string(),
            bytes: Bytes::from(bytes),
        })
    }

    /// Cache key for sources worth memoizing.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            ImageSource::DataUri { .. } => None,
            ImageSource::Url(url) => Some(url.clone()),
            ImageSource::Path(path) => Some(format!("file://{}", path.display())),
        }
    }
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::DataUri { mime, bytes } => {
                write!(f, "data:{} ({} bytes)", mime, bytes.len())
            }
            ImageSource::Url(url) => f.write_str(url),
            ImageSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches raw image bytes for a source.
#[derive(Clone)]
pub struct ImageLoader {
    client: reqwest::Client,
    cache: Option<Arc<ImageCache>>,
}

impl ImageLoader {
    pub fn new(timeout: Duration) -> AnalysisResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            cache: None,
        })
    }

    /// Memoize URL and file payloads in `cache`.
    pub fn with_cache(mut self, cache: Arc<ImageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Load the bytes behind `source`.
    #[instrument(skip(self, source), fields(source = %source))]
    pub async fn load(&self, source: &ImageSource) -> AnalysisResult<Bytes> {
        if let ImageSource::DataUri { bytes, .. } = source {
            return Ok(bytes.clone());
        }

        let key = source.cache_key();
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(bytes) = cache.get(key).await {
                debug!(bytes = bytes.len(), "Image cache hit");
                return Ok(bytes);
            }
        }

        let start = Instant::now();
        let bytes = match source {
            ImageSource::Url(url) => self.fetch(url).await?,
            ImageSource::Path(path) => {
                let data = tokio::fs::read(path).await.map_err(|e| {
                    AnalysisError::image_load(format!("{}: {}", path.display(), e))
                })?;
                Bytes::from(data)
            }
            ImageSource::DataUri { bytes, .. } => bytes.clone(),
        };
        debug!(
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Image bytes loaded"
        );

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            cache.set(key, bytes.clone(), None).await;
        }

        Ok(bytes)
    }

    async fn fetch(&self, url: &str) -> AnalysisResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AnalysisError::image_load(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::image_load(format!(
                "{} returned HTTP {}",
                url, status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| AnalysisError::image_load(format!("reading body of {}: {}", url, e)))
    }
}

/// Decode any supported image format into an RGBA8 raster.
pub fn decode_raster(bytes: &[u8]) -> AnalysisResult<DecodedRaster> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::image_load(format!("decode failed: {}", e)))?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedRaster::new(width, height, rgba.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert_eq!(
            ImageSource::parse("https://tiles.example.com/ndvi.png").unwrap(),
            ImageSource::Url("https://tiles.example.com/ndvi.png".to_string())
        );
        assert!(matches!(
            ImageSource::parse("HTTP://example.com/a.png").unwrap(),
            ImageSource::Url(_)
        ));
    }

    #[test]
    fn test_parse_path() {
        assert_eq!(
            ImageSource::parse("file:///tmp/scene.png").unwrap(),
            ImageSource::Path(PathBuf::from("/tmp/scene.png"))
        );
        assert_eq!(
            ImageSource::parse("scenes/ndmi.png").unwrap(),
            ImageSource::Path(PathBuf::from("scenes/ndmi.png"))
        );
    }

    #[test]
    fn test_parse_data_uri() {
        let src = ImageSource::parse("data:image/png;base64,AQID\nBA==").unwrap();
        match src {
            ImageSource::DataUri { mime, bytes } => {
                assert_eq!(mime, "image/png");
                assert_eq!(bytes.as_ref(), &[1, 2, 3, 4]);
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_data_uris() {
        assert!(ImageSource::parse("data:image/png,rawbytes").is_err());
        assert!(ImageSource::parse("data:image/png;base64").is_err());
        assert!(ImageSource::parse("data:image/png;base64,!!!").is_err());
        assert!(ImageSource::parse("   ").is_err());
    }

    #[test]
    fn test_cache_key() {
        let data = ImageSource::parse("data:image/png;base64,AQID").unwrap();
        assert!(data.cache_key().is_none());

        let path = ImageSource::parse("/tmp/a.png").unwrap();
        assert_eq!(path.cache_key().as_deref(), Some("file:///tmp/a.png"));
    }

    #[test]
    fn test_decode_garbage_is_image_load() {
        let err = decode_raster(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), "image_load");
    }
}
