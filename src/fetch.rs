//! Image loading for card images
//!
//! Fetching is behind [`ImageFetcher`] so hosts can swap the transport;
//! decoding and scaling use the `image` crate.

use crate::toolkit::Bitmap;
use image::imageops::FilterType;
use image::DynamicImage;
use reqwest::{blocking, Url};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Only https:// is allowed for remote images (http:// is limited to localhost): {url}")]
    Insecure { url: String },

    #[error("Invalid image URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Network error while loading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} while loading {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image loading is disabled: {url}")]
    Disabled { url: String },
}

#[derive(Debug, Error)]
#[error("Failed to decode image: {0}")]
pub struct DecodeError(#[from] image::ImageError);

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Source of raw image bytes
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<F> ImageFetcher for F
where
    F: Fn(&str) -> Result<Vec<u8>, FetchError>,
{
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self(url)
    }
}

/// Loads `https://` URLs (plus `http://` on localhost), `file://` URLs and
/// plain file paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

/// Loopback hosts where plain `http://` is still allowed
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

impl HttpFetcher {
    fn check_remote(url: &str) -> Result<Url, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let is_local = parsed
            .host_str()
            .is_some_and(|host| LOCAL_HOSTS.contains(&host));
        match parsed.scheme() {
            "https" => Ok(parsed),
            "http" if is_local => Ok(parsed),
            _ => Err(FetchError::Insecure {
                url: url.to_string(),
            }),
        }
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let checked = Self::check_remote(url)?;
        let response = blocking::get(checked).map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.fetch_remote(url);
        }
        let path = url.strip_prefix("file://").unwrap_or(url);
        read_file(Path::new(path), url)
    }
}

fn read_file(path: &Path, url: &str) -> Result<Vec<u8>, FetchError> {
    std::fs::read(path).map_err(|source| FetchError::Io {
        url: url.to_string(),
        source,
    })
}

/// Refuses every request; images keep their placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetch;

impl ImageFetcher for NoFetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Disabled {
            url: url.to_string(),
        })
    }
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Scale to `width` keeping the aspect ratio. A zero width keeps the
/// natural size.
pub fn scale_to_width(image: &DynamicImage, width: u32) -> Bitmap {
    let rgba = image.to_rgba8();
    let (src_w, src_h) = rgba.dimensions();
    let rgba = if width == 0 || width == src_w || src_w == 0 {
        rgba
    } else {
        let height = ((src_h as u64 * width as u64 + src_w as u64 / 2) / src_w as u64).max(1);
        image::imageops::resize(&rgba, width, height as u32, FilterType::Triangle)
    };

    let (w, h) = rgba.dimensions();
    let pixels = rgba
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
        })
        .collect();
    Bitmap::new(w, h, pixels)
}

/// Fetch, decode and scale in one go.
pub fn load_bitmap(
    fetcher: &dyn ImageFetcher,
    url: &str,
    width: u32,
) -> Result<Bitmap, ImageLoadError> {
    let bytes = fetcher.fetch(url)?;
    let image = decode(&bytes)?;
    Ok(scale_to_width(&image, width))
}
