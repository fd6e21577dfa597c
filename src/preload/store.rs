use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Url;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpg,
    Jpeg,
    Webp,
    Gif,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" => Ok(Self::Jpg),
            "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "gif" => Ok(Self::Gif),
            other => Err(format!(
                "unknown image format '{other}', expected png, jpg, jpeg, webp or gif"
            )),
        }
    }
}

/// The format tried first and the one tried when it fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageFormats {
    pub primary: ImageFormat,
    pub fallback: ImageFormat,
}

impl Default for ImageFormats {
    fn default() -> Self {
        Self {
            primary: ImageFormat::Png,
            fallback: ImageFormat::Jpg,
        }
    }
}

/// Addresses one image: `{weapon}/{blueprint}.{ext}` under the store root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageKey {
    pub weapon: String,
    pub blueprint: String,
    pub format: ImageFormat,
}

impl ImageKey {
    pub fn new(weapon: &str, blueprint: &str, format: ImageFormat) -> Self {
        Self {
            weapon: weapon.to_string(),
            blueprint: blueprint.to_string(),
            format,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.blueprint, self.format.extension())
    }

    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.weapon, self.file_name())
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image request failed: {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("image request returned HTTP {status}: {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("image base URL cannot hold path segments: {url}")]
    InvalidBaseUrl { url: String },

    #[error("invalid image base URL '{url}': {message}")]
    ParseBaseUrl { url: String, message: String },
}

/// Anything that can fetch an image by key. A returned `Ok` means the image
/// was fully retrieved.
pub trait ImageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, key: &'a ImageKey) -> BoxFuture<'a, Result<(), ImageError>>;

    /// Where `key` lives, as a URL or filesystem path for display.
    fn locate(&self, key: &ImageKey) -> String;
}

#[derive(Clone, Debug)]
pub enum ImageStore {
    Http { client: reqwest::Client, base: Url },
    Directory { root: PathBuf },
}

impl ImageStore {
    /// `http://` and `https://` values become an HTTP store, anything else a
    /// directory.
    pub fn parse(value: &str, client: reqwest::Client) -> Result<Self, ImageError> {
        let trimmed = value.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let base = Url::parse(trimmed).map_err(|e| ImageError::ParseBaseUrl {
                url: trimmed.to_string(),
                message: e.to_string(),
            })?;
            if base.cannot_be_a_base() {
                return Err(ImageError::InvalidBaseUrl {
                    url: trimmed.to_string(),
                });
            }
            Ok(Self::Http { client, base })
        } else {
            Ok(Self::Directory {
                root: crate::config::expand_tilde(trimmed),
            })
        }
    }

    fn image_url(base: &Url, key: &ImageKey) -> Result<Url, ImageError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ImageError::InvalidBaseUrl {
                url: base.to_string(),
            })?
            .pop_if_empty()
            .push(&key.weapon)
            .push(&key.file_name());
        Ok(url)
    }

    async fn fetch_http(
        client: &reqwest::Client,
        base: &Url,
        key: &ImageKey,
    ) -> Result<(), ImageError> {
        let url = Self::image_url(base, key)?;
        let resp = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ImageError::Request {
                url: url.to_string(),
                source: e,
            })?;
        if !resp.status().is_success() {
            return Err(ImageError::HttpStatus {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }
        resp.bytes().await.map_err(|e| ImageError::Request {
            url: url.to_string(),
            source: e,
        })?;
        Ok(())
    }

    async fn fetch_file(root: &Path, key: &ImageKey) -> Result<(), ImageError> {
        let path = root.join(&key.weapon).join(key.file_name());
        tokio::fs::read(&path)
            .await
            .map_err(|e| ImageError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
        Ok(())
    }
}

impl ImageFetcher for ImageStore {
    fn fetch<'a>(&'a self, key: &'a ImageKey) -> BoxFuture<'a, Result<(), ImageError>> {
        match self {
            Self::Http { client, base } => Self::fetch_http(client, base, key).boxed(),
            Self::Directory { root } => Self::fetch_file(root, key).boxed(),
        }
    }

    fn locate(&self, key: &ImageKey) -> String {
        match self {
            Self::Http { base, .. } => match Self::image_url(base, key) {
                Ok(url) => url.to_string(),
                Err(_) => format!("{}/{}", base.as_str().trim_end_matches('/'), key.relative_path()),
            },
            Self::Directory { root } => root
                .join(&key.weapon)
                .join(key.file_name())
                .display()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_loosely() {
        assert_eq!(".PNG".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!(" jpeg ".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert!("bmp".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn http_locations_encode_segments() {
        let store = ImageStore::parse("https://cdn.example.com/images", reqwest::Client::new())
            .unwrap();
        let key = ImageKey::new("AK-47", "Golden Dragon", ImageFormat::Png);
        assert_eq!(
            store.locate(&key),
            "https://cdn.example.com/images/AK-47/Golden%20Dragon.png"
        );

        let store = ImageStore::parse("https://cdn.example.com/images/", reqwest::Client::new())
            .unwrap();
        assert_eq!(
            store.locate(&key),
            "https://cdn.example.com/images/AK-47/Golden%20Dragon.png"
        );
    }

    #[test]
    fn plain_values_become_directories() {
        let store = ImageStore::parse("./images", reqwest::Client::new()).unwrap();
        assert!(matches!(store, ImageStore::Directory { .. }));
    }

    #[tokio::test]
    async fn directory_store_reads_files() {
        let root = std::env::temp_dir().join(format!(
            "blueprint_pools_store_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(root.join("Rifle")).unwrap();
        std::fs::write(root.join("Rifle").join("Alpha.png"), b"png").unwrap();

        let store = ImageStore::Directory { root: root.clone() };
        assert!(store
            .fetch(&ImageKey::new("Rifle", "Alpha", ImageFormat::Png))
            .await
            .is_ok());
        let err = store
            .fetch(&ImageKey::new("Rifle", "Alpha", ImageFormat::Jpg))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Io { .. }));

        let _ = std::fs::remove_dir_all(root);
    }
}
