pub mod index;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tokio::io::AsyncReadExt;

pub use index::CatalogueIndex;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Blueprint {
    #[serde(rename = "Name", default, deserialize_with = "loose_string")]
    pub name: String,
    #[serde(rename = "Pool", default, deserialize_with = "loose_string")]
    pub pool: String,
    #[serde(rename = "status", default, deserialize_with = "loose_string")]
    pub status: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Weapon {
    #[serde(rename = "Name", default, deserialize_with = "loose_string")]
    pub name: String,
    #[serde(rename = "Blueprints", default, deserialize_with = "null_as_default")]
    pub blueprints: Vec<Blueprint>,
}

/// The parsed catalogue document. Missing or null collections are read as
/// empty so a partially authored file still loads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Catalogue {
    #[serde(rename = "Weapons", default, deserialize_with = "null_as_default")]
    pub weapons: Vec<Weapon>,
}

impl Catalogue {
    pub fn from_json_str(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// First weapon whose name is exactly `name`.
    pub fn weapon(&self, name: &str) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.name == name)
    }

    pub fn blueprint_count(&self) -> usize {
        self.weapons.iter().map(|w| w.blueprints.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Pools are often authored as bare numbers, so numbers and booleans are
// accepted and kept in their JSON text form.
fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Text(s)) => s,
        Some(Loose::Number(n)) => n.to_string(),
        Some(Loose::Flag(b)) => b.to_string(),
        None => String::new(),
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogueSource {
    FilePath(String),
    Url(String),
    /// Catalogue JSON read from standard input.
    Stdin,
    /// Catalogue JSON the caller already holds.
    Inline(String),
}

impl CatalogueSource {
    /// Treats `-` as stdin, `http://` and `https://` values as URLs, anything
    /// else as a path.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let lower = trimmed.to_ascii_lowercase();
        if trimmed == "-" {
            Self::Stdin
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::FilePath(crate::config::expand_tilde_string(trimmed))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::FilePath(path) => path.clone(),
            Self::Url(url) => url.clone(),
            Self::Stdin => "<stdin>".to_string(),
            Self::Inline(_) => "<inline>".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("failed to read catalogue file: {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch catalogue: {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("catalogue request returned HTTP {status}: {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to parse catalogue from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

pub async fn load_catalogue(
    source: &CatalogueSource,
    client: &reqwest::Client,
) -> Result<Catalogue, CatalogueError> {
    let contents = match source {
        CatalogueSource::Inline(contents) => contents.clone(),
        CatalogueSource::Stdin => {
            let mut contents = String::new();
            tokio::io::stdin()
                .read_to_string(&mut contents)
                .await
                .map_err(|e| CatalogueError::FileRead {
                    path: source.describe(),
                    source: e,
                })?;
            contents
        }
        CatalogueSource::FilePath(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CatalogueError::FileRead {
                    path: path.clone(),
                    source: e,
                })?
        }
        CatalogueSource::Url(url) => {
            let resp = client
                .get(url.as_str())
                .send()
                .await
                .map_err(|e| CatalogueError::Fetch {
                    url: url.clone(),
                    source: e,
                })?;
            if !resp.status().is_success() {
                return Err(CatalogueError::HttpStatus {
                    url: url.clone(),
                    status: resp.status().as_u16(),
                });
            }
            resp.text().await.map_err(|e| CatalogueError::Fetch {
                url: url.clone(),
                source: e,
            })?
        }
    };

    let catalogue =
        Catalogue::from_json_str(&contents).map_err(|e| CatalogueError::Parse {
            origin: source.describe(),
            source: e,
        })?;
    log::debug!(
        "loaded {} weapons ({} blueprints) from {}",
        catalogue.weapons.len(),
        catalogue.blueprint_count(),
        source.describe()
    );
    Ok(catalogue)
}
