pub mod store;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use indicatif::ProgressBar;
use serde::Serialize;

use crate::filter::FilteredResult;

pub use store::{ImageError, ImageFetcher, ImageFormat, ImageFormats, ImageKey, ImageStore};

/// Progress of the preload belonging to one filter submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PreloadState {
    pub generation: u64,
    pub total: usize,
    /// Images finished, fetched or not.
    pub resolved: usize,
    /// Images actually fetched, in either format.
    pub loaded: usize,
    pub loading: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum ImageResolution {
    Primary(String),
    Fallback(String),
    Unavailable,
}

impl ImageResolution {
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Primary(location) | Self::Fallback(location) => Some(location),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Both candidate locations of one image, for viewers that do their own
/// fallback on load errors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImageSources {
    pub primary: String,
    pub fallback: String,
}

pub fn image_sources(
    fetcher: &dyn ImageFetcher,
    formats: &ImageFormats,
    weapon: &str,
    blueprint: &str,
) -> ImageSources {
    ImageSources {
        primary: fetcher.locate(&ImageKey::new(weapon, blueprint, formats.primary)),
        fallback: fetcher.locate(&ImageKey::new(weapon, blueprint, formats.fallback)),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreloadOutcome {
    pub generation: u64,
    /// Set when a newer submission replaced this one before it finished.
    pub stale: bool,
    pub total: usize,
    pub loaded: usize,
    /// One entry per blueprint, in result order.
    pub images: Vec<ImageResolution>,
}

/// Tries the primary format, then the fallback. Failures of both are not an
/// error; the image is just unavailable.
pub async fn resolve_image(
    fetcher: &dyn ImageFetcher,
    formats: &ImageFormats,
    weapon: &str,
    blueprint: &str,
) -> ImageResolution {
    let primary = ImageKey::new(weapon, blueprint, formats.primary);
    match fetcher.fetch(&primary).await {
        Ok(()) => return ImageResolution::Primary(fetcher.locate(&primary)),
        Err(e) => log::debug!("{}: {e}", primary.relative_path()),
    }

    let fallback = ImageKey::new(weapon, blueprint, formats.fallback);
    match fetcher.fetch(&fallback).await {
        Ok(()) => ImageResolution::Fallback(fetcher.locate(&fallback)),
        Err(e) => {
            log::debug!("{}: {e}", fallback.relative_path());
            ImageResolution::Unavailable
        }
    }
}

/// Resolves every blueprint image of `result` concurrently. `on_resolved` is
/// called once per image as it finishes, in completion order; the returned
/// list is in result order.
pub async fn preload_images(
    fetcher: &dyn ImageFetcher,
    formats: &ImageFormats,
    result: &FilteredResult,
    mut on_resolved: impl FnMut(&ImageResolution),
) -> Vec<ImageResolution> {
    let mut pending = FuturesUnordered::new();
    for (idx, bp) in result.blueprints.iter().enumerate() {
        let weapon = result.weapon.as_str();
        pending.push(async move {
            let resolution = resolve_image(fetcher, formats, weapon, &bp.name).await;
            (idx, resolution)
        });
    }

    let mut images = vec![ImageResolution::Unavailable; result.blueprints.len()];
    while let Some((idx, resolution)) = pending.next().await {
        on_resolved(&resolution);
        images[idx] = resolution;
    }
    images
}

/// Shared preload progress. Every update carries the generation of the
/// submission it belongs to and is dropped unless that generation is still
/// the current one.
#[derive(Clone, Default)]
pub struct PreloadTracker {
    state: Arc<Mutex<PreloadState>>,
    progress: Option<ProgressBar>,
}

impl fmt::Debug for PreloadTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadTracker")
            .field("state", &self.snapshot())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl PreloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(pb: ProgressBar) -> Self {
        Self {
            state: Arc::default(),
            progress: Some(pb),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PreloadState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> PreloadState {
        *self.lock()
    }

    pub fn current_generation(&self) -> u64 {
        self.lock().generation
    }

    /// Starts tracking a new submission, superseding whatever was tracked.
    pub fn begin(&self, generation: u64, total: usize) {
        let mut state = self.lock();
        *state = PreloadState {
            generation,
            total,
            resolved: 0,
            loaded: 0,
            loading: total > 0,
        };
        if let Some(pb) = self.progress.as_ref() {
            pb.reset();
            pb.set_length(total as u64);
            pb.set_message(format!("Loading images (0/{total})"));
        }
    }

    /// Counts one finished image. Returns false when `generation` is stale.
    pub fn record(&self, generation: u64, loaded: bool) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        state.resolved += 1;
        if loaded {
            state.loaded += 1;
        }
        if let Some(pb) = self.progress.as_ref() {
            pb.inc(1);
            pb.set_message(format!(
                "Loading images ({}/{})",
                state.resolved, state.total
            ));
        }
        true
    }

    /// Clears the loading flag. Returns false when `generation` is stale.
    pub fn finish(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        state.loading = false;
        if let Some(pb) = self.progress.as_ref() {
            pb.finish_with_message(format!(
                "Loaded {}/{} images",
                state.loaded, state.total
            ));
        }
        true
    }
}
