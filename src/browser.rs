use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use indicatif::ProgressBar;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::catalogue::{self, Blueprint, Catalogue, CatalogueError, CatalogueIndex, CatalogueSource};
use crate::filter::{self, FilterCriteria, FilteredResult};
use crate::preload::{
    self, ImageFetcher, ImageFormats, ImageResolution, ImageSources, PreloadOutcome,
    PreloadState, PreloadTracker,
};

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("preload task failed: {source}")]
    TaskJoin {
        #[source]
        source: tokio::task::JoinError,
    },
}

/// What a front end needs to draw: the current result and its preload
/// progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrowserView {
    pub result: Option<FilteredResult>,
    pub preload: PreloadState,
}

impl BrowserView {
    /// A result is shown only once every image has resolved.
    pub fn is_ready(&self) -> bool {
        self.result.is_some() && !self.preload.loading
    }
}

/// One accepted filter submission. The preload runs on the tokio runtime;
/// `wait` joins it.
pub struct Submission {
    pub generation: u64,
    pub result: FilteredResult,
    handle: JoinHandle<PreloadOutcome>,
}

impl Submission {
    pub async fn wait(self) -> Result<PreloadOutcome, BrowserError> {
        self.handle
            .await
            .map_err(|e| BrowserError::TaskJoin { source: e })
    }
}

/// Owns the loaded catalogue, its index, the current filtered result and the
/// preload progress. Each accepted submission gets a new generation; preloads
/// of older generations finish without touching the current state.
pub struct Browser {
    catalogue: Arc<Catalogue>,
    index: CatalogueIndex,
    fetcher: Arc<dyn ImageFetcher>,
    formats: ImageFormats,
    generation: AtomicU64,
    current: Mutex<Option<FilteredResult>>,
    tracker: PreloadTracker,
}

impl Browser {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, formats: ImageFormats) -> Self {
        Self {
            catalogue: Arc::default(),
            index: CatalogueIndex::default(),
            fetcher,
            formats,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
            tracker: PreloadTracker::new(),
        }
    }

    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.tracker = PreloadTracker::with_progress(pb);
        self
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn index(&self) -> &CatalogueIndex {
        &self.index
    }

    pub fn formats(&self) -> ImageFormats {
        self.formats
    }

    /// Installs a catalogue and rebuilds the index. The current result is
    /// dropped and any preload still running becomes stale.
    pub fn replace_catalogue(&mut self, catalogue: Catalogue) {
        self.index = CatalogueIndex::build(&catalogue);
        self.catalogue = Arc::new(catalogue);
        let mut current = lock(&self.current);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tracker.begin(generation, 0);
        *current = None;
    }

    /// Loads from `source`. On failure the error is logged, an empty
    /// catalogue is installed, and the error is returned for reporting.
    pub async fn load(
        &mut self,
        source: &CatalogueSource,
        client: &reqwest::Client,
    ) -> Result<(), CatalogueError> {
        match catalogue::load_catalogue(source, client).await {
            Ok(catalogue) => {
                self.replace_catalogue(catalogue);
                Ok(())
            }
            Err(e) => {
                log::error!("failed to load catalogue: {e}");
                self.replace_catalogue(Catalogue::default());
                Err(e)
            }
        }
    }

    /// Result and preload state are read under the same lock `submit_filter`
    /// holds while installing a submission, so they always belong together.
    pub fn view(&self) -> BrowserView {
        let current = lock(&self.current);
        BrowserView {
            result: current.clone(),
            preload: self.tracker.snapshot(),
        }
    }

    /// Filters the selected weapon and starts preloading the matches. Returns
    /// `None` without changing anything when no weapon is selected or the
    /// weapon is not in the catalogue.
    pub fn submit_filter(&self, criteria: &FilterCriteria) -> Option<Submission> {
        let result = match filter::compute_filtered_result(&self.catalogue, criteria) {
            Some(result) => result,
            None => {
                log::debug!("ignoring filter for unknown weapon {:?}", criteria.weapon);
                return None;
            }
        };

        let generation = {
            let mut current = lock(&self.current);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.tracker.begin(generation, result.len());
            *current = Some(result.clone());
            generation
        };
        log::info!(
            "submission {generation}: {} blueprints for {}",
            result.len(),
            result.weapon
        );

        let fetcher = Arc::clone(&self.fetcher);
        let tracker = self.tracker.clone();
        let formats = self.formats;
        let job = result.clone();
        let handle = tokio::spawn(async move {
            let images = preload::preload_images(fetcher.as_ref(), &formats, &job, |resolution| {
                tracker.record(generation, resolution.is_available());
            })
            .await;
            let stale = !tracker.finish(generation);
            if stale {
                log::debug!("submission {generation} superseded before its preload finished");
            }
            PreloadOutcome {
                generation,
                stale,
                total: images.len(),
                loaded: images.iter().filter(|i| i.is_available()).count(),
                images,
            }
        });

        Some(Submission {
            generation,
            result,
            handle,
        })
    }

    /// Primary and fallback locations of every image in `result`, in result
    /// order.
    pub fn sources_for(&self, result: &FilteredResult) -> Vec<ImageSources> {
        result
            .blueprints
            .iter()
            .map(|bp| {
                preload::image_sources(self.fetcher.as_ref(), &self.formats, &result.weapon, &bp.name)
            })
            .collect()
    }

    /// Resolves the image of a single blueprint, for viewing it on its own.
    pub async fn open_image(&self, weapon: &str, blueprint: &Blueprint) -> ImageResolution {
        preload::resolve_image(self.fetcher.as_ref(), &self.formats, weapon, &blueprint.name).await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
