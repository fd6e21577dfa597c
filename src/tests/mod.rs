use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use indicatif::ProgressBar;
use tokio::sync::Semaphore;

use crate::browser::Browser;
use crate::catalogue::{Catalogue, CatalogueSource};
use crate::filter::{compute_filtered_result, FilterCriteria};
use crate::preload::{
    ImageError, ImageFetcher, ImageFormats, ImageKey, ImageResolution, ImageSources,
};

const SCENARIO: &str = r#"{"Weapons":[
    {"Name":"Rifle","Blueprints":[
        {"Name":"Alpha","Pool":"2","status":"Released"},
        {"Name":"Beta","Pool":"1","status":"Unreleased"}]},
    {"Name":"Pistol","Blueprints":[
        {"Name":"Golden Dragon","Pool":"10","status":"Released"}]}
]}"#;

/// Serves the listed `weapon/file` keys. Fetches for `gated_weapon` wait
/// until the test opens the gate.
struct GatedFetcher {
    available: HashSet<String>,
    gated_weapon: Option<String>,
    gate: Arc<Semaphore>,
    calls: AtomicUsize,
}

impl GatedFetcher {
    fn new(available: &[&str]) -> Self {
        Self {
            available: available.iter().map(|s| s.to_string()).collect(),
            gated_weapon: None,
            gate: Arc::new(Semaphore::new(0)),
            calls: AtomicUsize::new(0),
        }
    }

    fn gated(mut self, weapon: &str) -> Self {
        self.gated_weapon = Some(weapon.to_string());
        self
    }
}

impl ImageFetcher for GatedFetcher {
    fn fetch<'a>(&'a self, key: &'a ImageKey) -> BoxFuture<'a, Result<(), ImageError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.gated_weapon.as_deref() == Some(key.weapon.as_str()) {
                let _permit = self.gate.acquire().await;
            }
            if self.available.contains(&key.relative_path()) {
                Ok(())
            } else {
                Err(ImageError::Io {
                    path: key.relative_path(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            }
        }
        .boxed()
    }

    fn locate(&self, key: &ImageKey) -> String {
        format!("images/{}", key.relative_path())
    }
}

fn browser_with(fetcher: Arc<GatedFetcher>) -> Browser {
    let mut browser = Browser::new(fetcher, ImageFormats::default());
    browser.replace_catalogue(Catalogue::from_json_str(SCENARIO).unwrap());
    browser
}

fn names(browser: &Browser) -> Vec<String> {
    browser
        .view()
        .result
        .map(|r| r.blueprints.into_iter().map(|bp| bp.name).collect())
        .unwrap_or_default()
}

async fn wait_for_calls(fetcher: &GatedFetcher, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while fetcher.calls.load(Ordering::SeqCst) < expected {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("fetches were not issued");
}

#[test]
fn index_built_on_load() {
    let fetcher = Arc::new(GatedFetcher::new(&[]));
    let browser = browser_with(fetcher);
    assert_eq!(browser.index().weapon_names(), ["Rifle", "Pistol"]);
    assert_eq!(browser.index().pool_ids(), ["1", "2", "10"]);
    assert_eq!(browser.index().status_values(), ["Released", "Unreleased"]);
}

#[tokio::test]
async fn scenario_filters_resolve_in_order() {
    let fetcher = Arc::new(GatedFetcher::new(&["Rifle/Alpha.png", "Rifle/Beta.jpg"]));
    let browser = browser_with(fetcher);

    let submission = browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle"))
        .unwrap();
    let outcome = submission.wait().await.unwrap();
    assert_eq!(names(&browser), ["Alpha", "Beta"]);
    assert!(!outcome.stale);
    assert_eq!(
        outcome.images,
        vec![
            ImageResolution::Primary("images/Rifle/Alpha.png".to_string()),
            ImageResolution::Fallback("images/Rifle/Beta.jpg".to_string()),
        ]
    );
    assert!(browser.view().is_ready());

    browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle").pool("1"))
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(names(&browser), ["Beta"]);

    browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle").search("alp"))
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(names(&browser), ["Alpha"]);
}

#[tokio::test]
async fn failed_images_still_complete_the_preload() {
    let fetcher = Arc::new(GatedFetcher::new(&[]));
    let browser = browser_with(Arc::clone(&fetcher));

    let outcome = browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle"))
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(outcome.loaded, 0);
    assert!(outcome.images.iter().all(|i| *i == ImageResolution::Unavailable));

    let state = browser.view().preload;
    assert_eq!(state.total, 2);
    assert_eq!(state.resolved, 2);
    assert_eq!(state.loaded, 0);
    assert!(!state.loading);
    // primary and fallback tried for both blueprints
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn unknown_weapon_leaves_state_untouched() {
    let fetcher = Arc::new(GatedFetcher::new(&["Rifle/Alpha.png"]));
    let browser = browser_with(Arc::clone(&fetcher));

    browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle"))
        .unwrap()
        .wait()
        .await
        .unwrap();
    let before = browser.view();
    let calls = fetcher.calls.load(Ordering::SeqCst);

    assert!(browser
        .submit_filter(&FilterCriteria::for_weapon("Shotgun"))
        .is_none());
    assert!(browser.submit_filter(&FilterCriteria::default()).is_none());

    assert_eq!(browser.view(), before);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), calls);
}

#[tokio::test]
async fn empty_result_is_ready_immediately() {
    let fetcher = Arc::new(GatedFetcher::new(&[]));
    let browser = browser_with(fetcher);

    let submission = browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle").search("zzz"))
        .unwrap();
    assert!(submission.result.is_empty());
    let view = browser.view();
    assert!(view.is_ready());
    assert_eq!(view.preload.total, 0);

    let outcome = submission.wait().await.unwrap();
    assert!(outcome.images.is_empty());
}

#[tokio::test]
async fn all_fetches_are_issued_before_any_finishes() {
    let fetcher = Arc::new(
        GatedFetcher::new(&["Rifle/Alpha.png", "Rifle/Beta.png"]).gated("Rifle"),
    );
    let browser = browser_with(Arc::clone(&fetcher));

    let submission = browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle"))
        .unwrap();
    wait_for_calls(&fetcher, 2).await;
    let state = browser.view().preload;
    assert!(state.loading);
    assert_eq!(state.resolved, 0);

    fetcher.gate.add_permits(16);
    let outcome = submission.wait().await.unwrap();
    assert_eq!(outcome.loaded, 2);
    assert!(!browser.view().preload.loading);
}

#[tokio::test]
async fn stale_preload_does_not_clobber_newer_submission() {
    let fetcher = Arc::new(
        GatedFetcher::new(&["Rifle/Alpha.png", "Pistol/Golden Dragon.png"]).gated("Rifle"),
    );
    let browser = browser_with(Arc::clone(&fetcher));

    let first = browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle"))
        .unwrap();
    wait_for_calls(&fetcher, 2).await;

    let second = browser
        .submit_filter(&FilterCriteria::for_weapon("Pistol"))
        .unwrap();
    assert!(second.generation > first.generation);
    let second_outcome = second.wait().await.unwrap();
    assert!(!second_outcome.stale);

    let settled = browser.view();
    assert_eq!(settled.preload.generation, second_outcome.generation);
    assert_eq!(settled.preload.total, 1);
    assert_eq!(settled.preload.resolved, 1);
    assert!(!settled.preload.loading);

    fetcher.gate.add_permits(16);
    let first_outcome = first.wait().await.unwrap();
    assert!(first_outcome.stale);
    assert_eq!(first_outcome.total, 2);

    assert_eq!(browser.view(), settled);
    assert_eq!(names(&browser), ["Golden Dragon"]);
}

#[tokio::test]
async fn replacing_the_catalogue_supersedes_running_preloads() {
    let fetcher = Arc::new(GatedFetcher::new(&[]).gated("Rifle"));
    let mut browser = browser_with(Arc::clone(&fetcher));

    let submission = browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle"))
        .unwrap();
    wait_for_calls(&fetcher, 2).await;

    browser.replace_catalogue(Catalogue::default());
    assert!(browser.index().is_empty());
    assert_eq!(browser.view().result, None);

    fetcher.gate.add_permits(16);
    assert!(submission.wait().await.unwrap().stale);
    assert!(!browser.view().preload.loading);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn views_pair_each_result_with_its_own_preload() {
    let fetcher = Arc::new(GatedFetcher::new(&[]).gated("Rifle"));
    let browser = browser_with(Arc::clone(&fetcher));
    let handle = tokio::runtime::Handle::current();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            let _rt = handle.enter();
            for i in 0..200 {
                let weapon = if i % 2 == 0 { "Rifle" } else { "Pistol" };
                browser.submit_filter(&FilterCriteria::for_weapon(weapon));
            }
        });
        for _ in 0..2000 {
            let view = browser.view();
            let shown = view.result.as_ref().map_or(0, |r| r.len());
            assert_eq!(shown, view.preload.total);
        }
    });

    fetcher.gate.add_permits(1024);
}

#[tokio::test]
async fn progress_bar_follows_the_current_submission() {
    let fetcher = Arc::new(GatedFetcher::new(&["Rifle/Alpha.png"]));
    let pb = ProgressBar::hidden();
    let mut browser =
        Browser::new(fetcher, ImageFormats::default()).with_progress(pb.clone());
    browser.replace_catalogue(Catalogue::from_json_str(SCENARIO).unwrap());

    let outcome = browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle"))
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(outcome.loaded, 1);
    assert_eq!(pb.length(), Some(2));
    assert_eq!(pb.position(), 2);
    assert!(pb.is_finished());
}

#[test]
fn sources_list_both_formats_for_every_blueprint() {
    let browser = browser_with(Arc::new(GatedFetcher::new(&[])));
    let result =
        compute_filtered_result(browser.catalogue(), &FilterCriteria::for_weapon("Pistol")).unwrap();
    assert_eq!(
        browser.sources_for(&result),
        vec![ImageSources {
            primary: "images/Pistol/Golden Dragon.png".to_string(),
            fallback: "images/Pistol/Golden Dragon.jpg".to_string(),
        }]
    );
}

#[tokio::test]
async fn open_image_uses_the_fallback_format() {
    let fetcher = Arc::new(GatedFetcher::new(&["Pistol/Golden Dragon.jpg"]));
    let browser = browser_with(fetcher);
    let weapon = browser.catalogue().weapon("Pistol").unwrap().clone();
    let resolution = browser.open_image(&weapon.name, &weapon.blueprints[0]).await;
    assert_eq!(
        resolution.location(),
        Some("images/Pistol/Golden Dragon.jpg")
    );
}

#[tokio::test]
async fn catalogue_file_loads_and_failures_leave_index_empty() {
    let client = reqwest::Client::new();
    let fetcher = Arc::new(GatedFetcher::new(&[]));
    let mut browser = Browser::new(fetcher, ImageFormats::default());

    let path = std::env::temp_dir().join(format!(
        "blueprint_pools_catalogue_{}.json",
        std::process::id()
    ));
    std::fs::write(&path, SCENARIO).unwrap();
    let source = CatalogueSource::FilePath(path.to_string_lossy().to_string());
    browser.load(&source, &client).await.unwrap();
    assert_eq!(browser.index().weapon_names().len(), 2);

    std::fs::write(&path, "not json").unwrap();
    assert!(browser.load(&source, &client).await.is_err());
    assert!(browser.index().is_empty());
    assert!(browser
        .submit_filter(&FilterCriteria::for_weapon("Rifle"))
        .is_none());

    let _ = std::fs::remove_file(path);
}
