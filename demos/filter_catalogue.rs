use std::error::Error;
use std::sync::Arc;

use blueprint_pools::browser::Browser;
use blueprint_pools::catalogue::CatalogueSource;
use blueprint_pools::filter::FilterCriteria;
use blueprint_pools::output;
use blueprint_pools::preload::{ImageFormats, ImageStore};

const SAMPLE: &str = r#"{"Weapons":[
    {"Name":"Rifle","Blueprints":[
        {"Name":"Alpha","Pool":"2","status":"Released"},
        {"Name":"Beta","Pool":"1","status":"Unreleased"}]}
]}"#;

/// Usage: filter_catalogue [CATALOGUE] [IMAGES]
/// Without a catalogue argument a small built-in sample is used.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let source = match args.next() {
        Some(raw) => CatalogueSource::parse(&raw),
        None => CatalogueSource::Inline(SAMPLE.to_string()),
    };
    let images = args.next().unwrap_or_else(|| "./images".to_string());

    let client = reqwest::Client::new();
    let store = ImageStore::parse(&images, client.clone())?;
    let mut browser = Browser::new(Arc::new(store), ImageFormats::default());
    browser.load(&source, &client).await?;

    println!("Weapons: {}", browser.index().weapon_names().join(", "));
    println!("Pools: {}", browser.index().pool_ids().join(", "));

    let weapon = match browser.index().weapon_names().first() {
        Some(weapon) => weapon.clone(),
        None => return Ok(()),
    };
    if let Some(submission) = browser.submit_filter(&FilterCriteria::for_weapon(weapon)) {
        let result = submission.result.clone();
        let outcome = submission.wait().await?;
        let sources = browser.sources_for(&result);
        let records = output::build_records(&result, &outcome.images, &sources);
        print!("{}", String::from_utf8_lossy(&output::render_json(&records)));
        println!();
    }

    Ok(())
}
