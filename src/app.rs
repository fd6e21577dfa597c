use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

use crate::browser::Browser;
use crate::catalogue::CatalogueSource;
use crate::cli::args::CliArgs;
use crate::cli::validation::{self, ListKind};
use crate::config::{self, ConfigFile};
use crate::filter::{FilterCriteria, FilteredResult};
use crate::output::{self, OutputFormat};
use crate::preload::{ImageFormat, ImageFormats, ImageStore};
use crate::theme::Theme;

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn format_opt_value<'a>(v: &'a str, default: &'a str) -> &'a str {
    if v.trim().is_empty() {
        default
    } else {
        v
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Clone, Debug)]
struct RunConfig {
    catalogue: CatalogueSource,
    images: String,
    formats: ImageFormats,
    theme: Theme,
    timeout: u64,
    workers: usize,
    proxy: Option<String>,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
    list: Option<ListKind>,
    criteria: Option<FilterCriteria>,
    show: Option<String>,
}

fn parse_format(raw: &str, flag: &str) -> Result<ImageFormat, String> {
    raw.parse::<ImageFormat>()
        .map_err(|e| format!("invalid {flag} '{raw}': {e}"))
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let catalogue_raw = args
        .catalogue
        .or(cfg.catalogue)
        .unwrap_or_else(|| "./blueprints.json".to_string());
    let images = args
        .images
        .or(cfg.images)
        .unwrap_or_else(|| "./images".to_string());

    let primary_raw = args
        .primary_format
        .or(cfg.primary_format)
        .unwrap_or_else(|| "png".to_string());
    let fallback_raw = args
        .fallback_format
        .or(cfg.fallback_format)
        .unwrap_or_else(|| "jpg".to_string());
    let formats = ImageFormats {
        primary: parse_format(&primary_raw, "primary_format")?,
        fallback: parse_format(&fallback_raw, "fallback_format")?,
    };
    if formats.primary == formats.fallback {
        return Err(format!(
            "primary and fallback image formats are both '{}'",
            formats.primary
        ));
    }

    let theme = match args.theme.or(cfg.theme) {
        Some(raw) => raw.parse::<Theme>()?,
        None => Theme::default(),
    };

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let workers = args.workers.or(cfg.workers).unwrap_or(4);
    if workers == 0 {
        return Err("invalid workers, expected positive integer".to_string());
    }

    let output = non_blank(args.output.or(cfg.output));
    let output_format = match args.format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw).ok_or_else(|| {
            format!("invalid output format '{raw}', expected text, json or html")
        })?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let list = args.list.as_deref().map(ListKind::parse).transpose()?;

    let criteria = non_blank(args.weapon).map(|weapon| FilterCriteria {
        weapon,
        pool: non_blank(args.pool),
        status: non_blank(args.status),
        search: non_blank(args.search),
    });

    Ok(RunConfig {
        catalogue: CatalogueSource::parse(&catalogue_raw),
        images,
        formats,
        theme,
        timeout,
        workers,
        proxy: non_blank(args.proxy.or(cfg.proxy)),
        output,
        output_format,
        no_color: args.no_color || cfg.no_color.unwrap_or(false),
        list,
        criteria,
        show: non_blank(args.show),
    })
}

fn build_http_client(proxy: Option<&str>, timeout_seconds: u64) -> Result<reqwest::Client, String> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "blueprint-pools/",
            env!("CARGO_PKG_VERSION")
        )),
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .timeout(Duration::from_secs(timeout_seconds));

    if let Some(proxy) = proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| format!("Could not setup proxy, err: {e}"))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| format!("failed to build http client: {e}"))
}

fn new_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(200));
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.blue} {elapsed} [{bar:30}] {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn print_list(kind: ListKind, browser: &Browser) {
    let index = browser.index();
    let entries = match kind {
        ListKind::Weapons => index.weapon_names(),
        ListKind::Pools => index.pool_ids(),
        ListKind::Statuses => index.status_values(),
    };
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for entry in entries {
        let _ = writeln!(handle, "{entry}");
    }
}

async fn show_image(browser: &Browser, criteria: &FilterCriteria, name: &str) -> Result<(), String> {
    let weapon = browser
        .catalogue()
        .weapon(&criteria.weapon)
        .ok_or_else(|| format!("unknown weapon '{}'", criteria.weapon))?;
    let blueprint = weapon
        .blueprints
        .iter()
        .find(|bp| bp.name == name)
        .or_else(|| {
            weapon
                .blueprints
                .iter()
                .find(|bp| bp.name.eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| format!("weapon '{}' has no blueprint '{name}'", weapon.name))?;

    match browser.open_image(&weapon.name, blueprint).await.location() {
        Some(location) => println!("{location}"),
        None => eprintln!("{} no image available for {}", "!".bold().yellow(), blueprint.name),
    }
    Ok(())
}

async fn write_output(path: &str, rendered: &[u8]) -> Result<(), String> {
    let path = config::expand_tilde_string(path);
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .await
        .map_err(|e| format!("failed to open output file {path}: {e}"))?;
    outfile
        .write_all(rendered)
        .await
        .map_err(|e| format!("failed to write output file {path}: {e}"))?;
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    let now = Instant::now();

    let client = build_http_client(run.proxy.as_deref(), run.timeout)?;
    let store = ImageStore::parse(&run.images, client.clone()).map_err(|e| e.to_string())?;

    format_kv_line("Catalogue", &run.catalogue.describe());
    format_kv_line("Images", &run.images);
    format_kv_line(
        "Formats",
        &format!("{} -> {}", run.formats.primary, run.formats.fallback),
    );
    format_kv_line("Theme", run.theme.name());
    format_kv_line(
        "Output",
        format_opt_value(run.output.as_deref().unwrap_or_default(), "stdout"),
    );

    let pb = new_progress_bar();
    let mut browser = Browser::new(Arc::new(store), run.formats).with_progress(pb.clone());

    if let Err(e) = browser.load(&run.catalogue, &client).await {
        eprintln!(
            "{}{}{} {}",
            "[".bold().white(),
            "WRN".bold().yellow(),
            "]".bold().white(),
            format!("catalogue unavailable, continuing with no weapons: {e}").white()
        );
    }
    format_kv_line(
        "Weapons",
        &browser.index().weapon_names().len().to_string(),
    );
    eprintln!();

    if let Some(kind) = run.list {
        pb.finish_and_clear();
        print_list(kind, &browser);
        return Ok(());
    }

    let criteria = match run.criteria.as_ref() {
        Some(criteria) => criteria,
        None => {
            pb.finish_and_clear();
            eprintln!(
                ":: no weapon selected, choose one with --weapon ({})",
                browser.index().weapon_names().join(", ")
            );
            return Ok(());
        }
    };

    if let Some(name) = run.show.as_deref() {
        pb.finish_and_clear();
        return show_image(&browser, criteria, name).await;
    }

    let (result, images) = match browser.submit_filter(criteria) {
        Some(submission) => {
            let result = submission.result.clone();
            let outcome = submission.wait().await.map_err(|e| e.to_string())?;
            log::info!(
                "{} of {} images loaded for {}",
                outcome.loaded,
                outcome.total,
                result.weapon
            );
            (result, outcome.images)
        }
        None => {
            log::warn!("weapon {:?} is not in the catalogue", criteria.weapon);
            (
                FilteredResult {
                    weapon: criteria.weapon.clone(),
                    blueprints: Vec::new(),
                },
                Vec::new(),
            )
        }
    };
    pb.finish_and_clear();

    let sources = browser.sources_for(&result);
    let records = output::build_records(&result, &images, &sources);
    let rendered = output::render(run.output_format, &records, run.theme, &result.weapon);
    match run.output.as_deref() {
        Some(path) => write_output(path, &rendered).await?,
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&rendered)
                .map_err(|e| format!("failed to write to stdout: {e}"))?;
        }
    }

    eprintln!();
    eprintln!(
        ":: Completed :: {} blueprints in {}ms ::",
        records.len(),
        now.elapsed().as_millis()
    );
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };
    init_logging(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine a config path".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!("wrote {}", path.display());
        } else {
            println!("config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(run.workers)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
