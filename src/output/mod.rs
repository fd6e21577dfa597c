pub mod report;

use colored::Colorize;
use serde::Serialize;

use crate::filter::FilteredResult;
use crate::preload::{ImageResolution, ImageSources};
use crate::theme::{self, StatusTone, Theme};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    pub weapon: String,
    pub name: String,
    pub pool: String,
    pub status: String,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<ImageSources>,
}

/// Pairs each blueprint with its resolved image and candidate locations.
/// `images` and `sources` may be shorter than the result (or empty) when no
/// preload ran.
pub fn build_records(
    result: &FilteredResult,
    images: &[ImageResolution],
    sources: &[ImageSources],
) -> Vec<OutputRecord> {
    result
        .blueprints
        .iter()
        .enumerate()
        .map(|(i, bp)| OutputRecord {
            weapon: result.weapon.clone(),
            name: bp.name.clone(),
            pool: bp.pool.clone(),
            status: bp.status.clone(),
            image: images
                .get(i)
                .and_then(|r| r.location())
                .map(|s| s.to_string()),
            sources: sources.get(i).cloned(),
        })
        .collect()
}

pub const NO_RESULTS: &str = "No blueprints found";

pub fn render_text(records: &[OutputRecord], theme: Theme) -> Vec<u8> {
    if records.is_empty() {
        return format!("{}\n", NO_RESULTS.bold().color(theme.accent())).into_bytes();
    }

    let headers = ["Blueprint", "Pool", "Status", "Image"];
    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.pool.clone(),
                theme::status_label(&r.status).to_string(),
                r.image.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in rows.iter() {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(h, w)| pad(h, *w))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&format!("{}\n", header_line.trim_end().bold().color(theme.accent())));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");
    out.push_str(&format!("{}\n", rule.color(theme.accent())));

    for (record, row) in records.iter().zip(rows.iter()) {
        let tone = StatusTone::classify(&record.status);
        let cells = [
            pad(&row[0], widths[0]).bold().to_string(),
            pad(&row[1], widths[1]),
            pad(&row[2], widths[2])
                .color(tone.terminal_color(theme))
                .to_string(),
            row[3].clone(),
        ];
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out.into_bytes()
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    let mut out = value.to_string();
    out.push_str(&" ".repeat(width.saturating_sub(len)));
    out
}

pub fn render_json(records: &[OutputRecord]) -> Vec<u8> {
    serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]\n".to_vec())
}

pub fn render_html(records: &[OutputRecord], theme: Theme, title: &str) -> Vec<u8> {
    report::render_html(records, theme, title)
}

pub fn render(format: OutputFormat, records: &[OutputRecord], theme: Theme, title: &str) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(records, theme),
        OutputFormat::Json => render_json(records),
        OutputFormat::Html => render_html(records, theme, title),
    }
}
