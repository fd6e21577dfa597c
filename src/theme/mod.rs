use std::fmt;
use std::str::FromStr;

use colored::Color;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Classic,
    Neon,
}

/// CSS colours of a theme, as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub color: &'static str,
    pub button_bg: &'static str,
    pub button_color: &'static str,
    pub input_bg: &'static str,
    pub input_color: &'static str,
    pub border: &'static str,
}

/// Animated particle backdrop settings for a page header.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParticleHeader {
    pub count: u32,
    pub size: (u32, u32),
    pub speed_x: (f32, f32),
    pub speed_y: (f32, f32),
    pub background: &'static str,
    pub particles: &'static [&'static str],
    pub blending: &'static str,
    pub opacity_center: f32,
    pub opacity_edge: f32,
    pub skew: f32,
    pub shapes: &'static [&'static str],
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeaderEffect {
    Plain,
    Particles(ParticleHeader),
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Dark, Theme::Light, Theme::Classic, Theme::Neon];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
            Theme::Classic => "Classic",
            Theme::Neon => "Neon",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: "#0a0a0a",
                color: "#00ff00",
                button_bg: "#00ff00",
                button_color: "#0a0a0a",
                input_bg: "#1a1a1a",
                input_color: "#00ff00",
                border: "#00ff00",
            },
            Theme::Light => Palette {
                background: "#fdfdfd",
                color: "#111111",
                button_bg: "#111111",
                button_color: "#fdfdfd",
                input_bg: "#ffffff",
                input_color: "#111111",
                border: "#111111",
            },
            Theme::Classic => Palette {
                background: "#e0e0ff",
                color: "#000000",
                button_bg: "#0000ff",
                button_color: "#ffffff",
                input_bg: "#e0e0ff",
                input_color: "#000000",
                border: "#0000ff",
            },
            Theme::Neon => Palette {
                background: "#111111",
                color: "#00ffff",
                button_bg: "#00ffff",
                button_color: "#111111",
                input_bg: "#111111",
                input_color: "#00ffff",
                border: "#00ffff",
            },
        }
    }

    /// Header decoration for the theme. Only the light theme has one.
    pub fn header(self) -> HeaderEffect {
        match self {
            Theme::Light => HeaderEffect::Particles(ParticleHeader {
                count: 90,
                size: (1, 20),
                speed_x: (0.0, 0.4),
                speed_y: (0.0, 0.1),
                background: "#ffffff",
                particles: &["#000000"],
                blending: "screen",
                opacity_center: 0.0,
                opacity_edge: 0.5,
                skew: -2.0,
                shapes: &["c", "s", "t"],
            }),
            Theme::Dark | Theme::Classic | Theme::Neon => HeaderEffect::Plain,
        }
    }

    /// Terminal colour used for headings and borders in text output.
    pub fn accent(self) -> Color {
        match self {
            Theme::Dark => Color::BrightGreen,
            Theme::Light => Color::White,
            Theme::Classic => Color::Blue,
            Theme::Neon => Color::BrightCyan,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Theme::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown theme '{wanted}', expected dark, light, classic or neon"))
    }
}

/// Coarse release state derived from a free-form status string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Released,
    Unreleased,
    Other,
}

impl StatusTone {
    pub fn classify(status: &str) -> Self {
        let lower = status.to_lowercase();
        // "unreleased" contains "release", so it has to be checked first
        if lower.contains("unrelease") {
            StatusTone::Unreleased
        } else if lower.contains("release") {
            StatusTone::Released
        } else {
            StatusTone::Other
        }
    }

    pub fn css_color(self, palette: &Palette) -> &'static str {
        match self {
            StatusTone::Released => "limegreen",
            StatusTone::Unreleased => "crimson",
            StatusTone::Other => palette.color,
        }
    }

    pub fn terminal_color(self, theme: Theme) -> Color {
        match self {
            StatusTone::Released => Color::Green,
            StatusTone::Unreleased => Color::Red,
            StatusTone::Other => theme.accent(),
        }
    }
}

pub fn status_label(status: &str) -> &str {
    if status.trim().is_empty() {
        "UNKNOWN"
    } else {
        status
    }
}
