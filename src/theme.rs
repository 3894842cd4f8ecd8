use crate::storage;
use anyhow::{Context, Result, anyhow};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct ThemePalette {
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,
    pub accent: Color,
    pub motion: Color,
    pub ok: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for ThemePalette {
    fn default() -> Self {
        // Falls back to these if the shipped defaults ever fail to parse.
        Self::from_file(&ThemeFile::default()).unwrap_or(Self {
            text: Color::White,
            muted: Color::Gray,
            border: Color::DarkGray,
            border_focused: Color::Blue,
            accent: Color::Cyan,
            motion: Color::LightRed,
            ok: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct ThemeFile {
    text: String,
    muted: String,
    border: String,
    border_focused: String,
    accent: String,
    motion: String,
    ok: String,
    warning: String,
    error: String,
}

impl Default for ThemeFile {
    fn default() -> Self {
        Self {
            text: "#E7EBF3".to_owned(),
            muted: "#9198AA".to_owned(),
            border: "#586278".to_owned(),
            border_focused: "#728CFF".to_owned(),
            accent: "#66D8FF".to_owned(),
            motion: "#FF8A5C".to_owned(),
            ok: "#67D48E".to_owned(),
            warning: "#FFC66D".to_owned(),
            error: "#FF7986".to_owned(),
        }
    }
}

impl ThemePalette {
    fn from_file(file: &ThemeFile) -> Result<Self> {
        Ok(Self {
            text: parse_hex_color("text", &file.text)?,
            muted: parse_hex_color("muted", &file.muted)?,
            border: parse_hex_color("border", &file.border)?,
            border_focused: parse_hex_color("border_focused", &file.border_focused)?,
            accent: parse_hex_color("accent", &file.accent)?,
            motion: parse_hex_color("motion", &file.motion)?,
            ok: parse_hex_color("ok", &file.ok)?,
            warning: parse_hex_color("warning", &file.warning)?,
            error: parse_hex_color("error", &file.error)?,
        })
    }
}

pub fn load_or_create_theme() -> Result<ThemePalette> {
    let path = storage::theme_path()?;

    if !path.exists() {
        let default_file = ThemeFile::default();
        write_theme_file(&path, &default_file)?;
        return ThemePalette::from_file(&default_file);
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed reading theme config at {}", path.display()))?;
    let parsed = serde_json::from_str::<ThemeFile>(&raw)
        .with_context(|| format!("failed parsing theme config at {}", path.display()))?;
    ThemePalette::from_file(&parsed)
}

fn write_theme_file(path: &Path, theme: &ThemeFile) -> Result<()> {
    storage::ensure_parent_dir(path)?;
    let payload = serde_json::to_string_pretty(theme).context("failed serializing theme config")?;
    fs::write(path, payload)
        .with_context(|| format!("failed writing theme config at {}", path.display()))?;
    Ok(())
}

fn parse_hex_color(key: &str, value: &str) -> Result<Color> {
    let input = value.trim();
    let hex = input.strip_prefix('#').unwrap_or(input);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!(
            "theme field '{key}' must be a hex color like #RRGGBB, got '{value}'"
        ));
    }

    let channel = |range: std::ops::Range<usize>, name: &str| {
        u8::from_str_radix(&hex[range], 16)
            .with_context(|| format!("theme field '{key}' has invalid {name} component"))
    };
    Ok(Color::Rgb(
        channel(0..2, "red")?,
        channel(2..4, "green")?,
        channel(4..6, "blue")?,
    ))
}
