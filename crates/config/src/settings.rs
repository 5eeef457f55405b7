// Converter settings
// Loaded from ~/.config/csvxl/settings.json (override with CSVXL_CONFIG)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use csvxl_core::options::{
    DEFAULT_ARCHIVE_NAME, DEFAULT_SHEET_NAME, DETECT_SAMPLE_CHARS, MIN_POPULATED_CELLS,
};
use csvxl_core::{ConvertOptions, Separator};

/// Environment variable that points at an alternative settings file
pub const CONFIG_ENV: &str = "CSVXL_CONFIG";

/// Separator preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorSetting {
    /// Detect per file (default)
    #[default]
    Auto,
    Comma,
    Semicolon,
}

impl SeparatorSetting {
    /// The forced separator, or None to detect
    pub fn forced(self) -> Option<Separator> {
        match self {
            SeparatorSetting::Auto => None,
            SeparatorSetting::Comma => Some(Separator::Comma),
            SeparatorSetting::Semicolon => Some(Separator::Semicolon),
        }
    }
}

impl std::str::FromStr for SeparatorSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(SeparatorSetting::Auto);
        }
        match s.parse::<Separator>()? {
            Separator::Comma => Ok(SeparatorSetting::Comma),
            Separator::Semicolon => Ok(SeparatorSetting::Semicolon),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Pipeline
    #[serde(rename = "pipeline.separator")]
    pub separator: SeparatorSetting,

    #[serde(rename = "pipeline.sampleChars")]
    pub sample_chars: usize,

    #[serde(rename = "pipeline.minPopulatedCells")]
    pub min_populated_cells: usize,

    // Output
    #[serde(rename = "output.sheetName")]
    pub sheet_name: String,

    #[serde(rename = "output.archiveName")]
    pub archive_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: SeparatorSetting::Auto,
            sample_chars: DETECT_SAMPLE_CHARS,
            min_populated_cells: MIN_POPULATED_CELLS,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("csvxl")
            .join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file gives defaults; an unreadable
    /// or malformed file gives defaults and a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Save current settings to the default location
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Options for the conversion pipeline
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            separator: self.separator.forced(),
            sample_chars: self.sample_chars,
            min_populated: self.min_populated_cells,
            sheet_name: self.sheet_name.clone(),
        }
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
