use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::controller::BracketController;

// ── Constants ──────────────────────────────────────────────────────────

pub const BYE: &str = "BYE";
pub const TBD: &str = "TBD";
pub const MIN_PARTICIPANTS: usize = 2;

/// Vertical offset applied to every match body, leaving room for the header strip.
pub const HEADER_OFFSET: f32 = 40.0;
pub const HEADER_HEIGHT: f32 = 30.0;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:17890";
pub const DEFAULT_STATIC_DIR: &str = "overlay";

pub const FONT_CHOICES: &[&str] = &[
    "Inter",
    "Roboto",
    "Poppins",
    "Montserrat",
    "Open Sans",
    "Lato",
    "Raleway",
    "Oswald",
    "Merriweather",
    "Playfair Display",
    "Ubuntu",
    "Nunito",
    "Archivo",
    "Bebas Neue",
    "Courier New",
    "Georgia",
    "Times New Roman",
];

// ── Shared state type aliases ──────────────────────────────────────────

pub type SharedBracketState = Arc<Mutex<BracketController>>;

// ── View mode ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Standard,
    Mirrored,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Standard => "standard",
            ViewMode::Mirrored => "mirrored",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ViewMode::Standard),
            "mirrored" | "finals-center" | "finals_center" => Ok(ViewMode::Mirrored),
            other => Err(format!("Unknown view mode \"{other}\" (expected standard or mirrored).")),
        }
    }
}

// ── Configuration records ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorPalette {
    pub round_header_bg: String,
    pub round_header_text: String,
    pub finals_header_bg: String,
    pub finals_header_text: String,
    pub match_bg: String,
    pub match_border: String,
    pub participant_text: String,
    pub seed_bg: String,
    pub seed_text: String,
    pub connector_line: String,
    pub winner_highlight: String,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            round_header_bg: "#D8B4E2".to_string(),
            round_header_text: "#333333".to_string(),
            finals_header_bg: "#FFD700".to_string(),
            finals_header_text: "#333333".to_string(),
            match_bg: "#FFFFFF".to_string(),
            match_border: "#E0E0E0".to_string(),
            participant_text: "#333333".to_string(),
            seed_bg: "#667EEA".to_string(),
            seed_text: "#FFFFFF".to_string(),
            connector_line: "#CED1F2".to_string(),
            winner_highlight: "#E8F5E9".to_string(),
        }
    }
}

impl ColorPalette {
    pub fn entries(&self) -> [(&'static str, &str); 11] {
        [
            ("roundHeaderBg", self.round_header_bg.as_str()),
            ("roundHeaderText", self.round_header_text.as_str()),
            ("finalsHeaderBg", self.finals_header_bg.as_str()),
            ("finalsHeaderText", self.finals_header_text.as_str()),
            ("matchBg", self.match_bg.as_str()),
            ("matchBorder", self.match_border.as_str()),
            ("participantText", self.participant_text.as_str()),
            ("seedBg", self.seed_bg.as_str()),
            ("seedText", self.seed_text.as_str()),
            ("connectorLine", self.connector_line.as_str()),
            ("winnerHighlight", self.winner_highlight.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BracketConfig {
    pub match_width: f32,
    pub match_height: f32,
    pub round_gap: f32,
    pub font_family: String,
    pub view_mode: ViewMode,
    pub colors: ColorPalette,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            match_width: 200.0,
            match_height: 80.0,
            round_gap: 80.0,
            font_family: "Inter".to_string(),
            view_mode: ViewMode::Standard,
            colors: ColorPalette::default(),
        }
    }
}

impl BracketConfig {
    /// Checks every field once; a controller only ever holds a validated config.
    pub fn validated(self) -> Result<Self, String> {
        for (label, value) in [
            ("matchWidth", self.match_width),
            ("matchHeight", self.match_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{label} must be a positive number, got {value}."));
            }
        }
        if !self.round_gap.is_finite() || self.round_gap < 0.0 {
            return Err(format!("roundGap must be zero or positive, got {}.", self.round_gap));
        }
        if self.font_family.trim().is_empty() {
            return Err("fontFamily must not be empty.".to_string());
        }
        for (key, value) in self.colors.entries() {
            if value.trim().is_empty() {
                return Err(format!("Color \"{key}\" must not be empty."));
            }
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub static_dir: String,
    pub bracket: BracketConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            bracket: BracketConfig::default(),
        }
    }
}
