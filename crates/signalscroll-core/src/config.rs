use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::color::Rgba;
use crate::easing::Easing;
use crate::pin::CoverEffect;
use crate::property::{Property, PropertySet};
use crate::trigger::{Anchor, RangeEnd};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub navbar: NavbarConfig,
    #[serde(default)]
    pub hero: HeroConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub philosophy: PhilosophyConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Input poll rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frames per second while anything is animating
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Document pixels per terminal row
    #[serde(default = "default_row_px")]
    pub row_px: f64,
    /// Rows moved by a single scroll step
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: u16,
    /// Animate keyboard scrolling
    #[serde(default = "default_true")]
    pub smooth_scroll: bool,
    /// Duration of a smooth scroll in milliseconds
    #[serde(default = "default_scroll_duration")]
    pub scroll_duration_ms: u64,
    /// Easing of a smooth scroll (e.g. "power2.out", "cubic-bezier(0.25,0.46,0.45,0.94)")
    #[serde(default = "default_scroll_easing")]
    pub scroll_easing: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            row_px: default_row_px(),
            scroll_lines: default_scroll_lines(),
            smooth_scroll: default_true(),
            scroll_duration_ms: default_scroll_duration(),
            scroll_easing: default_scroll_easing(),
        }
    }
}

impl UiConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.animation_fps.clamp(1, 240)))
    }

    pub fn scroll_easing(&self) -> crate::Result<Easing> {
        self.scroll_easing.parse()
    }
}

/// Page colours, as CSS-style colour strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "default_paper")]
    pub paper: String,
    #[serde(default = "default_signal")]
    pub signal: String,
    #[serde(default = "default_offwhite")]
    pub offwhite: String,
    #[serde(default = "default_dark")]
    pub dark: String,
    #[serde(default = "default_black")]
    pub black: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            paper: default_paper(),
            signal: default_signal(),
            offwhite: default_offwhite(),
            dark: default_dark(),
            black: default_black(),
        }
    }
}

/// Parsed page colours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub paper: Rgba,
    pub signal: Rgba,
    pub offwhite: Rgba,
    pub dark: Rgba,
    pub black: Rgba,
}

impl PaletteConfig {
    pub fn parse(&self) -> crate::Result<Palette> {
        Ok(Palette {
            paper: self.paper.parse()?,
            signal: self.signal.parse()?,
            offwhite: self.offwhite.parse()?,
            dark: self.dark.parse()?,
            black: self.black.parse()?,
        })
    }
}

/// One of the navbar's two canonical looks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    pub color: String,
    pub background: String,
    pub border: String,
}

impl StyleConfig {
    pub fn to_properties(&self) -> crate::Result<PropertySet> {
        Ok(PropertySet::new()
            .with(Property::Color, self.color.parse::<Rgba>()?)
            .with(Property::Background, self.background.parse::<Rgba>()?)
            .with(Property::BorderColor, self.border.parse::<Rgba>()?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavbarConfig {
    /// Scroll offset past which the navbar turns solid
    #[serde(default = "default_navbar_threshold")]
    pub threshold_px: f64,
    /// Style transition in milliseconds (at most 300)
    #[serde(default = "default_navbar_transition")]
    pub transition_ms: u64,
    #[serde(default = "default_navbar_easing")]
    pub easing: String,
    /// Style at the top of the page
    #[serde(default = "default_navbar_inactive")]
    pub inactive: StyleConfig,
    /// Style once scrolled past the threshold
    #[serde(default = "default_navbar_active")]
    pub active: StyleConfig,
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self {
            threshold_px: default_navbar_threshold(),
            transition_ms: default_navbar_transition(),
            easing: default_navbar_easing(),
            inactive: default_navbar_inactive(),
            active: default_navbar_active(),
        }
    }
}

impl NavbarConfig {
    pub fn easing(&self) -> crate::Result<Easing> {
        self.easing.parse()
    }
}

/// Staggered entrance of the hero lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroConfig {
    /// Starting downward offset in pixels
    #[serde(default = "default_hero_offset")]
    pub offset_y: f64,
    #[serde(default = "default_hero_duration")]
    pub duration_ms: u64,
    #[serde(default = "default_hero_stagger")]
    pub stagger_ms: u64,
    #[serde(default = "default_hero_delay")]
    pub delay_ms: u64,
    #[serde(default = "default_entrance_easing")]
    pub easing: String,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            offset_y: default_hero_offset(),
            duration_ms: default_hero_duration(),
            stagger_ms: default_hero_stagger(),
            delay_ms: default_hero_delay(),
            easing: default_entrance_easing(),
        }
    }
}

impl HeroConfig {
    pub fn easing(&self) -> crate::Result<Easing> {
        self.easing.parse()
    }
}

/// The three feature cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Deck rotation interval of the shuffler card
    #[serde(default = "default_shuffle_interval")]
    pub shuffle_interval_ms: u64,
    #[serde(default = "default_shuffle_items")]
    pub shuffle_items: Vec<String>,
    #[serde(default = "default_typewriter_text")]
    pub typewriter_text: String,
    #[serde(default = "default_typewriter_tick")]
    pub typewriter_tick_ms: u64,
    /// Ticks the full text stays up before restarting
    #[serde(default = "default_typewriter_pause")]
    pub typewriter_pause_ticks: usize,
    /// Pause between loops of the scheduler cursor
    #[serde(default = "default_cursor_repeat_delay")]
    pub cursor_repeat_delay_ms: u64,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            shuffle_interval_ms: default_shuffle_interval(),
            shuffle_items: default_shuffle_items(),
            typewriter_text: default_typewriter_text(),
            typewriter_tick_ms: default_typewriter_tick(),
            typewriter_pause_ticks: default_typewriter_pause(),
            cursor_repeat_delay_ms: default_cursor_repeat_delay(),
        }
    }
}

/// Scroll-triggered reveal of the philosophy statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhilosophyConfig {
    /// Anchor at which the reveal fires (e.g. "top 80%")
    #[serde(default = "default_philosophy_start")]
    pub start: String,
    #[serde(default = "default_philosophy_offset")]
    pub offset_y: f64,
    #[serde(default = "default_philosophy_duration")]
    pub duration_ms: u64,
    #[serde(default = "default_philosophy_stagger")]
    pub stagger_ms: u64,
    #[serde(default = "default_entrance_easing")]
    pub easing: String,
    /// Replay the reveal every time the statement scrolls back in
    #[serde(default)]
    pub restartable: bool,
}

impl Default for PhilosophyConfig {
    fn default() -> Self {
        Self {
            start: default_philosophy_start(),
            offset_y: default_philosophy_offset(),
            duration_ms: default_philosophy_duration(),
            stagger_ms: default_philosophy_stagger(),
            easing: default_entrance_easing(),
            restartable: false,
        }
    }
}

impl PhilosophyConfig {
    pub fn start(&self) -> crate::Result<Anchor> {
        self.start.parse()
    }

    pub fn easing(&self) -> crate::Result<Easing> {
        self.easing.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolCardConfig {
    pub num: String,
    pub title: String,
    pub desc: String,
}

/// The sticky-stacking protocol section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Where each card pins, measured on the card
    #[serde(default = "default_pin_start")]
    pub pin_start: String,
    /// Where pinning ends, measured on the whole section
    #[serde(default = "default_pin_end")]
    pub pin_end: String,
    /// Where the cover effect starts, measured on the covering card
    #[serde(default = "default_cover_start")]
    pub cover_start: String,
    /// Where the cover effect is complete (anchor or "+=" distance)
    #[serde(default = "default_cover_end")]
    pub cover_end: String,
    /// Look of a fully covered card
    #[serde(default)]
    pub cover: CoverEffect,
    /// Whether the last card also covers as it scrolls away
    #[serde(default = "default_true")]
    pub trailing_cover: bool,
    /// Length of the last card's cover, from its own "top top"
    #[serde(default = "default_trailing_cover_end")]
    pub trailing_cover_end: String,
    #[serde(default = "default_protocol_cards")]
    pub cards: Vec<ProtocolCardConfig>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            pin_start: default_pin_start(),
            pin_end: default_pin_end(),
            cover_start: default_cover_start(),
            cover_end: default_cover_end(),
            cover: CoverEffect::default(),
            trailing_cover: true,
            trailing_cover_end: default_trailing_cover_end(),
            cards: default_protocol_cards(),
        }
    }
}

impl ProtocolConfig {
    pub fn pin_start(&self) -> crate::Result<Anchor> {
        self.pin_start.parse()
    }

    /// Anchor on the section container, not on the card
    pub fn pin_end(&self) -> crate::Result<Anchor> {
        self.pin_end.parse()
    }

    pub fn cover_start(&self) -> crate::Result<Anchor> {
        self.cover_start.parse()
    }

    pub fn cover_end(&self) -> crate::Result<RangeEnd> {
        self.cover_end.parse()
    }

    /// `None` when the trailing cover is switched off
    pub fn trailing_cover_end(&self) -> crate::Result<Option<RangeEnd>> {
        if !self.trailing_cover {
            return Ok(None);
        }
        self.trailing_cover_end.parse().map(Some)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("signalscroll")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_row_px() -> f64 {
    20.0
}

fn default_scroll_lines() -> u16 {
    3
}

fn default_scroll_duration() -> u64 {
    150
}

fn default_scroll_easing() -> String {
    "power2.out".to_string()
}

fn default_paper() -> String {
    "#E8E4DD".to_string()
}

fn default_signal() -> String {
    "#E63B2E".to_string()
}

fn default_offwhite() -> String {
    "#F5F3EE".to_string()
}

fn default_dark() -> String {
    "#111111".to_string()
}

fn default_black() -> String {
    "#000000".to_string()
}


fn default_navbar_threshold() -> f64 {
    100.0
}

fn default_navbar_transition() -> u64 {
    300
}

fn default_navbar_easing() -> String {
    "power1.out".to_string()
}

fn default_navbar_inactive() -> StyleConfig {
    StyleConfig {
        color: default_paper(),
        background: "transparent".to_string(),
        border: "transparent".to_string(),
    }
}

fn default_navbar_active() -> StyleConfig {
    StyleConfig {
        color: default_dark(),
        background: "rgba(245, 243, 238, 0.8)".to_string(),
        border: "rgba(17, 17, 17, 0.1)".to_string(),
    }
}

fn default_hero_offset() -> f64 {
    40.0
}

fn default_hero_duration() -> u64 {
    1200
}

fn default_hero_stagger() -> u64 {
    80
}

fn default_hero_delay() -> u64 {
    200
}

fn default_entrance_easing() -> String {
    "power3.out".to_string()
}

fn default_shuffle_interval() -> u64 {
    3000
}

fn default_shuffle_items() -> Vec<String> {
    vec![
        "Signal to Noise Ratio".to_string(),
        "Algorithmic Purity".to_string(),
        "Agnostic Discovery".to_string(),
    ]
}

fn default_typewriter_text() -> String {
    "Breaking down complex neural networks into simple steps.".to_string()
}

fn default_typewriter_tick() -> u64 {
    100
}

fn default_typewriter_pause() -> usize {
    10
}

fn default_cursor_repeat_delay() -> u64 {
    1000
}

fn default_philosophy_start() -> String {
    "top 80%".to_string()
}

fn default_philosophy_offset() -> f64 {
    50.0
}

fn default_philosophy_duration() -> u64 {
    1000
}

fn default_philosophy_stagger() -> u64 {
    150
}

fn default_pin_start() -> String {
    "top top".to_string()
}

fn default_pin_end() -> String {
    "bottom bottom".to_string()
}

fn default_cover_start() -> String {
    "top bottom".to_string()
}

fn default_cover_end() -> String {
    "top top".to_string()
}

fn default_trailing_cover_end() -> String {
    "+=100%".to_string()
}

fn default_protocol_cards() -> Vec<ProtocolCardConfig> {
    let card = |num: &str, title: &str, desc: &str| ProtocolCardConfig {
        num: num.to_string(),
        title: title.to_string(),
        desc: desc.to_string(),
    };
    vec![
        card(
            "[01]",
            "Signal Extraction",
            "Isolating high-value machine learning patterns from the surrounding algorithmic noise.",
        ),
        card(
            "[02]",
            "Neural Translation",
            "Converting highly complex transformer architectures into clear, actionable human logic.",
        ),
        card(
            "[03]",
            "Jedi Application",
            "Deploying your trained models with exact precision, maintaining philosophical intent over hype.",
        ),
    ]
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/signalscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("signalscroll")
            .join("config.toml")
    }

    /// Get the log file used while the terminal UI owns the screen
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("signalscroll.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}
