use crate::selection::HighlightAction;
use crate::services::Settings;
use crate::theme::{Color, ThemeMode, ThemeSettings};
use serde::{Deserialize, Serialize};

/// High-level reader configuration; deserializable from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default = "crate::config::defaults::default_font_size")]
    pub font_size: i32,
    #[serde(default)]
    pub foreground: Option<Color>,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub secondary_background: Option<Color>,
    #[serde(default)]
    pub shadow: Option<bool>,
    #[serde(default = "crate::config::defaults::default_highlight_actions")]
    pub highlight_actions: Vec<HighlightAction>,
    #[serde(default = "crate::config::defaults::default_viewport_width")]
    pub viewport_width: f32,
    #[serde(default = "crate::config::defaults::default_viewport_height")]
    pub viewport_height: f32,
    #[serde(default = "crate::config::defaults::default_home_path")]
    pub home_path: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            theme: ThemeMode::default(),
            font_size: crate::config::defaults::default_font_size(),
            foreground: None,
            background: None,
            secondary_background: None,
            shadow: None,
            highlight_actions: crate::config::defaults::default_highlight_actions(),
            viewport_width: crate::config::defaults::default_viewport_width(),
            viewport_height: crate::config::defaults::default_viewport_height(),
            home_path: crate::config::defaults::default_home_path(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl AppConfig {
    /// Palette for the configured mode with any per-color overrides applied.
    pub fn theme_settings(&self) -> ThemeSettings {
        let base = ThemeSettings::for_mode(self.theme);
        ThemeSettings {
            foreground: self.foreground.unwrap_or(base.foreground).clamped(),
            background: self.background.unwrap_or(base.background).clamped(),
            secondary_background: self
                .secondary_background
                .unwrap_or(base.secondary_background)
                .clamped(),
            shadow: self.shadow.unwrap_or(base.shadow),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            theme: self.theme_settings(),
            font_size: self.font_size,
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
