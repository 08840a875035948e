use super::defaults;
use super::models::{AppConfig, LogLevel};
use crate::selection::HighlightAction;
use crate::theme::{Color, ThemeMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    appearance: AppearanceConfig,
    #[serde(default)]
    highlights: HighlightsConfig,
    #[serde(default)]
    viewport: ViewportConfig,
    #[serde(default)]
    navigation: NavigationConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            theme: tables.appearance.theme,
            font_size: tables.appearance.font_size,
            foreground: tables.appearance.foreground,
            background: tables.appearance.background,
            secondary_background: tables.appearance.secondary_background,
            shadow: tables.appearance.shadow,
            highlight_actions: tables.highlights.actions,
            viewport_width: tables.viewport.width,
            viewport_height: tables.viewport.height,
            home_path: tables.navigation.home_path,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            appearance: AppearanceConfig {
                theme: config.theme,
                font_size: config.font_size,
                foreground: config.foreground,
                background: config.background,
                secondary_background: config.secondary_background,
                shadow: config.shadow,
            },
            highlights: HighlightsConfig {
                actions: config.highlight_actions.clone(),
            },
            viewport: ViewportConfig {
                width: config.viewport_width,
                height: config.viewport_height,
            },
            navigation: NavigationConfig {
                home_path: config.home_path.clone(),
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct AppearanceConfig {
    #[serde(default)]
    theme: ThemeMode,
    #[serde(default = "defaults::default_font_size")]
    font_size: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    foreground: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secondary_background: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shadow: Option<bool>,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            font_size: defaults::default_font_size(),
            foreground: None,
            background: None,
            secondary_background: None,
            shadow: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct HighlightsConfig {
    #[serde(default = "defaults::default_highlight_actions")]
    actions: Vec<HighlightAction>,
}

impl Default for HighlightsConfig {
    fn default() -> Self {
        Self {
            actions: defaults::default_highlight_actions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct ViewportConfig {
    #[serde(default = "defaults::default_viewport_width")]
    width: f32,
    #[serde(default = "defaults::default_viewport_height")]
    height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: defaults::default_viewport_width(),
            height: defaults::default_viewport_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct NavigationConfig {
    #[serde(default = "defaults::default_home_path")]
    home_path: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            home_path: defaults::default_home_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::default_log_level(),
        }
    }
}
