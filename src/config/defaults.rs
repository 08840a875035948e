use crate::selection::HighlightAction;
use crate::theme::Color;

pub(crate) fn default_font_size() -> i32 {
    0
}

pub(crate) fn default_highlight_actions() -> Vec<HighlightAction> {
    vec![
        HighlightAction::new("color_1", "color-1", Color::CORNSILK),
        HighlightAction::new("color_2", "color-2", Color::TURQUOISE),
    ]
}

pub(crate) fn default_viewport_width() -> f32 {
    1024.0
}

pub(crate) fn default_viewport_height() -> f32 {
    768.0
}

pub(crate) fn default_home_path() -> String {
    "/".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
