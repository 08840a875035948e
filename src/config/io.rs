use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load `path`, falling back to defaults when it is missing or invalid.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            debug!("Parsed configuration from disk");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            AppConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let tables: ConfigTables =
        toml::from_str(contents).context("Failed to parse reader configuration")?;
    Ok(AppConfig::from(tables))
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    toml::to_string(&ConfigTables::from(config)).context("Failed to serialize reader configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use crate::theme::{Color, ThemeMode};

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.highlight_actions.len(), 2);
        assert_ne!(
            config.highlight_actions[0].style_class,
            config.highlight_actions[1].style_class
        );
    }

    #[test]
    fn sections_map_onto_flat_fields() {
        let config = parse_config(
            r#"
            [appearance]
            theme = "day"
            font_size = 3
            shadow = false

            [appearance.background]
            r = 0.5
            g = 0.5
            b = 0.5
            a = 1.0

            [[highlights.actions]]
            id = "yellow"
            style_class = "marker-yellow"
            color = { r = 1.0, g = 1.0, b = 0.0, a = 1.0 }

            [viewport]
            height = 900.0

            [navigation]
            home_path = "/library"

            [logging]
            log_level = "trace"
            "#,
        )
        .expect("parse");
        assert_eq!(config.theme, ThemeMode::Day);
        assert_eq!(config.font_size, 3);
        assert_eq!(config.highlight_actions.len(), 1);
        assert_eq!(config.highlight_actions[0].style_class, "marker-yellow");
        assert_eq!(config.viewport_height, 900.0);
        assert_eq!(config.viewport_width, 1024.0);
        assert_eq!(config.home_path, "/library");
        assert_eq!(config.log_level, LogLevel::Trace);

        let theme = config.theme_settings();
        assert!(!theme.shadow);
        assert_eq!(theme.background.to_css(), "#808080");
        assert_eq!(theme.foreground, Color::INK);
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = AppConfig::default();
        config.theme = ThemeMode::Day;
        config.font_size = -2;
        config.secondary_background = Some(Color::CORNSILK);
        config.log_level = LogLevel::Warn;
        let text = serialize_config(&config).expect("serialize");
        assert!(text.contains("[appearance]"));
        assert!(text.contains("[[highlights.actions]]"));
        assert_eq!(parse_config(&text).expect("parse"), config);
    }

    #[test]
    fn invalid_toml_is_an_error_and_load_falls_back() {
        assert!(parse_config("[appearance\nfont_size = ").is_err());
        let config = load_config(Path::new("/nonexistent/conf/config.toml"));
        assert_eq!(config, AppConfig::default());
    }
}
