//! Reader palette and the content container style derived from it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb8(0xff, 0xff, 0xff);
    pub const CORNSILK: Color = Color::rgb8(0xff, 0xf8, 0xdc);
    pub const TURQUOISE: Color = Color::rgb8(0x40, 0xe0, 0xd0);
    pub const NIGHT: Color = Color::rgb8(0x1c, 0x1c, 0x1e);
    pub const NIGHT_RAISED: Color = Color::rgb8(0x2c, 0x2c, 0x2e);
    pub const PAPER_RAISED: Color = Color::rgb8(0xf2, 0xf2, 0xf7);
    pub const INK: Color = Color::rgb8(0x1c, 0x1c, 0x1e);
    pub const MOONLIGHT: Color = Color::rgb8(0xe5, 0xe5, 0xea);

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Color {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn clamped(self) -> Self {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    pub fn to_css(self) -> String {
        let c = self.clamped();
        let channel = |v: f32| (v * 255.0).round() as u8;
        if (c.a - 1.0).abs() < f32::EPSILON {
            format!("#{:02x}{:02x}{:02x}", channel(c.r), channel(c.g), channel(c.b))
        } else {
            format!(
                "rgba({}, {}, {}, {:.2})",
                channel(c.r),
                channel(c.g),
                channel(c.b),
                c.a
            )
        }
    }
}

/// Base palette selector; the individual colors can still be overridden in config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ThemeMode {
    Day,
    #[default]
    Night,
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ThemeMode::Day => "Day",
            ThemeMode::Night => "Night",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ThemeSettings {
    pub foreground: Color,
    pub background: Color,
    pub secondary_background: Color,
    pub shadow: bool,
}

impl ThemeSettings {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Day => ThemeSettings {
                foreground: Color::INK,
                background: Color::WHITE,
                secondary_background: Color::PAPER_RAISED,
                shadow: true,
            },
            ThemeMode::Night => ThemeSettings {
                foreground: Color::MOONLIGHT,
                background: Color::NIGHT,
                secondary_background: Color::NIGHT_RAISED,
                shadow: false,
            },
        }
    }
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self::for_mode(ThemeMode::default())
    }
}

pub const CONTENT_PADDING: &str = "0 20px 80px 20px";
pub const CONTENT_MARGIN: &str = "80px 0";
pub const CONTENT_PADDING_LEFT_PX: f32 = 20.0;
pub const CONTENT_MARGIN_TOP_PX: f32 = 80.0;

/// Style of the scrollable region the chapter is rendered into.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ContentStyle {
    pub background: Color,
    pub color: Color,
    pub height_px: f32,
    pub font_size_em: f32,
}

impl ContentStyle {
    pub fn new(theme: &ThemeSettings, font_size: i32, height_px: f32) -> Self {
        ContentStyle {
            background: theme.background,
            color: theme.foreground,
            height_px: height_px.max(0.0),
            font_size_em: font_scale(font_size),
        }
    }

    pub fn to_css(&self) -> String {
        format!(
            "background: {}; height: {}px; color: {} !important; font-size: {}em !important; \
             overflow-y: scroll; overflow-x: hidden; padding: {}; margin: {};",
            self.background.to_css(),
            self.height_px,
            self.color.to_css(),
            self.font_size_em,
            CONTENT_PADDING,
            CONTENT_MARGIN,
        )
    }
}

/// Font-size setting to an em multiplier: every step is a tenth of the base size.
pub fn font_scale(font_size: i32) -> f32 {
    1.0 + font_size as f32 / 10.0
}
