use std::str::FromStr;

use crate::error::ColorParseError;

/// Color representation for every painted element of the progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#AARRGGBB` packed form.
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Linear interpolation per channel, `t` clamped to `[0, 1]`.
    pub fn lerp(from: Color, to: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(from.r, to.r),
            g: mix(from.g, to.g),
            b: mix(from.b, to.b),
            a: mix(from.a, to.a),
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ColorParseError::InvalidHex(s.to_string()));
            }
            let value = u32::from_str_radix(hex, 16)
                .map_err(|_| ColorParseError::InvalidHex(s.to_string()))?;
            return match hex.len() {
                6 => Ok(Color::from_argb(0xff00_0000 | value)),
                8 => Ok(Color::from_argb(value)),
                _ => Err(ColorParseError::InvalidHex(s.to_string())),
            };
        }

        named_color(&trimmed.to_ascii_lowercase())
            .ok_or_else(|| ColorParseError::UnknownName(s.to_string()))
    }
}

fn named_color(name: &str) -> Option<Color> {
    let argb = match name {
        "black" => 0xff00_0000,
        "darkgray" | "darkgrey" => 0xff44_4444,
        "gray" | "grey" => 0xff88_8888,
        "lightgray" | "lightgrey" => 0xffcc_cccc,
        "white" => 0xffff_ffff,
        "red" => 0xffff_0000,
        "green" => 0xff00_ff00,
        "blue" => 0xff00_00ff,
        "yellow" => 0xffff_ff00,
        "cyan" | "aqua" => 0xff00_ffff,
        "magenta" | "fuchsia" => 0xffff_00ff,
        "lime" => 0xff00_ff00,
        "maroon" => 0xff80_0000,
        "navy" => 0xff00_0080,
        "olive" => 0xff80_8000,
        "purple" => 0xff80_0080,
        "silver" => 0xffc0_c0c0,
        "teal" => 0xff00_8080,
        _ => return None,
    };
    Some(Color::from_argb(argb))
}

/// Default palette for options that are not configured.
pub struct Theme;

impl Theme {
    pub const PROGRESS: Color = Color::rgb(0x33, 0xb5, 0xe5);
    pub const TRACK: Color = Color::rgb(0xe0, 0xe0, 0xe0);
    pub const BACKDROP: Color = Color::rgba(0x00, 0x00, 0x00, 0x40);
    pub const TITLE: Color = Color::rgb(0x21, 0x21, 0x21);
    pub const SUBTITLE: Color = Color::rgb(0x75, 0x75, 0x75);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
}
