use std::path::{Path, PathBuf};

use bon::Builder;
use serde::Deserialize;

use crate::color::{Color, Theme};
use crate::error::ConfigError;

pub const DEFAULT_STROKE_WIDTH_DP: f32 = 20.0;
pub const DEFAULT_TITLE_SIZE_SP: f32 = 60.0;
pub const DEFAULT_SUBTITLE_SIZE_SP: f32 = 20.0;
pub const DEFAULT_MAX_PROGRESS: i32 = 100;

/// Every display option of the progress bar, resolved to a value.
///
/// Use the generated builder; anything left unset takes its default.
#[derive(Debug, Clone, Builder)]
pub struct ProgressBarConfig {
    // Paint colors
    #[builder(default = Theme::PROGRESS)]
    pub progress_color: Color,
    #[builder(default = Theme::TRACK)]
    pub secondary_progress_color: Color,
    #[builder(default = Theme::BACKDROP)]
    pub background_color: Color,
    #[builder(default = Theme::TITLE)]
    pub title_color: Color,
    #[builder(default = Theme::SUBTITLE)]
    pub subtitle_color: Color,
    #[builder(default = Theme::PROGRESS)]
    pub thumb_color: Color,

    // Gradients are kept as strings until the widget is built so a bad
    // value can fall back to the solid colors above.
    #[builder(into)]
    pub gradient_color_start: Option<String>,
    #[builder(into)]
    pub gradient_color_end: Option<String>,

    // Progress and arc geometry
    #[builder(default = 0)]
    pub progress: i32,
    #[builder(default = DEFAULT_STROKE_WIDTH_DP)]
    pub progress_width: f32,
    #[builder(default = DEFAULT_MAX_PROGRESS)]
    pub max_progress: i32,
    #[builder(default = 0)]
    pub start_angle: i32,
    #[builder(default = 360)]
    pub sweep_angle: i32,

    // Labels
    #[builder(into)]
    pub title: Option<String>,
    #[builder(into)]
    pub subtitle: Option<String>,
    #[builder(default = DEFAULT_TITLE_SIZE_SP)]
    pub title_size: f32,
    #[builder(default = DEFAULT_SUBTITLE_SIZE_SP)]
    pub subtitle_size: f32,

    // Flags
    #[builder(default)]
    pub round_corners: bool,
    #[builder(default)]
    pub thumb_enabled: bool,
    #[builder(default = true)]
    pub enabled: bool,
    #[builder(default)]
    pub draw_background: bool,

    // Display metrics
    #[builder(default = 1.0)]
    pub density: f32,
    #[builder(default = 1.0)]
    pub font_scale: f32,

    // Window configuration
    #[builder(default = 300)]
    pub window_width: usize,
    #[builder(default = 300)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    #[builder(default = "Circular Progress".to_string(), into)]
    pub window_title: String,
    #[builder(default = Theme::WHITE)]
    pub clear_color: Color,
    #[builder(into)]
    pub font_path: Option<PathBuf>,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Screen density and the user's font-size preference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    /// Device pixels per density-independent pixel.
    pub density: f32,
    pub font_scale: f32,
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self {
            density: 1.0,
            font_scale: 1.0,
        }
    }
}

impl DisplayMetrics {
    pub fn dp_to_px(&self, dp: f32) -> f32 {
        dp * self.density
    }

    /// Text sizes are whole pixels.
    pub fn sp_to_px(&self, sp: f32) -> f32 {
        (sp * self.density * self.font_scale).trunc()
    }
}

impl ProgressBarConfig {
    pub fn display_metrics(&self) -> DisplayMetrics {
        DisplayMetrics {
            density: self.density,
            font_scale: self.font_scale,
        }
    }

    /// Reports configuration the widget would otherwise silently repair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_progress < 0 {
            return Err(ConfigError::NegativeMaxProgress(self.max_progress));
        }
        self.gradient_colors().map(|_| ())
    }

    /// Parsed gradient endpoints, `None` unless both are configured.
    pub fn gradient_colors(&self) -> Result<Option<(Color, Color)>, ConfigError> {
        let (Some(start), Some(end)) = (&self.gradient_color_start, &self.gradient_color_end)
        else {
            return Ok(None);
        };
        let parse = |attribute: &'static str, value: &str| {
            value
                .parse::<Color>()
                .map_err(|source| ConfigError::InvalidGradientColor {
                    attribute,
                    value: value.to_string(),
                    source,
                })
        };
        Ok(Some((
            parse("gradientColorStart", start)?,
            parse("gradientColorEnd", end)?,
        )))
    }
}

/// File form of the attribute bag. Keys use the attribute names.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttributeSet {
    pub progress_color: Option<String>,
    pub secondary_progress_color: Option<String>,
    pub background_color: Option<String>,
    pub title_color: Option<String>,
    pub subtitle_color: Option<String>,
    pub thumb_color: Option<String>,
    pub gradient_color_start: Option<String>,
    pub gradient_color_end: Option<String>,
    pub progress: Option<i32>,
    pub progress_width: Option<f32>,
    pub max_progress: Option<i32>,
    pub start_angle: Option<i32>,
    pub sweep_angle: Option<i32>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub title_size: Option<f32>,
    pub subtitle_size: Option<f32>,
    pub round_corners: Option<bool>,
    pub thumb_enabled: Option<bool>,
    pub enabled: Option<bool>,
    pub draw_background: Option<bool>,
    pub density: Option<f32>,
    pub font_scale: Option<f32>,
    pub font_path: Option<PathBuf>,
}

impl AttributeSet {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded attribute file");
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolves absent attributes to their defaults.
    pub fn into_config(self) -> Result<ProgressBarConfig, ConfigError> {
        Ok(ProgressBarConfig::builder()
            .maybe_progress_color(parse_color("progressColor", self.progress_color)?)
            .maybe_secondary_progress_color(parse_color(
                "secondaryProgressColor",
                self.secondary_progress_color,
            )?)
            .maybe_background_color(parse_color("backgroundColor", self.background_color)?)
            .maybe_title_color(parse_color("titleColor", self.title_color)?)
            .maybe_subtitle_color(parse_color("subtitleColor", self.subtitle_color)?)
            .maybe_thumb_color(parse_color("thumbColor", self.thumb_color)?)
            .maybe_gradient_color_start(self.gradient_color_start)
            .maybe_gradient_color_end(self.gradient_color_end)
            .maybe_progress(self.progress)
            .maybe_progress_width(self.progress_width)
            .maybe_max_progress(self.max_progress)
            .maybe_start_angle(self.start_angle)
            .maybe_sweep_angle(self.sweep_angle)
            .maybe_title(self.title)
            .maybe_subtitle(self.subtitle)
            .maybe_title_size(self.title_size)
            .maybe_subtitle_size(self.subtitle_size)
            .maybe_round_corners(self.round_corners)
            .maybe_thumb_enabled(self.thumb_enabled)
            .maybe_enabled(self.enabled)
            .maybe_draw_background(self.draw_background)
            .maybe_density(self.density)
            .maybe_font_scale(self.font_scale)
            .maybe_font_path(self.font_path)
            .build())
    }
}

fn parse_color(attribute: &'static str, value: Option<String>) -> Result<Option<Color>, ConfigError> {
    value
        .map(|value| {
            value
                .parse::<Color>()
                .map_err(|source| ConfigError::InvalidColor {
                    attribute,
                    value,
                    source,
                })
        })
        .transpose()
}
