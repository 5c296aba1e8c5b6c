// ============================================================================
// RENDER: RETAINED SCENE AND SOFTWARE RASTERIZER
// ============================================================================

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::color::Color;
use crate::error::ConfigError;

// ============================================================================
// PAINTS
// ============================================================================

/// Linear gradient between two points, clamped past either end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub start: Color,
    pub end: Color,
}

impl LinearGradient {
    pub fn color_at(&self, x: f32, y: f32) -> Color {
        let dx = self.x1 - self.x0;
        let dy = self.y1 - self.y0;
        let len_sq = dx * dx + dy * dy;
        if len_sq <= f32::EPSILON {
            return self.start;
        }
        let t = ((x - self.x0) * dx + (y - self.y0) * dy) / len_sq;
        Color::lerp(self.start, self.end, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear(LinearGradient),
}

impl Paint {
    pub fn color_at(&self, x: f32, y: f32) -> Color {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear(gradient) => gradient.color_at(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeCap {
    #[default]
    Butt,
    Round,
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    /// Filled disc.
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        paint: Paint,
    },
    /// Stroked arc centered on `radius`. Angles are radians, clockwise from 3 o'clock.
    Arc {
        cx: f32,
        cy: f32,
        radius: f32,
        stroke_width: f32,
        start_angle: f64,
        arc_span: f64,
        cap: StrokeCap,
        paint: Paint,
    },
    /// Left-aligned text with `baseline` as the glyph origin line.
    Text {
        x: i32,
        baseline: i32,
        text: String,
        font_size: f32,
        color: Color,
    },
}

#[derive(Debug, Default)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn render(&self, canvas: &mut Canvas, font: Option<&FontFace>) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(*color),
                DrawCommand::Circle {
                    cx,
                    cy,
                    radius,
                    paint,
                } => canvas.fill_circle(*cx, *cy, *radius, paint),
                DrawCommand::Arc {
                    cx,
                    cy,
                    radius,
                    stroke_width,
                    start_angle,
                    arc_span,
                    cap,
                    paint,
                } => canvas.stroke_arc(
                    *cx,
                    *cy,
                    *radius,
                    *stroke_width,
                    *start_angle,
                    *arc_span,
                    *cap,
                    paint,
                ),
                DrawCommand::Text {
                    x,
                    baseline,
                    text,
                    font_size,
                    color,
                } => match font {
                    Some(font) => canvas.draw_text(*x, *baseline, text, font, *font_size, *color),
                    None => tracing::trace!(text = %text, "no font loaded, skipping text"),
                },
            }
        }
    }
}

// ============================================================================
// CANVAS
// ============================================================================

/// RGBA8 frame the scene is rasterized into.
///
/// Rows the frame does not hold are clipped away.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        let rows = frame.len().checked_div(width * 4).unwrap_or(0);
        if rows < height {
            tracing::warn!(width, height, rows, "frame is shorter than the canvas, clipping");
        }
        Self {
            frame,
            width,
            height: height.min(rows),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        Some(Color::rgba(
            self.frame[idx],
            self.frame[idx + 1],
            self.frame[idx + 2],
            self.frame[idx + 3],
        ))
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Source-over blend of `color` scaled by `coverage`.
    fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let a = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let src = [color.r as f32, color.g as f32, color.b as f32];
        let dst = [
            self.frame[idx] as f32,
            self.frame[idx + 1] as f32,
            self.frame[idx + 2] as f32,
        ];
        let dst_a = self.frame[idx + 3] as f32 / 255.0;
        let out_a = a + dst_a * (1.0 - a);
        for channel in 0..3 {
            self.frame[idx + channel] = (src[channel] * a + dst[channel] * (1.0 - a)).round() as u8;
        }
        self.frame[idx + 3] = (out_a * 255.0).round() as u8;
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        let min_x = (cx - radius - 1.0).floor() as i32;
        let max_x = (cx + radius + 1.0).ceil() as i32;
        let min_y = (cy - radius - 1.0).floor() as i32;
        let max_y = (cy + radius + 1.0).ceil() as i32;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                let aa = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if aa > 0.0 {
                    self.blend(x, y, paint.color_at(px, py), aa);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn stroke_arc(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        stroke_width: f32,
        start_angle: f64,
        arc_span: f64,
        cap: StrokeCap,
        paint: &Paint,
    ) {
        if arc_span == 0.0 || stroke_width <= 0.0 {
            return;
        }
        // Counter-clockwise sweeps are the same pixels as the mirrored clockwise one.
        let (start_angle, arc_span) = if arc_span < 0.0 {
            (start_angle + arc_span, -arc_span)
        } else {
            (start_angle, arc_span)
        };
        let full_ring = arc_span >= TAU;
        let half = stroke_width / 2.0;
        let inner = (radius - half).max(0.0);
        let outer = radius + half;

        let min_x = (cx - outer - 1.0).floor() as i32;
        let max_x = (cx + outer + 1.0).ceil() as i32;
        let min_y = (cy - outer - 1.0).floor() as i32;
        let max_y = (cy + outer + 1.0).ceil() as i32;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let (dx, dy) = (px - cx, py - cy);
                let dist = (dx * dx + dy * dy).sqrt();
                let aa = (outer + 0.5 - dist).min(dist - inner + 0.5).clamp(0.0, 1.0);
                if aa <= 0.0 {
                    continue;
                }
                if !full_ring && !angle_in_sweep((dy as f64).atan2(dx as f64), start_angle, arc_span) {
                    continue;
                }
                self.blend(x, y, paint.color_at(px, py), aa);
            }
        }

        if cap == StrokeCap::Round && !full_ring {
            for angle in [start_angle, start_angle + arc_span] {
                let ex = cx + (angle.cos() as f32) * radius;
                let ey = cy + (angle.sin() as f32) * radius;
                self.fill_cap(ex, ey, half, start_angle, arc_span, cx, cy, paint);
            }
        }
    }

    /// Half disc at an arc end, skipping pixels the stroke already covered.
    #[allow(clippy::too_many_arguments)]
    fn fill_cap(
        &mut self,
        ex: f32,
        ey: f32,
        radius: f32,
        start_angle: f64,
        arc_span: f64,
        cx: f32,
        cy: f32,
        paint: &Paint,
    ) {
        let min_x = (ex - radius - 1.0).floor() as i32;
        let max_x = (ex + radius + 1.0).ceil() as i32;
        let min_y = (ey - radius - 1.0).floor() as i32;
        let max_y = (ey + radius + 1.0).ceil() as i32;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let angle = ((py - cy) as f64).atan2((px - cx) as f64);
                if angle_in_sweep(angle, start_angle, arc_span) {
                    continue;
                }
                let dist = ((px - ex).powi(2) + (py - ey).powi(2)).sqrt();
                let aa = (radius + 0.5 - dist).clamp(0.0, 1.0);
                if aa > 0.0 {
                    self.blend(x, y, paint.color_at(px, py), aa);
                }
            }
        }
    }

    pub fn draw_text(
        &mut self,
        x: i32,
        baseline: i32,
        text: &str,
        font: &FontFace,
        font_size: f32,
        color: Color,
    ) {
        let scale = Scale::uniform(font_size);
        let glyphs: Vec<PositionedGlyph> = font
            .font
            .layout(text, scale, point(x as f32, baseline as f32))
            .collect();
        for glyph in glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    self.blend(bb.min.x + gx as i32, bb.min.y + gy as i32, color, v);
                });
            }
        }
    }
}

/// Whether `angle` lies within the clockwise sweep starting at `start`.
pub fn angle_in_sweep(angle: f64, start: f64, span: f64) -> bool {
    if span >= TAU {
        return true;
    }
    (angle - start).rem_euclid(TAU) <= span
}

// ============================================================================
// TEXT
// ============================================================================

/// Text measurement the draw pass lays labels out with.
///
/// Vertical metrics follow the screen convention: ascent is negative
/// (above the baseline), descent is positive.
pub trait TextMetrics {
    fn advance_width(&self, text: &str, font_size: f32) -> f32;
    fn ascent(&self, font_size: f32) -> f32;
    fn descent(&self, font_size: f32) -> f32;
}

/// Metrics used when no font is available; every string measures zero.
pub struct NoText;

impl TextMetrics for NoText {
    fn advance_width(&self, _text: &str, _font_size: f32) -> f32 {
        0.0
    }

    fn ascent(&self, _font_size: f32) -> f32 {
        0.0
    }

    fn descent(&self, _font_size: f32) -> f32 {
        0.0
    }
}

/// Thin and light faces first, matching the label look.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/roboto/unhinted/RobotoTTF/Roboto-Thin.ttf",
    "/usr/share/fonts/truetype/roboto/hinted/Roboto-Thin.ttf",
    "/usr/share/fonts/TTF/Roboto-Thin.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-ExtraLight.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\segoeuil.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub struct FontFace {
    font: Font<'static>,
    path: PathBuf,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace").field("path", &self.path).finish()
    }
}

impl FontFace {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Font::try_from_vec(data).ok_or_else(|| ConfigError::FontLoad(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), "loaded label font");
        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    /// First loadable font from the well-known system locations.
    pub fn discover() -> Option<Self> {
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .filter(|path| path.exists())
            .find_map(|path| Self::load(path).ok())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextMetrics for FontFace {
    fn advance_width(&self, text: &str, font_size: f32) -> f32 {
        let scale = Scale::uniform(font_size);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn ascent(&self, font_size: f32) -> f32 {
        -self.font.v_metrics(Scale::uniform(font_size)).ascent
    }

    fn descent(&self, font_size: f32) -> f32 {
        -self.font.v_metrics(Scale::uniform(font_size)).descent
    }
}
