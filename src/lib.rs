// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod render;
pub mod window;

use std::time::{Duration, Instant};

pub use animation::{ProgressAnimationListener, Tween, DEFAULT_ANIMATION_DURATION};
pub use color::{Color, Theme};
pub use config::{AttributeSet, DisplayMetrics, ProgressBarConfig};
pub use error::{ColorParseError, ConfigError, DisplayError};
pub use render::{
    Canvas, DrawCommand, FontFace, LinearGradient, NoText, Paint, Scene, StrokeCap, TextMetrics,
};
pub use window::ProgressWindow;

use animation::RunningTween;

/// Share of the shorter side kept free around the arc.
const PADDING_RATIO: f64 = 0.12;
/// Gap between the title baseline and the subtitle baseline, in title heights.
const SUBTITLE_SPACING: f64 = 1.3;

// ============================================================================
// PUBLIC API - COMMANDS
// ============================================================================

/// Command enum for driving a progress bar from another thread
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressCommand {
    SetProgress(i32),
    AnimateTo { start: i32, end: i32 },
    SetMaxProgress(i32),
    SetTitle(String),
    SetSubtitle(String),
    SetTitleColor(Color),
    SetSubtitleColor(Color),
    SetEnabled(bool),
}

// ============================================================================
// LAYOUT TYPES
// ============================================================================

/// Rectangle the arcs are inscribed in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Arc-based progress indicator.
///
/// Call [`layout`](Self::layout) whenever the available size changes and
/// [`draw`](Self::draw) to record a frame. Mutators mark the widget dirty;
/// the host redraws while [`needs_redraw`](Self::needs_redraw) is set.
pub struct CircularProgressBar {
    max_progress: i32,
    progress: i32,
    start_angle: i32,
    sweep_angle: i32,
    progress_width: f32,

    title: String,
    subtitle: String,
    title_size: f32,
    subtitle_size: f32,
    title_color: Color,
    subtitle_color: Color,

    progress_color: Color,
    secondary_progress_color: Color,
    background_color: Color,
    thumb_color: Color,
    gradient: Option<(Color, Color)>,

    round_corners: bool,
    thumb_enabled: bool,
    enabled: bool,
    draw_background: bool,
    metrics: DisplayMetrics,

    // Recomputed by layout / draw
    width: u32,
    height: u32,
    padding: f32,
    bounds: Bounds,
    start_thumb: (f32, f32),
    end_thumb: (f32, f32),
    progress_gradient: Option<LinearGradient>,
    track_gradient: Option<LinearGradient>,

    dirty: bool,
    animation: Option<RunningTween>,
    listener: Option<Box<dyn ProgressAnimationListener>>,
}

impl std::fmt::Debug for CircularProgressBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircularProgressBar")
            .field("progress", &self.progress)
            .field("max_progress", &self.max_progress)
            .field("start_angle", &self.start_angle)
            .field("sweep_angle", &self.sweep_angle)
            .field("title", &self.title)
            .field("subtitle", &self.subtitle)
            .field("enabled", &self.enabled)
            .field("bounds", &self.bounds)
            .field("animating", &self.animation.is_some())
            .finish_non_exhaustive()
    }
}

impl CircularProgressBar {
    /// Builds the widget from a resolved configuration.
    ///
    /// Never fails: a malformed gradient falls back to the solid colors and a
    /// negative `max_progress` is treated as zero, both with a warning.
    pub fn new(config: &ProgressBarConfig) -> Self {
        let gradient = match config.gradient_colors() {
            Ok(gradient) => gradient,
            Err(error) => {
                tracing::warn!(%error, "ignoring gradient configuration, using solid colors");
                None
            }
        };
        let max_progress = if config.max_progress < 0 {
            tracing::warn!(
                max_progress = config.max_progress,
                "negative maxProgress, using 0"
            );
            0
        } else {
            config.max_progress
        };

        Self {
            max_progress,
            progress: config.progress.clamp(0, max_progress),
            start_angle: config.start_angle,
            sweep_angle: config.sweep_angle,
            progress_width: config.progress_width,
            title: config.title.clone().unwrap_or_default(),
            subtitle: config.subtitle.clone().unwrap_or_default(),
            title_size: config.title_size,
            subtitle_size: config.subtitle_size,
            title_color: config.title_color,
            subtitle_color: config.subtitle_color,
            progress_color: config.progress_color,
            secondary_progress_color: config.secondary_progress_color,
            background_color: config.background_color,
            thumb_color: config.thumb_color,
            gradient,
            round_corners: config.round_corners,
            thumb_enabled: config.thumb_enabled,
            enabled: config.enabled,
            draw_background: config.draw_background,
            metrics: config.display_metrics(),
            width: 0,
            height: 0,
            padding: 0.0,
            bounds: Bounds::default(),
            start_thumb: (0.0, 0.0),
            end_thumb: (0.0, 0.0),
            progress_gradient: None,
            track_gradient: None,
            dirty: true,
            animation: None,
            listener: None,
        }
    }

    // ------------------------------------------------------------------------
    // Layout pass
    // ------------------------------------------------------------------------

    pub fn layout(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;

        let shorter = width.min(height);
        self.padding = (f64::from(shorter) * PADDING_RATIO) as i32 as f32;

        let side = (shorter as f32 - 2.0 * self.padding).max(0.0);
        let left = (width as f32 - side) / 2.0;
        let top = (height as f32 - side) / 2.0;
        self.bounds = Bounds {
            left,
            top,
            right: left + side,
            bottom: top + side,
        };
        self.start_thumb = self.point_on_circle(self.start_angle as f64);
        self.regenerate_gradients();

        tracing::debug!(
            width,
            height,
            padding = self.padding,
            bounds = ?self.bounds,
            "laid out progress bar"
        );
        self.invalidate();
    }

    fn regenerate_gradients(&mut self) {
        let Some((start, end)) = self.gradient else {
            return;
        };
        let b = self.bounds;
        self.progress_gradient = Some(LinearGradient {
            x0: b.left * 4.0,
            y0: b.top * 3.5,
            x1: b.right,
            y1: b.bottom / 1.5,
            start,
            end,
        });
        self.track_gradient = Some(LinearGradient {
            x0: b.left * 4.0,
            y0: b.top * 3.7,
            x1: b.right,
            y1: b.bottom / 1.7,
            start: Theme::WHITE,
            end,
        });
    }

    fn radius(&self) -> f32 {
        self.bounds.width() / 2.0
    }

    fn point_on_circle(&self, degrees: f64) -> (f32, f32) {
        let radians = degrees.to_radians();
        let radius = self.radius() as f64;
        (
            (radians.cos() * radius + self.bounds.center_x() as f64) as f32,
            (radians.sin() * radius + self.bounds.center_y() as f64) as f32,
        )
    }

    // ------------------------------------------------------------------------
    // Draw pass
    // ------------------------------------------------------------------------

    /// Degrees of the progress arc for the current progress.
    pub fn progress_sweep(&self) -> f32 {
        if self.max_progress > 0 {
            self.progress as f32 / self.max_progress as f32 * self.sweep_angle as f32
        } else {
            0.0
        }
    }

    fn stroke_cap(&self) -> StrokeCap {
        if self.round_corners {
            StrokeCap::Round
        } else {
            StrokeCap::Butt
        }
    }

    fn stroke_width(&self) -> f32 {
        self.metrics.dp_to_px(self.progress_width)
    }

    fn progress_paint(&self) -> Paint {
        self.progress_gradient
            .map(Paint::Linear)
            .unwrap_or(Paint::Solid(self.progress_color))
    }

    fn track_paint(&self) -> Paint {
        self.track_gradient
            .map(Paint::Linear)
            .unwrap_or(Paint::Solid(self.secondary_progress_color))
    }

    /// Records one frame into `scene`, in painter's order.
    pub fn draw(&mut self, scene: &mut Scene, text: &dyn TextMetrics) {
        let cap = self.stroke_cap();
        let (cx, cy, radius) = (self.bounds.center_x(), self.bounds.center_y(), self.radius());
        let stroke_width = self.stroke_width();

        if self.draw_background {
            scene.add_command(DrawCommand::Circle {
                cx: self.width as f32 / 2.0,
                cy: self.height as f32 / 2.0,
                radius: self.width as f32 / 2.0,
                paint: Paint::Solid(self.background_color),
            });
        }

        scene.add_command(DrawCommand::Arc {
            cx,
            cy,
            radius,
            stroke_width,
            start_angle: (self.start_angle as f64).to_radians(),
            arc_span: (self.sweep_angle as f64).to_radians(),
            cap,
            paint: self.track_paint(),
        });

        let mut sweep = self.progress_sweep();
        let mut thumb_color = self.thumb_color;
        if self.enabled {
            scene.add_command(DrawCommand::Arc {
                cx,
                cy,
                radius,
                stroke_width,
                start_angle: (self.start_angle as f64).to_radians(),
                arc_span: (sweep as f64).to_radians(),
                cap,
                paint: self.progress_paint(),
            });
        } else {
            thumb_color = self.secondary_progress_color;
            sweep = self.sweep_angle as f32;
        }

        if self.thumb_enabled {
            self.end_thumb = self.point_on_circle(self.start_angle as f64 + sweep as f64);
            for (x, y) in [self.start_thumb, self.end_thumb] {
                scene.add_command(DrawCommand::Circle {
                    cx: x,
                    cy: y,
                    radius: stroke_width,
                    paint: Paint::Solid(thumb_color),
                });
            }
        }

        self.draw_text(scene, text);

        tracing::trace!(progress = self.progress, sweep, "drew progress bar");
        self.dirty = false;
    }

    fn draw_text(&self, scene: &mut Scene, text: &dyn TextMetrics) {
        if self.title.is_empty() {
            return;
        }
        let half_width = (self.width / 2) as f32;
        let title_px = self.metrics.sp_to_px(self.title_size);
        let subtitle_px = self.metrics.sp_to_px(self.subtitle_size);

        let x = (half_width - text.advance_width(&self.title, title_px) / 2.0) as i32;
        let mut baseline = (self.height / 2) as i32;
        let title_height = (text.descent(title_px) + text.ascent(title_px)).abs();
        if self.subtitle.is_empty() {
            baseline = (baseline as f32 + title_height / 2.0) as i32;
        }
        scene.add_command(DrawCommand::Text {
            x,
            baseline,
            text: self.title.clone(),
            font_size: title_px,
            color: self.title_color,
        });

        if self.subtitle.is_empty() {
            return;
        }
        let baseline = (baseline as f64 + title_height as f64 * SUBTITLE_SPACING) as i32;
        let x = (half_width - text.advance_width(&self.subtitle, subtitle_px) / 2.0) as i32;
        scene.add_command(DrawCommand::Text {
            x,
            baseline,
            text: self.subtitle.clone(),
            font_size: subtitle_px,
            color: self.subtitle_color,
        });
    }

    // ------------------------------------------------------------------------
    // Redraw requests
    // ------------------------------------------------------------------------

    fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    /// Returns the pending redraw request and clears it.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ------------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------------

    /// Sets progress, clamped to `[0, max_progress]`.
    pub fn set_progress(&mut self, progress: i32) {
        self.progress = progress.clamp(0, self.max_progress);
        self.invalidate();
    }

    /// Tween entry point. Truncates, clamps and only applies a changed
    /// value; returns whether progress changed.
    fn set_progress_from_tween(&mut self, progress: f32) -> bool {
        let next = (progress as i32).clamp(0, self.max_progress);
        if next == self.progress {
            return false;
        }
        self.set_progress(next);
        true
    }

    /// Changes the upper bound; current progress is re-clamped.
    pub fn set_max_progress(&mut self, max_progress: i32) {
        self.max_progress = max_progress.max(0);
        self.progress = self.progress.clamp(0, self.max_progress);
        self.invalidate();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.invalidate();
    }

    pub fn set_subtitle(&mut self, subtitle: impl Into<String>) {
        self.subtitle = subtitle.into();
        self.invalidate();
    }

    pub fn set_title_color(&mut self, color: Color) {
        self.title_color = color;
        self.invalidate();
    }

    pub fn set_subtitle_color(&mut self, color: Color) {
        self.subtitle_color = color;
        self.invalidate();
    }

    pub fn set_progress_color(&mut self, color: Color) {
        self.progress_color = color;
        self.invalidate();
    }

    pub fn set_secondary_progress_color(&mut self, color: Color) {
        self.secondary_progress_color = color;
        self.invalidate();
    }

    pub fn set_thumb_color(&mut self, color: Color) {
        self.thumb_color = color;
        self.invalidate();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.invalidate();
    }

    pub fn set_display_metrics(&mut self, metrics: DisplayMetrics) {
        self.metrics = metrics;
        self.invalidate();
    }

    pub fn apply(&mut self, command: ProgressCommand) {
        match command {
            ProgressCommand::SetProgress(progress) => self.set_progress(progress),
            ProgressCommand::AnimateTo { start, end } => self.animate_progress_to(start, end),
            ProgressCommand::SetMaxProgress(max) => self.set_max_progress(max),
            ProgressCommand::SetTitle(title) => self.set_title(title),
            ProgressCommand::SetSubtitle(subtitle) => self.set_subtitle(subtitle),
            ProgressCommand::SetTitleColor(color) => self.set_title_color(color),
            ProgressCommand::SetSubtitleColor(color) => self.set_subtitle_color(color),
            ProgressCommand::SetEnabled(enabled) => self.set_enabled(enabled),
        }
    }

    // ------------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------------

    pub fn set_animation_listener(&mut self, listener: impl ProgressAnimationListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_animation_listener(&mut self) {
        self.listener = None;
    }

    /// Tweens progress from `start` to `end` over one second.
    ///
    /// The clock starts at the first [`tick`](Self::tick), so time spent
    /// before the host's first frame does not shorten the animation.
    pub fn animate_progress_to(&mut self, start: i32, end: i32) {
        self.animate_progress_with_duration(start, end, DEFAULT_ANIMATION_DURATION);
    }

    pub fn animate_progress_with_duration(&mut self, start: i32, end: i32, duration: Duration) {
        if start != 0 && start < self.max_progress {
            self.set_progress(start);
        }
        if self.animation.is_some() {
            tracing::debug!("replacing running progress animation");
        }
        self.animation = Some(RunningTween::new(
            Tween::new(start as f32, end as f32, duration),
            end,
        ));
        tracing::info!(start, end, ?duration, "progress animation started");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_animation_start();
        }
    }

    /// Advances a running tween to `now`. Returns whether it is still running.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(running) = self.animation.as_mut() else {
            return false;
        };
        let elapsed = running.elapsed(now);
        let running = *running;

        if running.tween.is_finished(elapsed) {
            self.animation = None;
            let before = self.progress;
            self.set_progress(running.end);
            tracing::info!(progress = self.progress, "progress animation finished");
            if let Some(listener) = self.listener.as_mut() {
                if self.progress != before {
                    listener.on_animation_progress(self.progress);
                }
                listener.on_animation_finish();
            }
            return false;
        }

        if self.set_progress_from_tween(running.tween.value_at(elapsed)) {
            if let Some(listener) = self.listener.as_mut() {
                listener.on_animation_progress(self.progress);
            }
        }
        true
    }

    /// Stops a running tween where it is, without a finish callback.
    pub fn cancel_animation(&mut self) {
        if self.animation.take().is_some() {
            tracing::debug!(progress = self.progress, "progress animation cancelled");
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    // ------------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------------

    pub fn progress(&self) -> i32 {
        self.progress
    }

    pub fn max_progress(&self) -> i32 {
        self.max_progress
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn start_thumb(&self) -> (f32, f32) {
        self.start_thumb
    }

    /// End thumb position from the last draw with thumbs enabled.
    pub fn end_thumb(&self) -> (f32, f32) {
        self.end_thumb
    }

    pub fn has_gradient(&self) -> bool {
        self.gradient.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::f64::consts::{FRAC_PI_2, TAU};
    use std::rc::Rc;

    /// Each glyph advances one em; ascent 3/4 em, descent 1/4 em.
    struct FixedMetrics;

    impl TextMetrics for FixedMetrics {
        fn advance_width(&self, text: &str, font_size: f32) -> f32 {
            text.chars().count() as f32 * font_size
        }

        fn ascent(&self, font_size: f32) -> f32 {
            -font_size * 0.75
        }

        fn descent(&self, font_size: f32) -> f32 {
            font_size * 0.25
        }
    }

    fn laid_out(config: &ProgressBarConfig, width: u32, height: u32) -> CircularProgressBar {
        let mut bar = CircularProgressBar::new(config);
        bar.layout(width, height);
        bar
    }

    fn record(bar: &mut CircularProgressBar) -> Vec<DrawCommand> {
        let mut scene = Scene::new();
        bar.draw(&mut scene, &FixedMetrics);
        scene.commands().to_vec()
    }

    fn arcs(commands: &[DrawCommand]) -> Vec<(f64, f64, Paint, StrokeCap)> {
        commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Arc {
                    start_angle,
                    arc_span,
                    paint,
                    cap,
                    ..
                } => Some((*start_angle, *arc_span, *paint, *cap)),
                _ => None,
            })
            .collect()
    }

    fn circles(commands: &[DrawCommand]) -> Vec<(f32, f32, f32, Paint)> {
        commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Circle {
                    cx,
                    cy,
                    radius,
                    paint,
                } => Some((*cx, *cy, *radius, *paint)),
                _ => None,
            })
            .collect()
    }

    fn texts(commands: &[DrawCommand]) -> Vec<(i32, i32, String, f32)> {
        commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text {
                    x,
                    baseline,
                    text,
                    font_size,
                    ..
                } => Some((*x, *baseline, text.clone(), *font_size)),
                _ => None,
            })
            .collect()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Start,
        Progress(i32),
        Finish,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Event>>>);

    impl ProgressAnimationListener for Recorder {
        fn on_animation_start(&mut self) {
            self.0.borrow_mut().push(Event::Start);
        }

        fn on_animation_finish(&mut self) {
            self.0.borrow_mut().push(Event::Finish);
        }

        fn on_animation_progress(&mut self, progress: i32) {
            self.0.borrow_mut().push(Event::Progress(progress));
        }
    }

    #[test]
    fn set_progress_clamps_to_range() {
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        for (input, expected) in [
            (-50, 0),
            (-1, 0),
            (0, 0),
            (42, 42),
            (100, 100),
            (101, 100),
            (i32::MAX, 100),
            (i32::MIN, 0),
        ] {
            bar.set_progress(input);
            assert_eq!(bar.progress(), expected, "input {input}");
        }
    }

    #[test]
    fn initial_progress_is_clamped() {
        let config = ProgressBarConfig::builder().progress(500).build();
        assert_eq!(CircularProgressBar::new(&config).progress(), 100);
    }

    #[test]
    fn tween_setter_skips_unchanged_values() {
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.set_progress(10);
        assert!(bar.take_redraw_request());

        assert!(!bar.set_progress_from_tween(10.9));
        assert!(!bar.needs_redraw());

        assert!(bar.set_progress_from_tween(11.2));
        assert_eq!(bar.progress(), 11);
        assert!(bar.needs_redraw());
    }

    #[test]
    fn mutators_request_redraw() {
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.take_redraw_request();

        bar.set_title("Upload");
        assert!(bar.take_redraw_request());
        bar.set_subtitle("3 of 4");
        assert!(bar.take_redraw_request());
        bar.set_title_color(Color::rgb(1, 2, 3));
        assert!(bar.take_redraw_request());
        bar.set_subtitle_color(Color::rgb(4, 5, 6));
        assert!(bar.take_redraw_request());
        assert!(!bar.take_redraw_request());

        assert_eq!(bar.title(), "Upload");
        assert_eq!(bar.subtitle(), "3 of 4");
    }

    #[test]
    fn draw_consumes_redraw_request() {
        let mut bar = laid_out(&ProgressBarConfig::default(), 100, 100);
        assert!(bar.needs_redraw());
        record(&mut bar);
        assert!(!bar.needs_redraw());
    }

    #[test]
    fn max_progress_change_reclamps() {
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.set_progress(80);
        bar.set_max_progress(50);
        assert_eq!(bar.progress(), 50);
        bar.set_max_progress(-3);
        assert_eq!(bar.max_progress(), 0);
        assert_eq!(bar.progress(), 0);
    }

    #[test]
    fn negative_max_progress_falls_back_to_zero() {
        let config = ProgressBarConfig::builder().max_progress(-10).progress(5).build();
        let bar = CircularProgressBar::new(&config);
        assert_eq!(bar.max_progress(), 0);
        assert_eq!(bar.progress(), 0);
    }

    #[test]
    fn layout_insets_square_by_twelve_percent() {
        let bar = laid_out(&ProgressBarConfig::default(), 200, 200);
        assert_eq!(bar.padding(), 24.0);
        assert_eq!(
            bar.bounds(),
            Bounds {
                left: 24.0,
                top: 24.0,
                right: 176.0,
                bottom: 176.0
            }
        );
        let (x, y) = bar.start_thumb();
        assert!(close(x, 176.0) && close(y, 100.0));
    }

    #[test]
    fn layout_centers_square_in_wide_box() {
        let config = ProgressBarConfig::builder().start_angle(270).build();
        let bar = laid_out(&config, 300, 200);
        let bounds = bar.bounds();
        assert_eq!(bounds.width(), 152.0);
        assert_eq!(bounds.height(), 152.0);
        assert_eq!(bounds.center_x(), 150.0);
        assert_eq!(bounds.center_y(), 100.0);
        // 270° is 12 o'clock
        let (x, y) = bar.start_thumb();
        assert!(close(x, 150.0) && close(y, 24.0));
    }

    #[test]
    fn default_widget_draws_full_track_and_empty_progress() {
        let mut bar = laid_out(&ProgressBarConfig::default(), 200, 200);
        let commands = record(&mut bar);
        let arcs = arcs(&commands);
        assert_eq!(arcs.len(), 2);

        let (track_start, track_span, track_paint, cap) = arcs[0];
        assert_eq!(track_start, 0.0);
        assert!((track_span - TAU).abs() < 1e-9);
        assert_eq!(track_paint, Paint::Solid(Theme::TRACK));
        assert_eq!(cap, StrokeCap::Butt);

        let (_, progress_span, progress_paint, _) = arcs[1];
        assert_eq!(progress_span, 0.0);
        assert_eq!(progress_paint, Paint::Solid(Theme::PROGRESS));

        assert!(circles(&commands).is_empty());
        assert!(texts(&commands).is_empty());
    }

    #[test]
    fn quarter_progress_sweeps_ninety_degrees() {
        let config = ProgressBarConfig::builder().start_angle(270).build();
        let mut bar = laid_out(&config, 200, 200);
        bar.set_progress(25);
        assert_eq!(bar.progress_sweep(), 90.0);

        let arcs = arcs(&record(&mut bar));
        let (start, span, _, _) = arcs[1];
        assert!((start - 270f64.to_radians()).abs() < 1e-9);
        assert!((span - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn zero_max_progress_draws_empty_arc() {
        let config = ProgressBarConfig::builder()
            .max_progress(0)
            .progress(40)
            .build();
        let mut bar = laid_out(&config, 200, 200);
        bar.set_progress(70);
        assert_eq!(bar.progress_sweep(), 0.0);
        let arcs = arcs(&record(&mut bar));
        assert_eq!(arcs[1].1, 0.0);
    }

    #[test]
    fn disabled_hides_progress_and_parks_thumbs_at_track_end() {
        let config = ProgressBarConfig::builder()
            .enabled(false)
            .thumb_enabled(true)
            .sweep_angle(180)
            .progress(30)
            .thumb_color(Color::rgb(9, 9, 9))
            .build();
        let mut bar = laid_out(&config, 200, 200);
        let commands = record(&mut bar);

        assert_eq!(arcs(&commands).len(), 1, "only the track is stroked");
        let thumbs = circles(&commands);
        assert_eq!(thumbs.len(), 2);
        for (_, _, radius, paint) in &thumbs {
            assert_eq!(*radius, 20.0);
            assert_eq!(*paint, Paint::Solid(Theme::TRACK));
        }
        // start at 0° (3 o'clock), end at 180° (9 o'clock)
        assert!(close(thumbs[0].0, 176.0) && close(thumbs[0].1, 100.0));
        assert!(close(thumbs[1].0, 24.0) && close(thumbs[1].1, 100.0));

        // re-enabling restores the configured thumb color
        bar.set_enabled(true);
        let commands = record(&mut bar);
        assert_eq!(arcs(&commands).len(), 2);
        assert_eq!(circles(&commands)[0].3, Paint::Solid(Color::rgb(9, 9, 9)));
    }

    #[test]
    fn thumbs_follow_progress() {
        let config = ProgressBarConfig::builder().thumb_enabled(true).build();
        let mut bar = laid_out(&config, 200, 200);
        bar.set_progress(25);
        let thumbs = circles(&record(&mut bar));
        assert!(close(thumbs[0].0, 176.0) && close(thumbs[0].1, 100.0));
        assert!(close(thumbs[1].0, 100.0) && close(thumbs[1].1, 176.0));
        assert_eq!(bar.end_thumb(), (thumbs[1].0, thumbs[1].1));
    }

    #[test]
    fn thumb_radius_scales_with_density() {
        let config = ProgressBarConfig::builder()
            .thumb_enabled(true)
            .density(2.0)
            .build();
        let mut bar = laid_out(&config, 400, 400);
        let commands = record(&mut bar);
        assert_eq!(circles(&commands)[0].2, 40.0);
        match &commands[0] {
            DrawCommand::Arc { stroke_width, .. } => assert_eq!(*stroke_width, 40.0),
            other => panic!("expected track arc first, got {other:?}"),
        }
    }

    #[test]
    fn background_is_painted_first() {
        let config = ProgressBarConfig::builder()
            .draw_background(true)
            .background_color(Color::rgba(0, 0, 0, 0x40))
            .build();
        let mut bar = laid_out(&config, 200, 100);
        let commands = record(&mut bar);
        assert_eq!(
            commands[0],
            DrawCommand::Circle {
                cx: 100.0,
                cy: 50.0,
                radius: 100.0,
                paint: Paint::Solid(Color::rgba(0, 0, 0, 0x40)),
            }
        );
        assert!(matches!(commands[1], DrawCommand::Arc { .. }));
    }

    #[test]
    fn round_corners_apply_to_both_arcs() {
        let config = ProgressBarConfig::builder().round_corners(true).build();
        let mut bar = laid_out(&config, 200, 200);
        bar.set_progress(50);
        let arcs = arcs(&record(&mut bar));
        assert!(arcs.iter().all(|(_, _, _, cap)| *cap == StrokeCap::Round));
    }

    #[test]
    fn gradient_replaces_solid_paints_when_both_colors_set() {
        let config = ProgressBarConfig::builder()
            .gradient_color_start("#ff0000")
            .gradient_color_end("#0000ff")
            .build();
        let mut bar = laid_out(&config, 200, 200);
        assert!(bar.has_gradient());
        let arcs = arcs(&record(&mut bar));
        match (arcs[0].2, arcs[1].2) {
            (Paint::Linear(track), Paint::Linear(progress)) => {
                assert_eq!(track.start, Theme::WHITE);
                assert_eq!(track.end, Color::rgb(0, 0, 0xff));
                assert_eq!(progress.start, Color::rgb(0xff, 0, 0));
                assert_eq!(progress.end, Color::rgb(0, 0, 0xff));
                assert_eq!((progress.x0, progress.y0), (96.0, 84.0));
                assert_eq!((progress.x1, progress.y1), (176.0, 176.0 / 1.5));
            }
            other => panic!("expected gradients, got {other:?}"),
        }
    }

    #[test]
    fn single_gradient_color_keeps_solid_paints() {
        let config = ProgressBarConfig::builder()
            .gradient_color_end("#0000ff")
            .build();
        let mut bar = laid_out(&config, 200, 200);
        assert!(!bar.has_gradient());
        let arcs = arcs(&record(&mut bar));
        assert_eq!(arcs[0].2, Paint::Solid(Theme::TRACK));
        assert_eq!(arcs[1].2, Paint::Solid(Theme::PROGRESS));
    }

    #[test]
    fn malformed_gradient_falls_back_to_solid_colors() {
        let config = ProgressBarConfig::builder()
            .gradient_color_start("#ff0000")
            .gradient_color_end("#12")
            .progress_color(Color::rgb(1, 2, 3))
            .build();
        let mut bar = laid_out(&config, 200, 200);
        assert!(!bar.has_gradient());
        let arcs = arcs(&record(&mut bar));
        assert_eq!(arcs[1].2, Paint::Solid(Color::rgb(1, 2, 3)));
    }

    #[test]
    fn title_alone_is_vertically_centered() {
        let config = ProgressBarConfig::builder()
            .title("50%")
            .title_size(40.0)
            .build();
        let mut bar = laid_out(&config, 200, 200);
        let texts = texts(&record(&mut bar));
        // 3 glyphs * 40px = 120 wide, glyph height |-30 + 10| = 20
        assert_eq!(texts, vec![(40, 110, "50%".to_string(), 40.0)]);
    }

    #[test]
    fn subtitle_sits_below_title() {
        let config = ProgressBarConfig::builder()
            .title("50%")
            .title_size(40.0)
            .subtitle("done")
            .subtitle_size(10.0)
            .build();
        let mut bar = laid_out(&config, 200, 200);
        let texts = texts(&record(&mut bar));
        assert_eq!(
            texts,
            vec![
                (40, 100, "50%".to_string(), 40.0),
                (80, 126, "done".to_string(), 10.0),
            ]
        );
    }

    #[test]
    fn subtitle_without_title_is_not_drawn() {
        let config = ProgressBarConfig::builder().subtitle("orphan").build();
        let mut bar = laid_out(&config, 200, 200);
        assert!(texts(&record(&mut bar)).is_empty());
    }

    #[test]
    fn text_sizes_follow_font_scale() {
        let config = ProgressBarConfig::builder()
            .title("x")
            .font_scale(1.5)
            .build();
        let mut bar = laid_out(&config, 200, 200);
        assert_eq!(texts(&record(&mut bar))[0].3, 90.0);
    }

    #[test]
    fn animation_lands_exactly_on_end() {
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.animate_progress_to(10, 73);
        assert_eq!(bar.progress(), 10);
        assert!(bar.is_animating());

        assert!(bar.tick(Instant::now()));
        let progress = bar.progress();
        assert!((10..73).contains(&progress));

        assert!(!bar.tick(Instant::now() + Duration::from_secs(2)));
        assert_eq!(bar.progress(), 73);
        assert!(!bar.is_animating());
        assert!(!bar.tick(Instant::now() + Duration::from_secs(3)));
    }

    #[test]
    fn animation_start_of_zero_does_not_jump() {
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.set_progress(60);
        bar.animate_progress_to(0, 20);
        assert_eq!(bar.progress(), 60);
        let first = Instant::now();
        bar.tick(first);
        bar.tick(first + Duration::from_secs(1));
        assert_eq!(bar.progress(), 20);
    }

    #[test]
    fn animation_clock_starts_at_first_tick() {
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.animate_progress_to(0, 100);

        // a slow first frame does not eat into the tween
        let first = Instant::now() + Duration::from_secs(5);
        assert!(bar.tick(first));
        assert_eq!(bar.progress(), 0);

        assert!(bar.tick(first + Duration::from_millis(500)));
        assert!((49..=50).contains(&bar.progress()));

        assert!(!bar.tick(first + Duration::from_millis(1000)));
        assert_eq!(bar.progress(), 100);
    }

    #[test]
    fn out_of_range_tween_is_silent_once_clamped() {
        let recorder = Recorder::default();
        let events = recorder.0.clone();
        let config = ProgressBarConfig::builder().progress(100).build();
        let mut bar = CircularProgressBar::new(&config);
        bar.set_animation_listener(recorder);

        bar.animate_progress_to(150, 200);
        bar.take_redraw_request();
        let first = Instant::now();
        for millis in [0, 100, 200, 300, 400] {
            assert!(bar.tick(first + Duration::from_millis(millis)));
            assert_eq!(bar.progress(), 100);
            assert!(!bar.take_redraw_request(), "tick at {millis}ms");
        }
        assert!(!bar.tick(first + Duration::from_secs(2)));
        assert_eq!(bar.progress(), 100);
        assert_eq!(*events.borrow(), vec![Event::Start, Event::Finish]);
    }

    #[test]
    fn tween_below_zero_clamps_without_repeating() {
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.take_redraw_request();
        assert!(!bar.set_progress_from_tween(-12.5));
        assert!(!bar.needs_redraw());
        assert_eq!(bar.progress(), 0);
    }

    #[test]
    fn listener_sees_start_progress_and_finish() {
        let recorder = Recorder::default();
        let events = recorder.0.clone();
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.set_animation_listener(recorder);

        bar.animate_progress_with_duration(0, 100, Duration::ZERO);
        bar.tick(Instant::now());

        assert_eq!(
            *events.borrow(),
            vec![Event::Start, Event::Progress(100), Event::Finish]
        );
    }

    #[test]
    fn replacing_or_cancelling_an_animation_skips_finish() {
        let recorder = Recorder::default();
        let events = recorder.0.clone();
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.set_animation_listener(recorder);

        bar.animate_progress_to(5, 50);
        bar.animate_progress_to(5, 90);
        bar.cancel_animation();
        assert!(!bar.is_animating());
        assert!(!bar.tick(Instant::now() + Duration::from_secs(5)));
        assert_eq!(bar.progress(), 5);
        assert_eq!(*events.borrow(), vec![Event::Start, Event::Start]);
    }

    #[test]
    fn commands_route_to_mutators() {
        let mut bar = CircularProgressBar::new(&ProgressBarConfig::default());
        bar.apply(ProgressCommand::SetProgress(33));
        bar.apply(ProgressCommand::SetTitle("copy".into()));
        bar.apply(ProgressCommand::SetSubtitle("1 file".into()));
        bar.apply(ProgressCommand::SetEnabled(false));
        bar.apply(ProgressCommand::SetMaxProgress(20));
        assert_eq!(bar.progress(), 20);
        assert_eq!(bar.title(), "copy");
        assert_eq!(bar.subtitle(), "1 file");
        assert!(!bar.is_enabled());

        bar.apply(ProgressCommand::AnimateTo { start: 2, end: 8 });
        assert!(bar.is_animating());
        let first = Instant::now();
        bar.tick(first);
        bar.tick(first + Duration::from_secs(2));
        assert_eq!(bar.progress(), 8);
    }

    #[test]
    fn rasterized_frame_shows_progress_over_track() {
        let config = ProgressBarConfig::builder().progress(25).build();
        let mut bar = laid_out(&config, 200, 200);
        let mut scene = Scene::new();
        scene.add_command(DrawCommand::Clear(Theme::WHITE));
        bar.draw(&mut scene, &NoText);

        let mut frame = vec![0u8; 200 * 200 * 4];
        let mut canvas = Canvas::new(&mut frame, 200, 200);
        scene.render(&mut canvas, None);

        // 45° lies on the progress arc, 180° only on the track
        assert_eq!(canvas.pixel(153, 153), Some(Theme::PROGRESS));
        assert_eq!(canvas.pixel(24, 100), Some(Theme::TRACK));
        assert_eq!(canvas.pixel(100, 100), Some(Theme::WHITE));
    }
}
