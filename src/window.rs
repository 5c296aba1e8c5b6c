use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::{Pixels, SurfaceTexture};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::{DisplayMetrics, ProgressBarConfig};
use crate::error::DisplayError;
use crate::render::{Canvas, DrawCommand, FontFace, NoText, Scene, TextMetrics};
use crate::{CircularProgressBar, ProgressCommand};

/// Hosts a progress bar in its own window.
pub struct ProgressWindow {
    bar: CircularProgressBar,
    config: ProgressBarConfig,
    font: Option<FontFace>,
}

impl ProgressWindow {
    pub fn new(bar: CircularProgressBar, config: ProgressBarConfig) -> Self {
        let font = load_font(&config);
        Self { bar, config, font }
    }

    pub fn show(self) -> Result<(), DisplayError> {
        self.run(None)
    }

    pub fn show_with_commands(self, receiver: Receiver<ProgressCommand>) -> Result<(), DisplayError> {
        self.run(Some(receiver))
    }

    fn run(self, receiver: Option<Receiver<ProgressCommand>>) -> Result<(), DisplayError> {
        let ProgressWindow {
            mut bar,
            config,
            font,
        } = self;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&config.window_title)
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)?;
        let window = Arc::new(window);

        let (density, font_scale, clear_color) = (config.density, config.font_scale, config.clear_color);
        let metrics_for = move |scale_factor: f64| DisplayMetrics {
            density: density * scale_factor as f32,
            font_scale,
        };
        bar.set_display_metrics(metrics_for(window.scale_factor()));

        let window_clone = window.clone();
        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;
        bar.layout(size.width, size.height);

        let frame_duration = Duration::from_secs_f64(1.0 / config.max_framerate.max(1.0));
        let mut last_frame = Instant::now();
        let mut scene = Scene::new();

        tracing::info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            "opened progress window"
        );

        event_loop.run(move |event, window_target| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if new_size.width == 0 || new_size.height == 0 {
                        return;
                    }
                    // The canvas must keep matching the buffer, so a failed
                    // resize leaves both at the old size.
                    if let Err(error) = pixels.resize_buffer(new_size.width, new_size.height) {
                        tracing::warn!(%error, "failed to resize pixel buffer, keeping old size");
                        return;
                    }
                    fb_width = new_size.width as usize;
                    fb_height = new_size.height as usize;
                    if let Err(error) = pixels.resize_surface(new_size.width, new_size.height) {
                        tracing::warn!(%error, "failed to resize surface");
                    }
                    bar.layout(new_size.width, new_size.height);
                }
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    bar.set_display_metrics(metrics_for(scale_factor));
                }
                WindowEvent::RedrawRequested => {
                    scene.clear();
                    scene.add_command(DrawCommand::Clear(clear_color));
                    let metrics: &dyn TextMetrics = match &font {
                        Some(font) => font,
                        None => &NoText,
                    };
                    bar.draw(&mut scene, metrics);

                    let mut canvas = Canvas::new(pixels.frame_mut(), fb_width, fb_height);
                    scene.render(&mut canvas, font.as_ref());
                    if let Err(error) = pixels.render() {
                        tracing::error!(%error, "failed to present frame");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if let Some(ref receiver) = receiver {
                    while let Ok(command) = receiver.try_recv() {
                        tracing::debug!(?command, "applying command");
                        bar.apply(command);
                    }
                }
                bar.tick(Instant::now());

                if bar.needs_redraw() && last_frame.elapsed() >= frame_duration {
                    window_clone.request_redraw();
                    last_frame = Instant::now();
                }
                // Commands arrive without waking the loop, so wake once per frame.
                window_target.set_control_flow(ControlFlow::WaitUntil(Instant::now() + frame_duration));
            }
            _ => {}
        })?;

        Ok(())
    }
}

/// Configured font, else the first system font found.
fn load_font(config: &ProgressBarConfig) -> Option<FontFace> {
    let configured = config.font_path.as_deref().and_then(|path| match FontFace::load(path) {
        Ok(font) => Some(font),
        Err(error) => {
            tracing::warn!(%error, "could not load configured font, trying system fonts");
            None
        }
    });
    let font = configured.or_else(FontFace::discover);
    match &font {
        Some(font) => tracing::info!(path = %font.path().display(), "using label font"),
        None => tracing::warn!("no usable font found, labels will not be drawn"),
    }
    font
}
