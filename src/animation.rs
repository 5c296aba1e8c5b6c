use std::time::{Duration, Instant};

pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(1000);

/// Callbacks for a running progress animation.
pub trait ProgressAnimationListener {
    fn on_animation_start(&mut self) {}
    fn on_animation_finish(&mut self) {}
    fn on_animation_progress(&mut self, _progress: i32) {}
}

/// Linear interpolation of a value over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self { from, to, duration }
    }

    pub fn value_at(&self, elapsed: Duration) -> f32 {
        if self.is_finished(elapsed) {
            return self.to;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// A tween anchored to the first frame that samples it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RunningTween {
    pub tween: Tween,
    pub started_at: Option<Instant>,
    pub end: i32,
}

impl RunningTween {
    pub fn new(tween: Tween, end: i32) -> Self {
        Self {
            tween,
            started_at: None,
            end,
        }
    }

    /// Time since the first call; that call anchors the tween at `now`.
    pub fn elapsed(&mut self, now: Instant) -> Duration {
        let started_at = *self.started_at.get_or_insert(now);
        now.saturating_duration_since(started_at)
    }
}
