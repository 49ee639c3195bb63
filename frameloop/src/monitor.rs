use crate::MonitorOptions;

/// A development-time warning raised by [`Monitor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Diagnostic {
    LowFps { fps: f32 },
    TooManyRegistrations { live: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorSnapshot {
    /// FPS of the last completed window, if one has completed.
    pub fps: Option<f32>,
    pub live_registrations: usize,
    pub low_fps_warnings: u64,
    pub registration_warnings: u64,
}

/// Frame-rate and registration counters.
///
/// Purely observational: nothing else reads it to make decisions, so it can be left out
/// entirely (e.g. in production builds).
#[derive(Clone, Debug)]
pub struct Monitor {
    options: MonitorOptions,
    window_start: Option<f64>,
    frames: u32,
    fps: Option<f32>,
    live: usize,
    over_watermark: bool,
    low_fps_warnings: u64,
    registration_warnings: u64,
}

impl Monitor {
    pub fn new(options: MonitorOptions) -> Self {
        Self {
            options,
            window_start: None,
            frames: 0,
            fps: None,
            live: 0,
            over_watermark: false,
            low_fps_warnings: 0,
            registration_warnings: 0,
        }
    }

    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }

    /// Clears every counter.
    pub fn reset(&mut self) {
        *self = Self::new(self.options);
    }

    pub fn fps(&self) -> Option<f32> {
        self.fps
    }

    pub fn live_registrations(&self) -> usize {
        self.live
    }

    /// Call once per frame clock tick.
    ///
    /// FPS is evaluated over tumbling windows of `window_ms`: the count restarts each time a
    /// window closes, so a low frame rate warns at most once per window.
    pub fn sample_frame(&mut self, now_ms: f64) -> Option<Diagnostic> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now_ms);
            self.frames = 0;
            return None;
        };
        self.frames += 1;

        let elapsed = now_ms - start;
        if elapsed < self.options.window_ms || elapsed <= 0.0 {
            return None;
        }

        let fps = (self.frames as f64 * 1000.0 / elapsed) as f32;
        self.fps = Some(fps);
        self.window_start = Some(now_ms);
        self.frames = 0;

        if fps < self.options.low_fps_watermark {
            self.low_fps_warnings += 1;
            flwarn!(fps, "Monitor: frame rate below watermark");
            return Some(Diagnostic::LowFps { fps });
        }
        None
    }

    pub fn on_register(&mut self) -> Option<Diagnostic> {
        self.live += 1;
        if self.live > self.options.registration_high_watermark && !self.over_watermark {
            self.over_watermark = true;
            self.registration_warnings += 1;
            flwarn!(live = self.live, "Monitor: too many live viewport triggers");
            return Some(Diagnostic::TooManyRegistrations { live: self.live });
        }
        None
    }

    pub fn on_retire(&mut self) {
        self.live = self.live.saturating_sub(1);
        if self.live <= self.options.registration_high_watermark {
            self.over_watermark = false;
        }
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            fps: self.fps,
            live_registrations: self.live,
            low_fps_warnings: self.low_fps_warnings,
            registration_warnings: self.registration_warnings,
        }
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(MonitorOptions::default())
    }
}
