use crate::{ScrollOptions, lerp};

/// Size and position of the scrollbar thumb, both in percent of the track.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollbarThumb {
    pub height_pct: f32,
    /// `translateY` of the thumb; `height_pct + translate_pct <= 100`.
    pub translate_pct: f32,
    /// Scroll progress in `[0, 1]`.
    pub progress: f32,
}

impl ScrollbarThumb {
    pub const FULL: Self = Self {
        height_pct: 100.0,
        translate_pct: 0.0,
        progress: 0.0,
    };
}

/// A serializable snapshot of the virtual scroll state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub target: f32,
    pub current: f32,
    pub viewport_height: f32,
    pub content_height: f32,
}

/// Output of one scroll tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollFrame {
    /// Translate to apply to the page content (`-current`).
    pub content_offset: f32,
    /// Present only on frames where the indicator was recomputed.
    pub thumb: Option<ScrollbarThumb>,
}

/// Smooth-scrolling coordinator.
///
/// Native scroll input sets the target with no damping; the virtual (rendered) offset eases
/// toward it once per tick. The scrollbar indicator is recomputed at most once per frame, and
/// only when something it depends on changed since the last frame.
#[derive(Clone, Debug)]
pub struct ScrollCoordinator {
    options: ScrollOptions,
    target: f32,
    current: f32,
    viewport_height: f32,
    content_height: f32,
    thumb: ScrollbarThumb,
    indicator_dirty: bool,
    indicator_updates: u64,
    disposed: bool,
}

impl ScrollCoordinator {
    pub fn new(options: ScrollOptions) -> Self {
        fldebug!(smoothing = options.smoothing, "ScrollCoordinator::new");
        Self {
            options,
            target: 0.0,
            current: 0.0,
            viewport_height: 0.0,
            content_height: 0.0,
            thumb: ScrollbarThumb::FULL,
            indicator_dirty: true,
            indicator_updates: 0,
            disposed: false,
        }
    }

    pub fn options(&self) -> &ScrollOptions {
        &self.options
    }

    /// Largest reachable offset; `0` when the content fits in the viewport.
    pub fn max_scroll(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    pub fn target_offset(&self) -> f32 {
        self.target
    }

    /// The smoothed offset the page is rendered at.
    pub fn virtual_offset(&self) -> f32 {
        self.current
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    /// The most recently computed indicator.
    pub fn thumb(&self) -> ScrollbarThumb {
        self.thumb
    }

    /// How many times the indicator has been recomputed.
    pub fn indicator_updates(&self) -> u64 {
        self.indicator_updates
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    fn clamp(&self, offset: f32) -> f32 {
        if offset.is_finite() {
            offset.clamp(0.0, self.max_scroll())
        } else {
            0.0
        }
    }

    fn request_indicator(&mut self) {
        if self.indicator_dirty {
            fltrace!("ScrollCoordinator: indicator update coalesced");
        }
        self.indicator_dirty = true;
    }

    /// Native scroll event: the target follows immediately.
    pub fn on_scroll(&mut self, offset: f32) {
        if self.disposed {
            return;
        }
        self.target = self.clamp(offset);
        if self.options.reduced_motion {
            self.current = self.target;
        }
        self.request_indicator();
    }

    /// Viewport or content size change. Offsets are re-clamped right away so the next tick
    /// sees consistent metrics.
    pub fn on_resize(&mut self, viewport_height: f32, content_height: f32) {
        if self.disposed {
            return;
        }
        self.viewport_height = if viewport_height.is_finite() {
            viewport_height.max(0.0)
        } else {
            0.0
        };
        self.content_height = if content_height.is_finite() {
            content_height.max(0.0)
        } else {
            0.0
        };
        self.target = self.clamp(self.target);
        self.current = self.clamp(self.current);
        self.request_indicator();
    }

    /// Programmatic damped scroll.
    pub fn scroll_to(&mut self, offset: f32) {
        self.on_scroll(offset);
    }

    /// Programmatic instant scroll: the virtual offset lands on the target this call.
    pub fn jump_to(&mut self, offset: f32) {
        if self.disposed {
            return;
        }
        self.target = self.clamp(offset);
        self.current = self.target;
        self.request_indicator();
    }

    /// Computes the indicator for the current virtual offset without touching state.
    pub fn compute_thumb(&self) -> ScrollbarThumb {
        let max = self.max_scroll();
        if max <= 0.0 || self.content_height <= 0.0 {
            return ScrollbarThumb::FULL;
        }
        let ratio = (self.viewport_height / self.content_height)
            .max(self.options.min_thumb_ratio)
            .min(1.0);
        let height_pct = ratio * 100.0;
        let progress = (self.current / max).clamp(0.0, 1.0);
        ScrollbarThumb {
            height_pct,
            translate_pct: progress * (100.0 - height_pct),
            progress,
        }
    }

    /// Eases the virtual offset one step and, if requested since the last frame, recomputes
    /// the indicator. Returns `None` once disposed.
    pub fn tick(&mut self) -> Option<ScrollFrame> {
        if self.disposed {
            return None;
        }

        if self.current != self.target {
            let next = lerp(self.current, self.target, self.options.effective_smoothing());
            self.current = if (self.target - next).abs() < self.options.snap_epsilon {
                self.target
            } else {
                next
            };
            self.current = self.clamp(self.current);
            self.indicator_dirty = true;
        }

        let thumb = if self.indicator_dirty {
            self.indicator_dirty = false;
            self.indicator_updates += 1;
            self.thumb = self.compute_thumb();
            Some(self.thumb)
        } else {
            None
        };

        Some(ScrollFrame {
            content_offset: -self.current,
            thumb,
        })
    }

    pub fn state(&self) -> ScrollState {
        ScrollState {
            target: self.target,
            current: self.current,
            viewport_height: self.viewport_height,
            content_height: self.content_height,
        }
    }

    /// Restores a snapshot, e.g. when returning to a page after a client-side transition.
    pub fn restore_state(&mut self, state: ScrollState) {
        if self.disposed {
            return;
        }
        self.on_resize(state.viewport_height, state.content_height);
        self.target = self.clamp(state.target);
        self.current = self.clamp(state.current);
        if self.options.reduced_motion {
            self.current = self.target;
        }
    }

    /// Stops all further updates. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.indicator_dirty = false;
        fldebug!("ScrollCoordinator::dispose");
    }
}
