//! Tuning constants and per-component configuration.
//!
//! The constants are tuning values picked by eye on the promotion site; they have no
//! derivation beyond "looks right at 60 Hz".

use alloc::vec::Vec;

use crate::{Easing, Rgb};

pub const DEFAULT_SEGMENTS: usize = 20;
pub const HEAD_BASE_RATE: f32 = 0.35;
pub const HEAD_SPEED_SENSITIVITY: f32 = 0.01;
pub const HEAD_MAX_BOOST: f32 = 0.4;
pub const FOLLOW_FACTOR: f32 = 0.5;
/// Head speed (px/tick) above which the head turns to face its motion.
pub const ROTATION_SPEED_THRESHOLD: f32 = 0.5;
/// Follower vectors shorter than this (px) keep their previous rotation.
pub const ROTATION_NOISE_FLOOR: f32 = 0.1;
pub const HEAD_SIZE: f32 = 18.0;
pub const TAIL_SIZE_FLOOR: f32 = 0.2;
pub const TAIL_OPACITY_FLOOR: f32 = 0.1;
pub const FALLOFF_POWER: f32 = 1.5;

pub const DEFAULT_EFFECT_CAPACITY: usize = 16;
/// Head speed (px/tick) an effect needs before it can spawn.
pub const SPARK_SPEED_THRESHOLD: f32 = 8.0;
pub const SPAWN_PROBABILITY: f32 = 0.25;
pub const SPAWN_MIN_DISTANCE: f32 = 10.0;
pub const SPAWN_MAX_DISTANCE: f32 = 30.0;
pub const EFFECT_DURATION_MS: f64 = 600.0;
pub const EFFECT_PALETTE: [Rgb; 4] = [
    Rgb(0xFF4D6D),
    Rgb(0xFFD166),
    Rgb(0x06D6A0),
    Rgb(0x118AB2),
];

pub const SCROLL_SMOOTHING: f32 = 0.1;
pub const MIN_THUMB_RATIO: f32 = 0.1;
/// Distance (px) under which the smoothed offset snaps onto its target.
pub const SCROLL_SNAP_EPSILON: f32 = 0.5;

pub const DEFAULT_TRIGGER_THRESHOLD: f32 = 0.15;
pub const STAGGER_MS: f64 = 100.0;
pub const ENTRANCE_DURATION_MS: f64 = 800.0;
pub const ENTRANCE_OFFSET_Y: f32 = 40.0;

pub const FPS_WINDOW_MS: f64 = 1000.0;
pub const LOW_FPS_WATERMARK: f32 = 30.0;
pub const REGISTRATION_HIGH_WATERMARK: usize = 20;

/// Configuration for [`crate::ChainEngine`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChainOptions {
    pub segments: usize,
    pub base_rate: f32,
    pub sensitivity: f32,
    pub max_boost: f32,
    pub follow_factor: f32,
    pub rotation_speed_threshold: f32,
    pub rotation_noise_floor: f32,
    pub head_size: f32,
    /// Smallest tail size as a fraction of `head_size`.
    pub tail_size_floor: f32,
    pub tail_opacity_floor: f32,
    pub falloff_power: f32,
    /// Snap every segment onto the target each tick instead of interpolating.
    pub reduced_motion: bool,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            base_rate: HEAD_BASE_RATE,
            sensitivity: HEAD_SPEED_SENSITIVITY,
            max_boost: HEAD_MAX_BOOST,
            follow_factor: FOLLOW_FACTOR,
            rotation_speed_threshold: ROTATION_SPEED_THRESHOLD,
            rotation_noise_floor: ROTATION_NOISE_FLOOR,
            head_size: HEAD_SIZE,
            tail_size_floor: TAIL_SIZE_FLOOR,
            tail_opacity_floor: TAIL_OPACITY_FLOOR,
            falloff_power: FALLOFF_POWER,
            reduced_motion: false,
        }
    }
}

impl ChainOptions {
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_head_rate(mut self, base_rate: f32, sensitivity: f32, max_boost: f32) -> Self {
        self.base_rate = base_rate;
        self.sensitivity = sensitivity;
        self.max_boost = max_boost;
        self
    }

    pub fn with_follow_factor(mut self, follow_factor: f32) -> Self {
        self.follow_factor = follow_factor;
        self
    }

    pub fn with_falloff(mut self, head_size: f32, tail_size_floor: f32, power: f32) -> Self {
        self.head_size = head_size;
        self.tail_size_floor = tail_size_floor;
        self.falloff_power = power;
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }
}

/// Configuration for [`crate::EffectPool`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectOptions {
    pub capacity: usize,
    pub spark_threshold: f32,
    pub spawn_probability: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub duration_ms: f64,
    pub easing: Easing,
    pub palette: Vec<Rgb>,
    /// Suppress emission entirely (an effect's end state is "not visible").
    pub reduced_motion: bool,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EFFECT_CAPACITY,
            spark_threshold: SPARK_SPEED_THRESHOLD,
            spawn_probability: SPAWN_PROBABILITY,
            min_distance: SPAWN_MIN_DISTANCE,
            max_distance: SPAWN_MAX_DISTANCE,
            duration_ms: EFFECT_DURATION_MS,
            easing: Easing::EaseOutCubic,
            palette: EFFECT_PALETTE.to_vec(),
            reduced_motion: false,
        }
    }
}

impl EffectOptions {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_spawn_gate(mut self, spark_threshold: f32, spawn_probability: f32) -> Self {
        self.spark_threshold = spark_threshold;
        self.spawn_probability = spawn_probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_distance(mut self, min_distance: f32, max_distance: f32) -> Self {
        self.min_distance = min_distance.min(max_distance);
        self.max_distance = max_distance.max(min_distance);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_palette(mut self, palette: impl IntoIterator<Item = Rgb>) -> Self {
        self.palette = palette.into_iter().collect();
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }
}

/// Configuration for [`crate::ScrollCoordinator`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollOptions {
    /// Fraction of the remaining distance covered per tick, in `(0, 1]`.
    pub smoothing: f32,
    pub min_thumb_ratio: f32,
    pub snap_epsilon: f32,
    /// Forces `smoothing = 1`: the virtual offset always equals the native one.
    pub reduced_motion: bool,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            smoothing: SCROLL_SMOOTHING,
            min_thumb_ratio: MIN_THUMB_RATIO,
            snap_epsilon: SCROLL_SNAP_EPSILON,
            reduced_motion: false,
        }
    }
}

impl ScrollOptions {
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_min_thumb_ratio(mut self, ratio: f32) -> Self {
        self.min_thumb_ratio = ratio;
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    pub(crate) fn effective_smoothing(&self) -> f32 {
        if self.reduced_motion {
            1.0
        } else if self.smoothing.is_finite() {
            self.smoothing.clamp(f32::EPSILON, 1.0)
        } else {
            SCROLL_SMOOTHING
        }
    }
}

/// Configuration for [`crate::TriggerDispatcher`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatcherOptions {
    pub stagger_ms: f64,
    pub entrance_duration_ms: f64,
    pub entrance_offset_y: f32,
    pub easing: Easing,
    /// Entrances jump to their end state with no stagger.
    pub reduced_motion: bool,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            stagger_ms: STAGGER_MS,
            entrance_duration_ms: ENTRANCE_DURATION_MS,
            entrance_offset_y: ENTRANCE_OFFSET_Y,
            easing: Easing::EaseOutCubic,
            reduced_motion: false,
        }
    }
}

impl DispatcherOptions {
    pub fn with_stagger_ms(mut self, stagger_ms: f64) -> Self {
        self.stagger_ms = stagger_ms.max(0.0);
        self
    }

    pub fn with_entrance(mut self, duration_ms: f64, offset_y: f32, easing: Easing) -> Self {
        self.entrance_duration_ms = duration_ms;
        self.entrance_offset_y = offset_y;
        self.easing = easing;
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }
}

/// Configuration for [`crate::Monitor`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonitorOptions {
    pub window_ms: f64,
    pub low_fps_watermark: f32,
    pub registration_high_watermark: usize,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            window_ms: FPS_WINDOW_MS,
            low_fps_watermark: LOW_FPS_WATERMARK,
            registration_high_watermark: REGISTRATION_HIGH_WATERMARK,
        }
    }
}

impl MonitorOptions {
    pub fn with_low_fps_watermark(mut self, fps: f32) -> Self {
        self.low_fps_watermark = fps;
        self
    }

    pub fn with_registration_high_watermark(mut self, count: usize) -> Self {
        self.registration_high_watermark = count;
        self
    }
}
