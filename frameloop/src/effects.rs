use alloc::boxed::Box;
use alloc::vec;
use core::f32::consts::TAU;

use crate::{
    EffectOptions, Lcg, Point, Property, RandomSource, Rgb, Timeline, Tween, TweenScheduler,
};

/// A reusable particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSlot {
    pub active: bool,
    pub position: Point,
    pub color: Rgb,
    pub opacity: f32,
    pub scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectVisual {
    pub slot: usize,
    pub position: Point,
    pub color: Rgb,
    pub opacity: f32,
    pub scale: f32,
}

/// Fixed-capacity pool of short-lived sparks emitted from the trail head.
///
/// Emission is gated by speed and by a coin flip per qualifying tick, which bounds the spawn
/// rate without a separate limiter. A spawn that finds no free slot is dropped; the pool
/// never grows and never queues.
#[derive(Debug)]
pub struct EffectPool<R = Lcg, S = Timeline> {
    options: EffectOptions,
    slots: Box<[EffectSlot]>,
    cursor: usize,
    active: usize,
    rng: R,
    scheduler: S,
    dropped: u64,
    disposed: bool,
}

impl EffectPool {
    pub fn new(options: EffectOptions) -> Self {
        let capacity = options.capacity;
        Self::with_parts(options, Lcg::default(), Timeline::with_capacity(capacity * 2))
    }
}

impl<R: RandomSource, S: TweenScheduler> EffectPool<R, S> {
    pub fn with_parts(options: EffectOptions, rng: R, scheduler: S) -> Self {
        fldebug!(capacity = options.capacity, "EffectPool::new");
        Self {
            slots: vec![EffectSlot::default(); options.capacity].into_boxed_slice(),
            options,
            cursor: 0,
            active: 0,
            rng,
            scheduler,
            dropped: 0,
            disposed: false,
        }
    }

    pub fn options(&self) -> &EffectOptions {
        &self.options
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Spawns that passed the gate but found the pool full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    pub fn slots(&self) -> &[EffectSlot] {
        &self.slots
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Maybe emits one effect near `origin`. Returns the slot used.
    pub fn maybe_spawn(&mut self, origin: Point, speed: f32, now_ms: f64) -> Option<usize> {
        if self.disposed || self.options.reduced_motion || self.slots.is_empty() {
            return None;
        }
        if !(speed > self.options.spark_threshold) {
            return None;
        }
        if self.rng.next_f32() >= self.options.spawn_probability {
            return None;
        }

        let capacity = self.slots.len();
        let Some(index) = (0..capacity)
            .map(|k| (self.cursor + k) % capacity)
            .find(|&i| !self.slots[i].active)
        else {
            self.dropped += 1;
            fltrace!(capacity, "EffectPool: full, spawn dropped");
            return None;
        };

        let angle = self.rng.next_f32() * TAU;
        let span = self.options.max_distance - self.options.min_distance;
        let distance = self.options.min_distance + self.rng.next_f32() * span;
        let offset = Point::new(angle.cos(), angle.sin()) * distance;

        let palette = &self.options.palette;
        let color = if palette.is_empty() {
            Rgb::default()
        } else {
            let pick = (self.rng.next_f32() * palette.len() as f32) as usize;
            palette[pick.min(palette.len() - 1)]
        };

        self.slots[index] = EffectSlot {
            active: true,
            position: origin + offset,
            color,
            opacity: 1.0,
            scale: 1.0,
        };
        let duration = self.options.duration_ms;
        let easing = self.options.easing;
        self.scheduler.start(
            index,
            Property::Opacity,
            Tween::new(1.0, 0.0, now_ms, duration, easing),
        );
        self.scheduler.start(
            index,
            Property::Scale,
            Tween::new(1.0, 0.0, now_ms, duration, easing),
        );

        self.cursor = (index + 1) % capacity;
        self.active += 1;
        Some(index)
    }

    /// Advances fade-outs; slots whose fade has completed become free.
    pub fn tick(&mut self, now_ms: f64) {
        if self.disposed {
            return;
        }
        let Self {
            scheduler,
            slots,
            active,
            ..
        } = self;
        scheduler.advance(now_ms, &mut |u| {
            let Some(slot) = slots.get_mut(u.owner) else {
                return;
            };
            match u.property {
                Property::Opacity => slot.opacity = u.value,
                Property::Scale => slot.scale = u.value,
                Property::TranslateY => {}
            }
            if u.finished && u.property == Property::Opacity && slot.active {
                slot.active = false;
                *active -= 1;
            }
        });
    }

    /// The visual for `slot`, or `None` when the slot is free.
    pub fn visual(&self, slot: usize) -> Option<EffectVisual> {
        let s = self.slots.get(slot).filter(|s| s.active)?;
        Some(EffectVisual {
            slot,
            position: s.position,
            color: s.color,
            opacity: s.opacity,
            scale: s.scale,
        })
    }

    pub fn for_each_active(&self, mut f: impl FnMut(EffectVisual)) {
        for slot in 0..self.slots.len() {
            if let Some(v) = self.visual(slot) {
                f(v);
            }
        }
    }

    /// Stops in-flight fades and clears every slot. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let _stopped = self.scheduler.clear();
        for s in self.slots.iter_mut() {
            *s = EffectSlot::default();
        }
        self.active = 0;
        self.disposed = true;
        fldebug!(stopped = _stopped, "EffectPool::dispose");
    }
}
