use alloc::vec::Vec;

/// A single scalar tween sampled against a frame timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub start_ms: f64,
    /// Time between `start_ms` and the first interpolated frame; `from` is held until then.
    pub delay_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, start_ms: f64, duration_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            start_ms,
            delay_ms: 0.0,
            duration_ms: duration_ms.max(1.0),
            easing,
        }
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    fn progress(&self, now_ms: f64) -> f32 {
        let elapsed = now_ms - self.start_ms - self.delay_ms;
        (elapsed / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn is_done(&self, now_ms: f64) -> bool {
        now_ms - self.start_ms - self.delay_ms >= self.duration_ms
    }

    pub fn sample(&self, now_ms: f64) -> f32 {
        let eased = self.easing.sample(self.progress(now_ms));
        self.from + (self.to - self.from) * eased
    }

    pub fn retarget(&mut self, now_ms: f64, new_to: f32, duration_ms: f64) {
        let cur = self.sample(now_ms);
        *self = Self::new(cur, new_to, now_ms, duration_ms, self.easing);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    SmoothStep,
    EaseInOutCubic,
    EaseOutCubic,
    EaseOutExpo,
}

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
            Self::EaseOutCubic => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
            Self::EaseOutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
        }
    }
}

/// The animated property of a tween's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Property {
    Opacity,
    Scale,
    TranslateY,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TweenId {
    slot: u32,
    generation: u32,
}

/// One sampled value, handed to the owner during [`TweenScheduler::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenUpdate {
    pub id: TweenId,
    pub owner: usize,
    pub property: Property,
    pub value: f32,
    /// `true` on the final sample; the tween is gone after this update.
    pub finished: bool,
}

/// "Animate property P of owner O from A to B over D with easing E".
///
/// Owners are small integers chosen by the caller (a pool slot, a registration index). At most
/// one tween exists per `(owner, property)`: starting another replaces it.
pub trait TweenScheduler {
    fn start(&mut self, owner: usize, property: Property, tween: Tween) -> TweenId;
    fn cancel(&mut self, id: TweenId) -> bool;
    /// Cancels every tween of `owner`, returning how many were stopped.
    fn cancel_owner(&mut self, owner: usize) -> usize;
    fn advance(&mut self, now_ms: f64, apply: &mut dyn FnMut(TweenUpdate));
    fn active_count(&self) -> usize;
    /// Forcibly stops everything (no final update is delivered).
    fn clear(&mut self) -> usize;
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    id: TweenId,
    owner: usize,
    property: Property,
    tween: Tween,
}

/// Headless [`TweenScheduler`]: a slot table sampled on every `advance`.
///
/// Freed slots are reused, so a steady workload stops allocating once the table has grown to
/// its peak size.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    entries: Vec<Option<Entry>>,
    generation: u32,
    active: usize,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    pub fn is_running(&self, id: TweenId) -> bool {
        matches!(
            self.entries.get(id.slot as usize),
            Some(Some(e)) if e.id == id
        )
    }

    /// The tween currently driving `(owner, property)`, if any.
    pub fn get(&self, owner: usize, property: Property) -> Option<&Tween> {
        self.entries
            .iter()
            .flatten()
            .find(|e| e.owner == owner && e.property == property)
            .map(|e| &e.tween)
    }

    fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

impl TweenScheduler for Timeline {
    fn start(&mut self, owner: usize, property: Property, tween: Tween) -> TweenId {
        let generation = self.next_generation();

        let existing = self
            .entries
            .iter()
            .position(|e| matches!(e, Some(e) if e.owner == owner && e.property == property));
        let slot = match existing {
            Some(slot) => slot,
            None => {
                self.active += 1;
                match self.entries.iter().position(Option::is_none) {
                    Some(slot) => slot,
                    None => {
                        self.entries.push(None);
                        self.entries.len() - 1
                    }
                }
            }
        };

        let id = TweenId {
            slot: slot as u32,
            generation,
        };
        self.entries[slot] = Some(Entry {
            id,
            owner,
            property,
            tween,
        });
        id
    }

    fn cancel(&mut self, id: TweenId) -> bool {
        let Some(e) = self.entries.get_mut(id.slot as usize) else {
            return false;
        };
        if !e.as_ref().is_some_and(|e| e.id == id) {
            return false;
        }
        *e = None;
        self.active -= 1;
        true
    }

    fn cancel_owner(&mut self, owner: usize) -> usize {
        let mut stopped = 0;
        for e in self.entries.iter_mut() {
            if e.as_ref().is_some_and(|e| e.owner == owner) {
                *e = None;
                stopped += 1;
            }
        }
        self.active -= stopped;
        stopped
    }

    fn advance(&mut self, now_ms: f64, apply: &mut dyn FnMut(TweenUpdate)) {
        for e in self.entries.iter_mut() {
            let Some(entry) = e else {
                continue;
            };
            let finished = entry.tween.is_done(now_ms);
            apply(TweenUpdate {
                id: entry.id,
                owner: entry.owner,
                property: entry.property,
                value: entry.tween.sample(now_ms),
                finished,
            });
            if finished {
                *e = None;
                self.active -= 1;
            }
        }
    }

    fn active_count(&self) -> usize {
        self.active
    }

    fn clear(&mut self) -> usize {
        let stopped = self.active;
        for e in self.entries.iter_mut() {
            *e = None;
        }
        self.active = 0;
        stopped
    }
}
