use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::options::DEFAULT_TRIGGER_THRESHOLD;
use crate::{
    DispatcherOptions, ElementId, Property, Timeline, Tween, TweenScheduler, VisibilityObserver,
};

/// Lifecycle of a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerState {
    /// Waiting for the element to cross its threshold.
    Armed,
    /// Entered; a reversible registration re-arms when the element leaves.
    Fired,
    /// A `once` registration that has fired. Terminal.
    Retired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegistrationId {
    slot: u32,
    generation: u32,
}

/// What the host observed for one element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Visibility {
    /// Intersecting the viewport with the given intersection ratio in `[0, 1]`.
    Intersecting(f32),
    Outside,
    /// The element is no longer in the document.
    Detached,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub element: ElementId,
    pub visibility: Visibility,
}

impl Intersection {
    pub fn visible(element: ElementId, ratio: f32) -> Self {
        Self {
            element,
            visibility: Visibility::Intersecting(ratio),
        }
    }

    pub fn outside(element: ElementId) -> Self {
        Self {
            element,
            visibility: Visibility::Outside,
        }
    }

    pub fn detached(element: ElementId) -> Self {
        Self {
            element,
            visibility: Visibility::Detached,
        }
    }
}

/// Delivered to `on_enter` for each member of a batch, in document order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnterEvent {
    pub id: RegistrationId,
    pub element: ElementId,
    pub batch_index: usize,
    pub batch_len: usize,
    /// Stagger applied to this member's entrance animation.
    pub delay_ms: f64,
}

/// Current visual state of a registration's entrance animation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntranceState {
    pub opacity: f32,
    pub translate_y: f32,
}

impl EntranceState {
    pub const VISIBLE: Self = Self {
        opacity: 1.0,
        translate_y: 0.0,
    };

    pub fn hidden(offset_y: f32) -> Self {
        Self {
            opacity: 0.0,
            translate_y: offset_y,
        }
    }
}

pub type EnterCallback = Box<dyn FnMut(&EnterEvent)>;
pub type LeaveCallback = Box<dyn FnMut(ElementId)>;

/// Per-registration options.
pub struct TriggerOptions {
    /// Minimum intersection ratio that counts as "entered".
    pub threshold: f32,
    /// Fire at most once, then retire.
    pub once: bool,
    /// Position of the element in the document; batches are delivered in ascending order.
    /// Defaults to registration order.
    pub document_order: Option<u64>,
    pub on_enter: Option<EnterCallback>,
    pub on_leave: Option<LeaveCallback>,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_TRIGGER_THRESHOLD,
            once: true,
            document_order: None,
            on_enter: None,
            on_leave: None,
        }
    }
}

impl TriggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn with_document_order(mut self, order: u64) -> Self {
        self.document_order = Some(order);
        self
    }

    pub fn with_on_enter(mut self, f: impl FnMut(&EnterEvent) + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    pub fn with_on_leave(mut self, f: impl FnMut(ElementId) + 'static) -> Self {
        self.on_leave = Some(Box::new(f));
        self
    }
}

impl core::fmt::Debug for TriggerOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TriggerOptions")
            .field("threshold", &self.threshold)
            .field("once", &self.once)
            .field("document_order", &self.document_order)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .finish()
    }
}

struct Registration {
    id: RegistrationId,
    element: ElementId,
    threshold: f32,
    once: bool,
    document_order: u64,
    state: TriggerState,
    entrance: EntranceState,
    on_enter: Option<EnterCallback>,
    on_leave: Option<LeaveCallback>,
}

/// Counts from one [`TriggerDispatcher::notify`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub entered: usize,
    pub left: usize,
    /// `once` registrations that fired and retired.
    pub retired: usize,
    /// Registrations dropped because their element became unobservable.
    pub dropped: usize,
}

/// Fires staggered entrance animations when registered elements scroll into view.
///
/// Visibility arrives from the host asynchronously through [`notify`](Self::notify); the
/// entrance tweens it starts are advanced by [`tick`](Self::tick) on the frame clock.
pub struct TriggerDispatcher<O, S = Timeline> {
    options: DispatcherOptions,
    observer: O,
    scheduler: S,
    registrations: Vec<Option<Registration>>,
    generation: u32,
    next_order: u64,
    live: usize,
    batch: Vec<usize>,
    disposed: bool,
}

impl<O: VisibilityObserver> TriggerDispatcher<O> {
    pub fn new(options: DispatcherOptions, observer: O) -> Self {
        Self::with_scheduler(options, observer, Timeline::new())
    }
}

impl<O: VisibilityObserver, S: TweenScheduler> TriggerDispatcher<O, S> {
    pub fn with_scheduler(options: DispatcherOptions, observer: O, scheduler: S) -> Self {
        fldebug!(stagger_ms = options.stagger_ms, "TriggerDispatcher::new");
        Self {
            options,
            observer,
            scheduler,
            registrations: Vec::new(),
            generation: 0,
            next_order: 0,
            live: 0,
            batch: Vec::new(),
            disposed: false,
        }
    }

    pub fn options(&self) -> &DispatcherOptions {
        &self.options
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Registrations that can still fire (Armed or Fired).
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// All stored registrations, including retired ones.
    pub fn len(&self) -> usize {
        self.registrations.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, id: RegistrationId) -> Option<&Registration> {
        match self.registrations.get(id.slot as usize) {
            Some(Some(r)) if r.id == id => Some(r),
            _ => None,
        }
    }

    fn slot_of(&self, element: ElementId) -> Option<usize> {
        self.registrations
            .iter()
            .position(|r| r.as_ref().is_some_and(|r| r.element == element))
    }

    pub fn id_of(&self, element: ElementId) -> Option<RegistrationId> {
        self.slot_of(element)
            .and_then(|slot| self.registrations[slot].as_ref())
            .map(|r| r.id)
    }

    pub fn state(&self, id: RegistrationId) -> Option<TriggerState> {
        self.get(id).map(|r| r.state)
    }

    pub fn entrance(&self, id: RegistrationId) -> Option<EntranceState> {
        self.get(id).map(|r| r.entrance)
    }

    fn initial_entrance(&self) -> EntranceState {
        if self.options.reduced_motion {
            EntranceState::VISIBLE
        } else {
            EntranceState::hidden(self.options.entrance_offset_y)
        }
    }

    /// Starts observing `element`.
    ///
    /// Returns `None` (after logging a warning) if the platform cannot observe it, or if the
    /// dispatcher has been disposed. Registering an element twice returns the existing id.
    pub fn register(
        &mut self,
        element: ElementId,
        options: TriggerOptions,
    ) -> Option<RegistrationId> {
        if self.disposed {
            return None;
        }
        if let Some(id) = self.id_of(element) {
            fltrace!(?element, "TriggerDispatcher: element already registered");
            return Some(id);
        }
        if let Err(_err) = self.observer.observe(element, options.threshold) {
            flwarn!(?element, error = %_err, "TriggerDispatcher: registration dropped");
            return None;
        }

        self.generation = self.generation.wrapping_add(1);
        let slot = match self.registrations.iter().position(Option::is_none) {
            Some(slot) => slot,
            None => {
                self.registrations.push(None);
                self.registrations.len() - 1
            }
        };
        let id = RegistrationId {
            slot: slot as u32,
            generation: self.generation,
        };
        let document_order = options.document_order.unwrap_or(self.next_order);
        self.next_order = self.next_order.max(document_order).saturating_add(1);

        self.registrations[slot] = Some(Registration {
            id,
            element,
            threshold: options.threshold,
            once: options.once,
            document_order,
            state: TriggerState::Armed,
            entrance: self.initial_entrance(),
            on_enter: options.on_enter,
            on_leave: options.on_leave,
        });
        self.live += 1;
        Some(id)
    }

    /// Releases a registration (its owning UI region unmounted). Returns `false` for unknown
    /// or already released ids.
    pub fn unregister(&mut self, id: RegistrationId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.release(id.slot as usize);
        true
    }

    fn release(&mut self, slot: usize) {
        let Some(reg) = self.registrations[slot].take() else {
            return;
        };
        if reg.state != TriggerState::Retired {
            self.observer.unobserve(reg.element);
            self.live -= 1;
        }
        self.scheduler.cancel_owner(slot);
    }

    fn retire(&mut self, slot: usize) {
        let Some(reg) = self.registrations[slot].as_mut() else {
            return;
        };
        if reg.state == TriggerState::Retired {
            return;
        }
        reg.state = TriggerState::Retired;
        let element = reg.element;
        self.observer.unobserve(element);
        self.live -= 1;
    }

    fn start_entrance(&mut self, slot: usize, to: EntranceState, delay_ms: f64, now_ms: f64) {
        let reduced = self.options.reduced_motion;
        let Some(reg) = self.registrations[slot].as_mut() else {
            return;
        };
        if reduced {
            self.scheduler.cancel_owner(slot);
            reg.entrance = to;
            return;
        }
        let from = reg.entrance;
        let duration = self.options.entrance_duration_ms;
        let easing = self.options.easing;
        self.scheduler.start(
            slot,
            Property::Opacity,
            Tween::new(from.opacity, to.opacity, now_ms, duration, easing).with_delay(delay_ms),
        );
        self.scheduler.start(
            slot,
            Property::TranslateY,
            Tween::new(from.translate_y, to.translate_y, now_ms, duration, easing)
                .with_delay(delay_ms),
        );
    }

    /// Handles one visibility notification from the host.
    ///
    /// Every Armed registration that crossed its threshold in `entries` is delivered as one
    /// batch, ordered by document position, with entrance delays `batch_index * stagger_ms`.
    pub fn notify(&mut self, entries: &[Intersection], now_ms: f64) -> BatchReport {
        let mut report = BatchReport::default();
        if self.disposed {
            return report;
        }

        let mut batch = core::mem::take(&mut self.batch);
        batch.clear();

        for entry in entries {
            let Some(slot) = self.slot_of(entry.element) else {
                fltrace!(element = ?entry.element, "TriggerDispatcher: unknown element");
                continue;
            };
            let Some(reg) = self.registrations[slot].as_mut() else {
                continue;
            };
            match entry.visibility {
                Visibility::Detached => {
                    if reg.state != TriggerState::Retired {
                        flwarn!(
                            element = ?entry.element,
                            "TriggerDispatcher: element detached, registration dropped"
                        );
                        self.release(slot);
                        report.dropped += 1;
                    }
                }
                Visibility::Intersecting(ratio) if ratio >= reg.threshold => {
                    if reg.state == TriggerState::Armed {
                        reg.state = TriggerState::Fired;
                        batch.push(slot);
                    }
                }
                Visibility::Intersecting(_) | Visibility::Outside => {
                    if reg.state == TriggerState::Fired && !reg.once {
                        reg.state = TriggerState::Armed;
                        let element = reg.element;
                        if let Some(cb) = reg.on_leave.as_mut() {
                            cb(element);
                        }
                        let hidden = EntranceState::hidden(self.options.entrance_offset_y);
                        if !self.options.reduced_motion {
                            self.start_entrance(slot, hidden, 0.0, now_ms);
                        }
                        report.left += 1;
                    }
                }
            }
        }

        batch.sort_by_key(|&slot| {
            self.registrations[slot]
                .as_ref()
                .map_or(u64::MAX, |r| r.document_order)
        });

        let batch_len = batch.len();
        for (batch_index, &slot) in batch.iter().enumerate() {
            let delay_ms = if self.options.reduced_motion {
                0.0
            } else {
                batch_index as f64 * self.options.stagger_ms
            };
            self.start_entrance(slot, EntranceState::VISIBLE, delay_ms, now_ms);

            let Some(reg) = self.registrations[slot].as_mut() else {
                continue;
            };
            let event = EnterEvent {
                id: reg.id,
                element: reg.element,
                batch_index,
                batch_len,
                delay_ms,
            };
            if let Some(cb) = reg.on_enter.as_mut() {
                cb(&event);
            }
            report.entered += 1;
            if reg.once {
                self.retire(slot);
                report.retired += 1;
            }
        }

        self.batch = batch;
        if report.entered > 0 {
            fldebug!(
                entered = report.entered,
                retired = report.retired,
                "TriggerDispatcher: batch delivered"
            );
        }
        report
    }

    /// Advances entrance animations.
    pub fn tick(&mut self, now_ms: f64) {
        if self.disposed {
            return;
        }
        let Self {
            scheduler,
            registrations,
            ..
        } = self;
        scheduler.advance(now_ms, &mut |u| {
            let Some(Some(reg)) = registrations.get_mut(u.owner) else {
                return;
            };
            match u.property {
                Property::Opacity => reg.entrance.opacity = u.value,
                Property::TranslateY => reg.entrance.translate_y = u.value,
                Property::Scale => {}
            }
        });
    }

    pub fn for_each_entrance(&self, mut f: impl FnMut(ElementId, EntranceState)) {
        for reg in self.registrations.iter().flatten() {
            f(reg.element, reg.entrance);
        }
    }

    /// Releases every registration and stops in-flight entrances. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for slot in 0..self.registrations.len() {
            self.release(slot);
        }
        self.registrations.clear();
        let _stopped = self.scheduler.clear();
        self.disposed = true;
        fldebug!(stopped = _stopped, "TriggerDispatcher::dispose");
    }
}

impl<O, S> core::fmt::Debug for TriggerDispatcher<O, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TriggerDispatcher")
            .field("options", &self.options)
            .field("registrations", &self.registrations.iter().flatten().count())
            .field("live", &self.live)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
