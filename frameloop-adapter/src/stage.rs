use std::cell::{Cell, RefCell};
use std::rc::Rc;

use frameloop::{
    BatchReport, ChainEngine, EffectPool, ElementId, EntranceState, FrameClock, FrameHandle,
    Intersection, Monitor, MonitorSnapshot, PlatformError, RegistrationId, ScrollCoordinator,
    ScrollFrame, ScrollbarThumb, Segment, Tick, TriggerDispatcher, TriggerOptions, TriggerState,
    VisibilityObserver,
};

use crate::{RenderSink, StageOptions};

type Inbox = Rc<RefCell<Vec<Vec<Intersection>>>>;

/// Which render surfaces have already been reported missing.
#[derive(Debug, Default)]
struct MissingTargets {
    segment: bool,
    effect: bool,
    content: bool,
    scrollbar: bool,
    entrance: bool,
}

fn report_missing(warned: &mut bool, _err: PlatformError) {
    if !core::mem::replace(warned, true) {
        flwarn!(error = %_err, "Stage: render target missing, visual skipped");
    }
}

struct StageInner<K, O> {
    chain: ChainEngine,
    effects: EffectPool,
    scroll: ScrollCoordinator,
    triggers: TriggerDispatcher<O>,
    monitor: Option<Monitor>,
    sink: K,
    now_ms: f64,
    missing: MissingTargets,
    disposed: bool,
}

impl<K: RenderSink, O: VisibilityObserver> StageInner<K, O> {
    /// One frame, in a fixed order:
    /// monitor → queued visibility → chain → effects → scroll → entrances → render.
    fn tick(&mut self, delta: Option<f64>, queued: Vec<Vec<Intersection>>) {
        if self.disposed {
            return;
        }
        self.now_ms += delta.unwrap_or(0.0);
        let now = self.now_ms;

        if let Some(monitor) = self.monitor.as_mut() {
            monitor.sample_frame(now);
        }
        for entries in &queued {
            self.dispatch(entries);
        }

        self.chain.tick();
        if let Some(head) = self.chain.head() {
            self.effects
                .maybe_spawn(head.position, self.chain.speed(), now);
        }
        self.effects.tick(now);
        let frame = self.scroll.tick();
        self.triggers.tick(now);

        self.render(frame);
    }

    fn dispatch(&mut self, entries: &[Intersection]) -> BatchReport {
        let before = self.triggers.live_count();
        let report = self.triggers.notify(entries, self.now_ms);
        self.sync_monitor(before);
        report
    }

    /// Mirrors changes in the dispatcher's live count into the monitor.
    fn sync_monitor(&mut self, before: usize) {
        let Some(monitor) = self.monitor.as_mut() else {
            return;
        };
        let after = self.triggers.live_count();
        for _ in after..before {
            monitor.on_retire();
        }
        for _ in before..after {
            monitor.on_register();
        }
    }

    fn render(&mut self, frame: Option<ScrollFrame>) {
        let Self {
            chain,
            effects,
            triggers,
            sink,
            missing,
            ..
        } = self;

        chain.for_each_visual(|v| {
            if let Err(err) = sink.segment(&v) {
                report_missing(&mut missing.segment, err);
            }
        });

        for slot in 0..effects.capacity() {
            let visual = effects.visual(slot);
            if let Err(err) = sink.effect(slot, visual.as_ref()) {
                report_missing(&mut missing.effect, err);
            }
        }

        if let Some(frame) = frame {
            if let Err(err) = sink.content_offset(frame.content_offset) {
                report_missing(&mut missing.content, err);
            }
            if let Some(thumb) = frame.thumb {
                if let Err(err) = sink.scrollbar(&thumb) {
                    report_missing(&mut missing.scrollbar, err);
                }
            }
        }

        triggers.for_each_entrance(|element, state| {
            if let Err(err) = sink.entrance(element, &state) {
                report_missing(&mut missing.entrance, err);
            }
        });
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let before = self.triggers.live_count();
        self.chain.dispose();
        self.effects.dispose();
        self.scroll.dispose();
        self.triggers.dispose();
        self.sync_monitor(before);
        self.disposed = true;
        fldebug!("Stage::dispose");
    }
}

/// One handle over the whole motion layer of a page, driven by a shared [`FrameClock`].
///
/// `mount` subscribes a single tick to the clock; `dispose` (or dropping the stage) cancels it
/// and tears every component down. This type does not hold UI objects: the host feeds input
/// through `on_*` methods and receives visuals through its [`RenderSink`].
///
/// Visibility notifications that arrive while a frame is being processed are queued and
/// delivered at the start of the next frame; otherwise they are handled immediately.
pub struct Stage<K: RenderSink + 'static, O: VisibilityObserver + 'static> {
    clock: FrameClock,
    handle: Cell<Option<FrameHandle>>,
    inner: Rc<RefCell<StageInner<K, O>>>,
    inbox: Inbox,
    dispose_requested: Rc<Cell<bool>>,
    reduced_motion: bool,
}

impl<K: RenderSink + 'static, O: VisibilityObserver + 'static> Stage<K, O> {
    pub fn mount(clock: &FrameClock, sink: K, observer: O, options: StageOptions) -> Self {
        let options = options.resolved();
        let reduced_motion = options.reduced_motion;

        let mut scroll = ScrollCoordinator::new(options.scroll);
        scroll.on_resize(options.viewport.height, options.content_height);

        let inner = Rc::new(RefCell::new(StageInner {
            chain: ChainEngine::new(options.chain, options.viewport),
            effects: EffectPool::new(options.effects),
            scroll,
            triggers: TriggerDispatcher::new(options.dispatcher, observer),
            monitor: options.monitor.map(Monitor::new),
            sink,
            now_ms: 0.0,
            missing: MissingTargets::default(),
            disposed: false,
        }));
        let inbox = Inbox::default();
        let dispose_requested = Rc::new(Cell::new(false));

        let weak = Rc::downgrade(&inner);
        let queued = Rc::clone(&inbox);
        let requested = Rc::clone(&dispose_requested);
        let handle = clock.start(move |delta| {
            let Some(cell) = weak.upgrade() else {
                return Tick::Stop;
            };
            let Ok(mut inner) = cell.try_borrow_mut() else {
                return Tick::Continue;
            };
            if !requested.get() && !inner.disposed {
                let pending = queued
                    .try_borrow_mut()
                    .map(|mut q| core::mem::take(&mut *q))
                    .unwrap_or_default();
                inner.tick(delta, pending);
            }
            if requested.get() {
                inner.dispose();
            }
            if inner.disposed {
                Tick::Stop
            } else {
                Tick::Continue
            }
        });
        fldebug!(reduced_motion, "Stage::mount");

        Self {
            clock: clock.clone(),
            handle: Cell::new(Some(handle)),
            inner,
            inbox,
            dispose_requested,
            reduced_motion,
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut StageInner<K, O>) -> R) -> Option<R> {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            flwarn!("Stage: re-entrant call ignored");
            return None;
        };
        if inner.disposed {
            return None;
        }
        let out = f(&mut inner);
        if self.dispose_requested.get() {
            inner.dispose();
        }
        Some(out)
    }

    fn read<R>(&self, f: impl FnOnce(&StageInner<K, O>) -> R) -> Option<R> {
        self.inner.try_borrow().ok().map(|inner| f(&inner))
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn is_disposed(&self) -> bool {
        self.dispose_requested.get() || self.read(|i| i.disposed).unwrap_or(false)
    }

    /// The clock subscription driving this stage, until it is disposed.
    pub fn handle(&self) -> Option<FrameHandle> {
        self.handle.get()
    }

    /// Accumulated frame time the stage has seen, in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.read(|i| i.now_ms).unwrap_or_default()
    }

    pub fn on_pointer_move(&self, x: f32, y: f32) {
        self.update(|i| i.chain.on_pointer_move(x, y));
    }

    pub fn on_scroll(&self, offset: f32) {
        self.update(|i| i.scroll.on_scroll(offset));
    }

    pub fn on_resize(&self, width: f32, height: f32, content_height: f32) {
        self.update(|i| {
            i.chain
                .set_viewport(frameloop::Viewport::new(width, height));
            i.scroll.on_resize(height, content_height);
        });
    }

    pub fn scroll_to(&self, offset: f32) {
        self.update(|i| i.scroll.scroll_to(offset));
    }

    pub fn jump_to(&self, offset: f32) {
        self.update(|i| i.scroll.jump_to(offset));
    }

    /// Opts `element` into a viewport-triggered entrance.
    pub fn register(&self, element: ElementId, options: TriggerOptions) -> Option<RegistrationId> {
        self.update(|i| {
            let before = i.triggers.live_count();
            let id = i.triggers.register(element, options);
            i.sync_monitor(before);
            id
        })
        .flatten()
    }

    pub fn unregister(&self, id: RegistrationId) -> bool {
        self.update(|i| {
            let before = i.triggers.live_count();
            let released = i.triggers.unregister(id);
            i.sync_monitor(before);
            released
        })
        .unwrap_or(false)
    }

    /// Hands one host visibility notification to the dispatcher.
    ///
    /// Returns the batch report when it was handled right away, `None` when it was queued
    /// for the next frame (or the stage is disposed).
    pub fn notify_visibility(&self, entries: &[Intersection]) -> Option<BatchReport> {
        if self.is_disposed() {
            return None;
        }
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => {
                let report = inner.dispatch(entries);
                if self.dispose_requested.get() {
                    inner.dispose();
                }
                Some(report)
            }
            Err(_) => {
                if let Ok(mut queue) = self.inbox.try_borrow_mut() {
                    queue.push(entries.to_vec());
                }
                None
            }
        }
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.read(|i| i.chain.segments().to_vec())
            .unwrap_or_default()
    }

    pub fn head(&self) -> Option<Segment> {
        self.read(|i| i.chain.head()).flatten()
    }

    pub fn virtual_offset(&self) -> f32 {
        self.read(|i| i.scroll.virtual_offset()).unwrap_or_default()
    }

    pub fn target_offset(&self) -> f32 {
        self.read(|i| i.scroll.target_offset()).unwrap_or_default()
    }

    /// The indicator as last pushed to the sink.
    pub fn thumb(&self) -> Option<ScrollbarThumb> {
        self.read(|i| i.scroll.thumb())
    }

    pub fn active_effects(&self) -> usize {
        self.read(|i| i.effects.active_count()).unwrap_or_default()
    }

    pub fn entrance(&self, id: RegistrationId) -> Option<EntranceState> {
        self.read(|i| i.triggers.entrance(id)).flatten()
    }

    pub fn trigger_state(&self, id: RegistrationId) -> Option<TriggerState> {
        self.read(|i| i.triggers.state(id)).flatten()
    }

    pub fn live_registrations(&self) -> usize {
        self.read(|i| i.triggers.live_count()).unwrap_or_default()
    }

    /// Monitor counters, or `None` when the stage was mounted without a monitor.
    pub fn monitor(&self) -> Option<MonitorSnapshot> {
        self.read(|i| i.monitor.as_ref().map(Monitor::snapshot))
            .flatten()
    }

    pub fn with_sink<R>(&self, f: impl FnOnce(&K) -> R) -> Option<R> {
        self.read(|i| f(&i.sink))
    }

    pub fn with_observer<R>(&self, f: impl FnOnce(&O) -> R) -> Option<R> {
        self.read(|i| f(i.triggers.observer()))
    }

    /// Cancels the clock subscription and tears every component down. Idempotent, and safe
    /// before the first frame. If called while a frame is running, teardown completes as soon
    /// as that frame returns.
    pub fn dispose(&self) {
        if let Some(handle) = self.handle.take() {
            self.clock.stop(handle);
        }
        if let Ok(mut queue) = self.inbox.try_borrow_mut() {
            queue.clear();
        }
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.dispose(),
            Err(_) => self.dispose_requested.set(true),
        }
    }
}

impl<K: RenderSink + 'static, O: VisibilityObserver + 'static> Drop for Stage<K, O> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<K: RenderSink + 'static, O: VisibilityObserver + 'static> core::fmt::Debug for Stage<K, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stage")
            .field("handle", &self.handle.get())
            .field("reduced_motion", &self.reduced_motion)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
