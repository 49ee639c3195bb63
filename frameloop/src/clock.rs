use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

/// What a tick callback wants next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Schedule this subscriber for the next refresh.
    Continue,
    /// Drop the subscription.
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

type TickFn = dyn FnMut(Option<f64>) -> Tick;

struct Subscriber {
    handle: FrameHandle,
    callback: Rc<RefCell<Box<TickFn>>>,
    last_ms: Option<f64>,
    scheduled: bool,
}

#[derive(Default)]
struct ClockInner {
    next_handle: u64,
    subscribers: Vec<Subscriber>,
    frames: u64,
    scratch: Vec<(FrameHandle, Rc<RefCell<Box<TickFn>>>, Option<f64>)>,
}

impl ClockInner {
    fn find(&self, handle: FrameHandle) -> Option<usize> {
        self.subscribers.iter().position(|s| s.handle == handle)
    }
}

/// The single per-refresh driver every animated component subscribes to.
///
/// This is a cheap, clonable handle over shared state, so a tick callback may hold a clone and
/// call [`FrameClock::stop`] on itself (or on another subscriber) mid-frame. The host calls
/// [`FrameClock::frame`] once per display refresh (e.g. from `requestAnimationFrame`).
///
/// Scheduling is self-rescheduling rather than interval based: each callback answers
/// [`Tick::Continue`] to be run on the next refresh. A stopped handle is never invoked again,
/// even when `stop` happens during the frame that would have run it.
#[derive(Clone, Default)]
pub struct FrameClock {
    inner: Rc<RefCell<ClockInner>>,
}

impl FrameClock {
    /// Creates an independent clock with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `tick`, scheduling it for the next refresh.
    ///
    /// The argument is the time since this subscriber's previous tick in milliseconds, or
    /// `None` on its first tick. Gaps are not capped: a backgrounded tab may report seconds.
    pub fn start(&self, tick: impl FnMut(Option<f64>) -> Tick + 'static) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        let handle = FrameHandle(inner.next_handle);
        inner.next_handle += 1;
        inner.subscribers.push(Subscriber {
            handle,
            callback: Rc::new(RefCell::new(Box::new(tick))),
            last_ms: None,
            scheduled: true,
        });
        fldebug!(handle = handle.0, "FrameClock::start");
        handle
    }

    /// Cancels a subscription. Returns `false` if it was already gone.
    pub fn stop(&self, handle: FrameHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(pos) = inner.find(handle) else {
            return false;
        };
        inner.subscribers.remove(pos);
        fldebug!(handle = handle.0, "FrameClock::stop");
        true
    }

    /// Cancels every subscription.
    pub fn stop_all(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        let n = inner.subscribers.len();
        inner.subscribers.clear();
        n
    }

    pub fn is_active(&self, handle: FrameHandle) -> bool {
        self.inner.borrow().find(handle).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Whether any subscriber is waiting for the next refresh.
    pub fn has_pending_frame(&self) -> bool {
        self.inner.borrow().subscribers.iter().any(|s| s.scheduled)
    }

    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frames
    }

    /// Runs one refresh at `now_ms`, returning how many callbacks were invoked.
    ///
    /// Subscribers are run in subscription order. The set of subscribers is fixed when the
    /// frame begins: one added during the frame first runs on the next, one stopped during
    /// the frame is skipped if it has not run yet. No subscriber runs twice in a frame.
    pub fn frame(&self, now_ms: f64) -> usize {
        let mut due = {
            let mut inner = self.inner.borrow_mut();
            inner.frames += 1;
            let mut due = core::mem::take(&mut inner.scratch);
            for s in inner.subscribers.iter_mut().filter(|s| s.scheduled) {
                let delta = s.last_ms.map(|last| (now_ms - last).max(0.0));
                s.last_ms = Some(now_ms);
                s.scheduled = false;
                due.push((s.handle, Rc::clone(&s.callback), delta));
            }
            due
        };

        let mut invoked = 0;
        for (handle, callback, delta) in due.drain(..) {
            if !self.is_active(handle) {
                continue;
            }
            let Ok(mut callback) = callback.try_borrow_mut() else {
                flwarn!(handle = handle.0, "FrameClock::frame: re-entrant frame skipped");
                continue;
            };
            let next = (&mut **callback)(delta);
            drop(callback);
            invoked += 1;

            let mut inner = self.inner.borrow_mut();
            if let Some(pos) = inner.find(handle) {
                match next {
                    Tick::Continue => inner.subscribers[pos].scheduled = true,
                    Tick::Stop => {
                        inner.subscribers.remove(pos);
                    }
                }
            }
        }

        let mut inner = self.inner.borrow_mut();
        if inner.scratch.capacity() < due.capacity() {
            inner.scratch = due;
        }
        fltrace!(now_ms, invoked, "FrameClock::frame");
        invoked
    }
}

impl core::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FrameClock")
            .field("subscribers", &inner.subscribers.len())
            .field("frames", &inner.frames)
            .finish_non_exhaustive()
    }
}
