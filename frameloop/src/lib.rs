//! A headless per-frame animation engine.
//!
//! This crate holds the numerical state behind a site's decorative motion layer:
//!
//! - a pointer trail that interpolates a chain of segments toward the cursor
//! - a fixed-capacity pool of short-lived sparks emitted by fast pointer motion
//! - a smooth-scroll coordinator that damps the rendered scroll offset and sizes a scrollbar
//! - a viewport-trigger dispatcher that fires batched, staggered entrance animations
//! - a frame-rate / registration monitor
//!
//! It is UI-agnostic. A host layer (DOM, GPU canvas, TUI) is expected to provide:
//! - one [`FrameClock::frame`] call per display refresh
//! - pointer samples, native scroll offsets and viewport/content sizes
//! - visibility notifications through a [`VisibilityObserver`]
//!
//! See the `frameloop-adapter` crate for a composite handle that wires everything to one clock.
#![forbid(unsafe_code)]

extern crate alloc;

#[macro_use]
mod macros;

mod chain;
mod clock;
mod effects;
mod monitor;
pub mod options;
mod platform;
mod scroll;
mod trigger;
mod tween;
mod types;


pub use chain::{ChainEngine, Segment, SegmentVisual};
pub use clock::{FrameClock, FrameHandle, Tick};
pub use effects::{EffectPool, EffectSlot, EffectVisual};
pub use monitor::{Diagnostic, Monitor, MonitorSnapshot};
pub use options::{ChainOptions, DispatcherOptions, EffectOptions, MonitorOptions, ScrollOptions};
pub use platform::{ElementId, Lcg, PlatformError, RandomSource, VisibilityObserver};
pub use scroll::{ScrollCoordinator, ScrollFrame, ScrollState, ScrollbarThumb};
pub use trigger::{
    BatchReport, EnterCallback, EnterEvent, EntranceState, Intersection, LeaveCallback,
    RegistrationId, TriggerDispatcher, TriggerOptions, TriggerState, Visibility,
};
pub use tween::{Easing, Property, Timeline, Tween, TweenId, TweenScheduler, TweenUpdate};
pub use types::{Point, Rgb, Viewport, lerp};
