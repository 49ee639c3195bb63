//! Host-side composition for the `frameloop` crate.
//!
//! `frameloop` keeps each motion component separate and clock-agnostic. This crate provides the
//! pieces a host usually needs on top:
//!
//! - [`Stage`]: one mount/dispose handle that drives every component from a single clock
//!   subscription, honoring a page-wide reduced-motion preference
//! - [`RenderSink`]: the seam through which per-frame visuals reach the host
//! - [`HeadlessSink`] / [`HeadlessObserver`]: in-memory hosts for tests and simulations
//!
//! Like `frameloop`, this crate holds no UI objects.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod headless;
mod options;
mod sink;
mod stage;

#[cfg(test)]
mod tests;

pub use headless::{HeadlessObserver, HeadlessSink};
pub use options::StageOptions;
pub use sink::RenderSink;
pub use stage::Stage;
