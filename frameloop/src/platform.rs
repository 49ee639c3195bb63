use thiserror::Error;

/// Identity of a host element (DOM node, widget id, ...).
///
/// The engine never dereferences it; it is only handed back to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub u64);

/// A capability gap reported by the host platform.
///
/// These never propagate out of a tick: the engine logs them and skips the affected visual.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("element {0:?} is detached and cannot be observed")]
    Detached(ElementId),
    #[error("visibility observation is not supported for element {0:?}")]
    Unsupported(ElementId),
    #[error("render target `{0}` is missing")]
    MissingTarget(&'static str),
}

/// Host-side visibility observation (an intersection observer, a layout pass, ...).
///
/// The host reports crossings back through
/// [`TriggerDispatcher::notify`](crate::TriggerDispatcher::notify).
pub trait VisibilityObserver {
    fn observe(&mut self, element: ElementId, threshold: f32) -> Result<(), PlatformError>;
    fn unobserve(&mut self, element: ElementId);
}

/// A source of uniform values in `[0, 1)`.
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;
}

/// Small deterministic PRNG (64-bit LCG), good enough for decorative jitter.
#[derive(Clone, Copy, Debug)]
pub struct Lcg(u64);

impl Lcg {
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(0x853c_49e6_748f_ea9b)
    }
}

impl RandomSource for Lcg {
    fn next_f32(&mut self) -> f32 {
        // Top 24 bits map exactly onto the f32 mantissa.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f32(&mut self) -> f32 {
        (**self).next_f32()
    }
}
