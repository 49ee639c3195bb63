use alloc::boxed::Box;
use alloc::vec;

use crate::{ChainOptions, Point, Viewport};

const MIN_HEAD_FACTOR: f32 = 0.001;
const MAX_HEAD_FACTOR: f32 = 0.999;
const MIN_FOLLOW_FACTOR: f32 = 0.001;
const MAX_FOLLOW_FACTOR: f32 = 1.0;

fn viewport_is_finite(viewport: Viewport) -> bool {
    viewport.width.is_finite() && viewport.height.is_finite()
}

/// One link of the pointer trail.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub position: Point,
    /// Degrees, clockwise from +x in screen space.
    pub rotation: f32,
}

/// What the host needs to draw segment `index`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentVisual {
    pub index: usize,
    pub position: Point,
    pub rotation: f32,
    pub size: f32,
    pub opacity: f32,
}

/// The pointer trail ("snake cursor").
///
/// Segment 0 chases the pointer; segment `i` chases segment `i - 1` as it stands *after* this
/// tick's update, with a follow factor that shrinks along the chain so the tail lags further
/// behind. The segment array is allocated once at construction.
#[derive(Clone, Debug)]
pub struct ChainEngine {
    options: ChainOptions,
    segments: Box<[Segment]>,
    viewport: Viewport,
    pointer: Option<Point>,
    previous_target: Option<Point>,
    velocity: Point,
    speed: f32,
    disposed: bool,
}

impl ChainEngine {
    pub fn new(options: ChainOptions, viewport: Viewport) -> Self {
        let viewport = if viewport_is_finite(viewport) {
            viewport
        } else {
            flwarn!(?viewport, "ChainEngine: non-finite viewport, using zero size");
            Viewport::default()
        };
        let start = Segment {
            position: viewport.center(),
            rotation: 0.0,
        };
        fldebug!(segments = options.segments, "ChainEngine::new");
        Self {
            segments: vec![start; options.segments].into_boxed_slice(),
            options,
            viewport,
            pointer: None,
            previous_target: None,
            velocity: Point::ZERO,
            speed: 0.0,
            disposed: false,
        }
    }

    pub fn options(&self) -> &ChainOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn head(&self) -> Option<Segment> {
        self.segments.first().copied()
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Head target speed over the last tick, in px/tick.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The point the head is chasing: the last pointer sample, or the viewport centre before
    /// any pointer input has arrived.
    pub fn target(&self) -> Point {
        self.pointer.unwrap_or_else(|| self.viewport.center())
    }

    /// Non-finite sizes are ignored.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.disposed {
            return;
        }
        if !viewport_is_finite(viewport) {
            flwarn!(?viewport, "ChainEngine: ignoring non-finite viewport");
            return;
        }
        self.viewport = viewport;
    }

    /// Records a pointer sample in viewport coordinates.
    ///
    /// Non-finite samples are ignored. With reduced motion the whole chain snaps onto the
    /// sample immediately.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.disposed {
            return;
        }
        let p = Point::new(x, y);
        if !p.is_finite() {
            flwarn!(x, y, "ChainEngine: ignoring non-finite pointer sample");
            return;
        }
        self.pointer = Some(p);
        if self.options.reduced_motion {
            self.snap_to(p);
        }
    }

    /// Places every segment on `p` and forgets the velocity history.
    pub fn snap_to(&mut self, p: Point) {
        if self.disposed {
            return;
        }
        for s in self.segments.iter_mut() {
            s.position = p;
        }
        self.previous_target = Some(p);
        self.velocity = Point::ZERO;
        self.speed = 0.0;
    }

    /// Follow factor of segment `i >= 1`: `follow_factor * (1 - i / 2N)`, kept in `(0, 1]`.
    pub fn follow_factor(&self, i: usize) -> f32 {
        let n = self.segments.len().max(1) as f32;
        let factor = self.options.follow_factor * (1.0 - i as f32 / (2.0 * n));
        if factor.is_finite() {
            factor.clamp(MIN_FOLLOW_FACTOR, MAX_FOLLOW_FACTOR)
        } else {
            MIN_FOLLOW_FACTOR
        }
    }

    fn head_factor(&self) -> f32 {
        let boost = (self.speed * self.options.sensitivity).min(self.options.max_boost);
        let factor = self.options.base_rate + boost;
        if factor.is_finite() {
            factor.clamp(MIN_HEAD_FACTOR, MAX_HEAD_FACTOR)
        } else {
            MIN_HEAD_FACTOR
        }
    }

    /// Advances the chain by one frame. A no-op once disposed or when the chain is empty.
    pub fn tick(&mut self) {
        if self.disposed || self.segments.is_empty() {
            return;
        }

        let target = self.target();
        let previous = self.previous_target.unwrap_or(target);
        self.velocity = target - previous;
        self.speed = self.velocity.length();
        self.previous_target = Some(target);

        let moving = self.speed > self.options.rotation_speed_threshold;
        if self.options.reduced_motion {
            for s in self.segments.iter_mut() {
                s.position = target;
            }
            if moving {
                let rotation = self.velocity.angle_deg();
                for s in self.segments.iter_mut() {
                    s.rotation = rotation;
                }
            }
            return;
        }

        let factor = self.head_factor();
        let head = &mut self.segments[0];
        head.position = head.position.lerp(target, factor);
        if moving {
            head.rotation = self.velocity.angle_deg();
        }

        let noise_floor = self.options.rotation_noise_floor;
        for i in 1..self.segments.len() {
            let factor = self.follow_factor(i);
            let leader = self.segments[i - 1].position;
            let s = &mut self.segments[i];
            s.position = s.position.lerp(leader, factor);
            let to_leader = leader - s.position;
            if to_leader.length() > noise_floor {
                s.rotation = to_leader.angle_deg();
            }
        }
    }

    /// Size/opacity taper: `(1 - i/N)^power`, floored so the tail never vanishes.
    fn falloff(&self, i: usize) -> f32 {
        let n = self.segments.len().max(1) as f32;
        (1.0 - i as f32 / n).max(0.0).powf(self.options.falloff_power)
    }

    pub fn visual(&self, index: usize) -> Option<SegmentVisual> {
        let s = self.segments.get(index)?;
        let k = self.falloff(index);
        Some(SegmentVisual {
            index,
            position: s.position,
            rotation: s.rotation,
            size: self.options.head_size * k.max(self.options.tail_size_floor),
            opacity: k.max(self.options.tail_opacity_floor),
        })
    }

    pub fn for_each_visual(&self, mut f: impl FnMut(SegmentVisual)) {
        for i in 0..self.segments.len() {
            if let Some(v) = self.visual(i) {
                f(v);
            }
        }
    }

    /// Stops all further updates. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.pointer = None;
        self.speed = 0.0;
        self.velocity = Point::ZERO;
        fldebug!("ChainEngine::dispose");
    }
}
