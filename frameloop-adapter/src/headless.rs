use std::collections::{BTreeMap, BTreeSet};

use frameloop::{
    EffectVisual, ElementId, EntranceState, PlatformError, ScrollbarThumb, SegmentVisual,
    VisibilityObserver,
};

use crate::RenderSink;

/// A [`RenderSink`] that records the latest pushed state instead of drawing it.
///
/// Useful for tests and for hosts that read state back on their own schedule.
#[derive(Clone, Debug, Default)]
pub struct HeadlessSink {
    pub segments: Vec<SegmentVisual>,
    pub effects: Vec<Option<EffectVisual>>,
    pub content_offset: Option<f32>,
    pub thumb: Option<ScrollbarThumb>,
    pub thumb_writes: u64,
    pub entrances: BTreeMap<ElementId, EntranceState>,
    /// Segment indexes with no render target; writes to them fail with `MissingTarget`.
    pub missing_segments: BTreeSet<usize>,
    pub writes: u64,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing_segments(mut self, indexes: impl IntoIterator<Item = usize>) -> Self {
        self.missing_segments = indexes.into_iter().collect();
        self
    }

    pub fn visible_effects(&self) -> usize {
        self.effects.iter().flatten().count()
    }
}

impl RenderSink for HeadlessSink {
    fn segment(&mut self, visual: &SegmentVisual) -> Result<(), PlatformError> {
        if self.missing_segments.contains(&visual.index) {
            return Err(PlatformError::MissingTarget("segment"));
        }
        if self.segments.len() <= visual.index {
            self.segments.resize(visual.index + 1, *visual);
        }
        self.segments[visual.index] = *visual;
        self.writes += 1;
        Ok(())
    }

    fn effect(&mut self, slot: usize, visual: Option<&EffectVisual>) -> Result<(), PlatformError> {
        if self.effects.len() <= slot {
            self.effects.resize(slot + 1, None);
        }
        self.effects[slot] = visual.copied();
        self.writes += 1;
        Ok(())
    }

    fn content_offset(&mut self, offset: f32) -> Result<(), PlatformError> {
        self.content_offset = Some(offset);
        self.writes += 1;
        Ok(())
    }

    fn scrollbar(&mut self, thumb: &ScrollbarThumb) -> Result<(), PlatformError> {
        self.thumb = Some(*thumb);
        self.thumb_writes += 1;
        self.writes += 1;
        Ok(())
    }

    fn entrance(&mut self, element: ElementId, state: &EntranceState) -> Result<(), PlatformError> {
        self.entrances.insert(element, *state);
        self.writes += 1;
        Ok(())
    }
}

/// A [`VisibilityObserver`] that keeps the observed set in memory.
///
/// Elements listed in `detached` are refused, mimicking nodes that have left the document.
#[derive(Clone, Debug, Default)]
pub struct HeadlessObserver {
    pub observed: BTreeSet<ElementId>,
    pub detached: BTreeSet<ElementId>,
}

impl HeadlessObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detached(mut self, elements: impl IntoIterator<Item = ElementId>) -> Self {
        self.detached = elements.into_iter().collect();
        self
    }
}

impl VisibilityObserver for HeadlessObserver {
    fn observe(&mut self, element: ElementId, _threshold: f32) -> Result<(), PlatformError> {
        if self.detached.contains(&element) {
            return Err(PlatformError::Detached(element));
        }
        self.observed.insert(element);
        Ok(())
    }

    fn unobserve(&mut self, element: ElementId) {
        self.observed.remove(&element);
    }
}
