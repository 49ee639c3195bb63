use frameloop::{
    EffectVisual, ElementId, EntranceState, PlatformError, ScrollbarThumb, SegmentVisual,
};

/// Where a [`Stage`](crate::Stage) pushes its per-frame visual state.
///
/// Every method defaults to a no-op so a host only implements the surfaces it actually has.
/// Returning `Err` means "this target is missing": the stage skips it and logs once.
pub trait RenderSink {
    fn segment(&mut self, visual: &SegmentVisual) -> Result<(), PlatformError> {
        let _ = visual;
        Ok(())
    }

    /// `None` hides the slot.
    fn effect(&mut self, slot: usize, visual: Option<&EffectVisual>) -> Result<(), PlatformError> {
        let _ = (slot, visual);
        Ok(())
    }

    /// Vertical translate for the page content (negative of the virtual offset).
    fn content_offset(&mut self, offset: f32) -> Result<(), PlatformError> {
        let _ = offset;
        Ok(())
    }

    /// Called only on frames where the indicator was recomputed.
    fn scrollbar(&mut self, thumb: &ScrollbarThumb) -> Result<(), PlatformError> {
        let _ = thumb;
        Ok(())
    }

    fn entrance(&mut self, element: ElementId, state: &EntranceState) -> Result<(), PlatformError> {
        let _ = (element, state);
        Ok(())
    }
}
