use frameloop::{
    ChainOptions, DispatcherOptions, EffectOptions, MonitorOptions, ScrollOptions, Viewport,
};

/// Configuration for [`crate::Stage`].
///
/// `reduced_motion` is read once at mount and overrides the per-component flags.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StageOptions {
    pub viewport: Viewport,
    pub content_height: f32,
    pub chain: ChainOptions,
    pub effects: EffectOptions,
    pub scroll: ScrollOptions,
    pub dispatcher: DispatcherOptions,
    /// `None` leaves the monitor out (e.g. outside development builds).
    pub monitor: Option<MonitorOptions>,
    pub reduced_motion: bool,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            content_height: 0.0,
            chain: ChainOptions::default(),
            effects: EffectOptions::default(),
            scroll: ScrollOptions::default(),
            dispatcher: DispatcherOptions::default(),
            monitor: None,
            reduced_motion: false,
        }
    }
}

impl StageOptions {
    pub fn new(viewport: Viewport, content_height: f32) -> Self {
        Self {
            viewport,
            content_height,
            ..Self::default()
        }
    }

    pub fn with_chain(mut self, chain: ChainOptions) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_effects(mut self, effects: EffectOptions) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_scroll(mut self, scroll: ScrollOptions) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: DispatcherOptions) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_monitor(mut self, monitor: Option<MonitorOptions>) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    /// Pushes the stage-wide reduced-motion flag into every component.
    pub(crate) fn resolved(mut self) -> Self {
        if self.reduced_motion {
            self.chain.reduced_motion = true;
            self.effects.reduced_motion = true;
            self.scroll.reduced_motion = true;
            self.dispatcher.reduced_motion = true;
        }
        self
    }
}
