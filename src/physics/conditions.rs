use std::sync::Arc;

use glam::DVec2;

/// Chooses between the built-in scenarios of a [`selectable`](super::profiles::selectable)
/// condition pair. Conditions that do not branch ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selector(pub u32);

impl Selector {
    pub const PULSE: Selector = Selector(0);
    pub const STANDING: Selector = Selector(1);
}

/// Shared condition function of position, time, wave speed, selector and
/// reference point.
pub type WaveFn = Arc<dyn Fn(f64, f64, f64, f64, Selector, DVec2) -> f64 + Send + Sync>;

/// Local trait allowing convenient conversion into [`WaveFn`].
pub trait IntoWaveFn {
    fn into_wave_fn(self) -> WaveFn;
}

impl IntoWaveFn for f64 {
    fn into_wave_fn(self) -> WaveFn {
        constant(self)
    }
}

impl<F> IntoWaveFn for F
where
    F: Fn(f64, f64, f64, f64, Selector, DVec2) -> f64 + Send + Sync + 'static,
{
    fn into_wave_fn(self) -> WaveFn {
        Arc::new(self)
    }
}

fn constant(val: f64) -> WaveFn {
    Arc::new(move |_, _, _, _, _, _| val)
}

/// Parameters forwarded to every condition evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveParams {
    pub wave_speed: f64,
    pub selector: Selector,
    pub reference: DVec2,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wave_speed: 1.0,
            selector: Selector::STANDING,
            reference: DVec2::ZERO,
        }
    }
}

impl WaveParams {
    pub fn with_wave_speed(mut self, wave_speed: f64) -> Self {
        self.wave_speed = wave_speed;
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_reference(mut self, reference: DVec2) -> Self {
        self.reference = reference;
        self
    }
}

/// The boundary/initial/exact function `f` and the initial velocity `g`.
#[derive(Clone)]
pub struct WaveConditions {
    pub value: WaveFn,
    pub velocity: WaveFn,
}

impl WaveConditions {
    pub fn new(value: impl IntoWaveFn, velocity: impl IntoWaveFn) -> Self {
        Self {
            value: value.into_wave_fn(),
            velocity: velocity.into_wave_fn(),
        }
    }

    /// Conditions starting from rest.
    pub fn at_rest(value: impl IntoWaveFn) -> Self {
        Self::new(value, 0.0)
    }

    #[inline]
    pub fn value_at(&self, p: DVec2, t: f64, params: &WaveParams) -> f64 {
        (self.value)(p.x, p.y, t, params.wave_speed, params.selector, params.reference)
    }

    #[inline]
    pub fn velocity_at(&self, p: DVec2, t: f64, params: &WaveParams) -> f64 {
        (self.velocity)(p.x, p.y, t, params.wave_speed, params.selector, params.reference)
    }
}

impl std::fmt::Debug for WaveConditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveConditions").finish_non_exhaustive()
    }
}
