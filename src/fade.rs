//! Time-driven fade-out of the scratch layer.
//!
//! In fading draw mode a finished stroke is not committed. Instead the
//! controller lowers the scratch layer opacity one step per tick until it
//! reaches zero, then clears the layer. The controller does not own a timer;
//! whoever runs the event loop calls [`FadeController::tick`] at the configured
//! cadence (see [`crate::runtime::OverlayLoop`]).

use std::time::Duration;

use crate::config::FadeConfig;
use crate::draw::Compositor;
use crate::error::OverlayError;
use log::{debug, warn};

/// Default opacity removed per tick.
pub const DEFAULT_FADE_STEP: f64 = 0.02;

/// Default tick cadence (roughly 60 Hz).
pub const DEFAULT_FADE_TICK: Duration = Duration::from_millis(16);

/// Opacity at or below which the fade counts as finished.
const FADE_EPSILON: f64 = 1e-9;

/// Runtime settings for the fade animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeSettings {
    /// Opacity removed per tick
    pub step: f64,
    /// Delay between ticks
    pub tick: Duration,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            step: DEFAULT_FADE_STEP,
            tick: DEFAULT_FADE_TICK,
        }
    }
}

impl From<&FadeConfig> for FadeSettings {
    fn from(cfg: &FadeConfig) -> Self {
        Self {
            step: cfg.step,
            tick: Duration::from_millis(cfg.tick_ms),
        }
    }
}

/// Outcome of a single fade tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeTick {
    /// Still fading; schedule another tick
    Continue,
    /// Nothing left to fade; the controller is idle
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FadeState {
    Idle,
    Active { generation: u64 },
}

/// Single-instance fade state machine: `Idle -> Active -> Idle`.
///
/// Every [`FadeController::start`] bumps a generation counter, so a timer
/// scheduled for an older fade can tell it has been superseded.
pub struct FadeController {
    settings: FadeSettings,
    state: FadeState,
    next_generation: u64,
}

impl FadeController {
    /// Creates an idle controller.
    ///
    /// A step that is not a positive finite number would never finish a fade
    /// and falls back to [`DEFAULT_FADE_STEP`].
    pub fn new(mut settings: FadeSettings) -> Self {
        if !(settings.step.is_finite() && settings.step > 0.0) {
            warn!(
                "Invalid fade step {}, using {}",
                settings.step, DEFAULT_FADE_STEP
            );
            settings.step = DEFAULT_FADE_STEP;
        }
        Self {
            settings,
            state: FadeState::Idle,
            next_generation: 0,
        }
    }

    pub fn settings(&self) -> FadeSettings {
        self.settings
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, FadeState::Active { .. })
    }

    /// Generation of the running fade, if any.
    pub fn generation(&self) -> Option<u64> {
        match self.state {
            FadeState::Active { generation } => Some(generation),
            FadeState::Idle => None,
        }
    }

    /// Starts a new fade, superseding any fade already running.
    pub fn start(&mut self) -> u64 {
        if let FadeState::Active { generation } = self.state {
            debug!("Fade {generation} superseded");
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.state = FadeState::Active { generation };
        debug!(
            "Fade {generation} started (step {}, tick {:?})",
            self.settings.step, self.settings.tick
        );
        generation
    }

    /// Stops the running fade. Returns `true` if one was active.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            FadeState::Active { generation } => {
                debug!("Fade {generation} cancelled");
                self.state = FadeState::Idle;
                true
            }
            FadeState::Idle => false,
        }
    }

    /// Advances the fade by one step.
    ///
    /// Goes idle without error when the scratch layer was emptied elsewhere
    /// (flattened or cleared) since the last tick.
    pub fn tick(&mut self, compositor: &mut Compositor) -> Result<FadeTick, OverlayError> {
        let FadeState::Active { generation } = self.state else {
            return Ok(FadeTick::Finished);
        };

        if compositor.scratch_is_empty() {
            debug!("Fade {generation} found an empty scratch layer; stopping");
            self.state = FadeState::Idle;
            return Ok(FadeTick::Finished);
        }

        let opacity = compositor.scratch_opacity() - self.settings.step;
        if opacity <= FADE_EPSILON {
            compositor.clear_scratch()?;
            compositor.set_scratch_opacity(1.0);
            self.state = FadeState::Idle;
            debug!("Fade {generation} finished");
            return Ok(FadeTick::Finished);
        }

        compositor.set_scratch_opacity(opacity);
        Ok(FadeTick::Continue)
    }
}

impl Default for FadeController {
    fn default() -> Self {
        Self::new(FadeSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{BrushStyle, Point, SurfaceSize, WHITE};
    use crate::input::BrushType;

    fn compositor_with_stroke() -> Compositor {
        let mut compositor = Compositor::new(SurfaceSize::new(64, 64, 1.0).unwrap()).unwrap();
        compositor
            .draw_segment(
                Point::new(8.0, 32.0),
                Point::new(56.0, 32.0),
                &BrushStyle::default(),
                BrushType::Round,
                WHITE,
            )
            .unwrap();
        compositor
    }

    #[test]
    fn fade_clears_scratch_within_fifty_ticks() {
        let mut compositor = compositor_with_stroke();
        assert_eq!(compositor.scratch_opacity(), 1.0);
        let mut fade = FadeController::default();
        fade.start();

        let mut ticks = 0;
        while fade.tick(&mut compositor).unwrap() == FadeTick::Continue {
            ticks += 1;
            assert!(ticks < 50, "fade did not terminate");
        }

        assert!(!fade.is_active());
        assert!(compositor.scratch_is_empty());
        assert_eq!(compositor.scratch_opacity(), 1.0);
    }

    #[test]
    fn opacity_drops_by_one_step_per_tick() {
        let mut compositor = compositor_with_stroke();
        let mut fade = FadeController::new(FadeSettings {
            step: 0.25,
            tick: Duration::from_millis(1),
        });
        fade.start();
        assert_eq!(fade.tick(&mut compositor).unwrap(), FadeTick::Continue);
        assert!((compositor.scratch_opacity() - 0.75).abs() < 1e-12);
        assert_eq!(fade.tick(&mut compositor).unwrap(), FadeTick::Continue);
        assert_eq!(fade.tick(&mut compositor).unwrap(), FadeTick::Continue);
        assert_eq!(fade.tick(&mut compositor).unwrap(), FadeTick::Finished);
        assert!(compositor.scratch_is_empty());
    }

    #[test]
    fn externally_emptied_scratch_ends_the_fade() {
        let mut compositor = compositor_with_stroke();
        let mut fade = FadeController::default();
        fade.start();
        compositor.flatten().unwrap();

        assert_eq!(fade.tick(&mut compositor).unwrap(), FadeTick::Finished);
        assert!(!fade.is_active());
    }

    #[test]
    fn non_positive_step_falls_back_to_default() {
        for step in [0.0, -0.5, f64::NAN] {
            let fade = FadeController::new(FadeSettings {
                step,
                tick: Duration::from_millis(1),
            });
            assert_eq!(fade.settings().step, DEFAULT_FADE_STEP);
        }

        let mut compositor = compositor_with_stroke();
        let mut fade = FadeController::new(FadeSettings {
            step: 0.0,
            tick: Duration::from_millis(1),
        });
        fade.start();
        let mut ticks = 0;
        while fade.tick(&mut compositor).unwrap() == FadeTick::Continue {
            ticks += 1;
            assert!(ticks < 60, "fade did not terminate");
        }
    }

    #[test]
    fn restarting_supersedes_the_previous_generation() {
        let mut fade = FadeController::default();
        let first = fade.start();
        let second = fade.start();
        assert_ne!(first, second);
        assert_eq!(fade.generation(), Some(second));
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let mut compositor = compositor_with_stroke();
        let mut fade = FadeController::default();
        assert_eq!(fade.tick(&mut compositor).unwrap(), FadeTick::Finished);
        assert!(!compositor.scratch_is_empty());
        assert!(!fade.cancel());
    }
}
