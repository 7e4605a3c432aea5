//! Event loop that drives fade ticks alongside host commands.
//!
//! Pointer events, commands and fade ticks all run on one `calloop` loop, so a
//! tick can never interleave with a stroke being drawn. The loop owns the
//! engine; hosts go through [`OverlayLoop::with_state`] (or the pointer
//! shortcut) so the fade timer is resynchronised after every call.

use crate::error::OverlayError;
use crate::fade::FadeTick;
use crate::input::{OverlayState, PointerEvent};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, RegistrationToken};
use log::{debug, warn};
use std::time::Duration;

pub struct OverlayLoop {
    event_loop: EventLoop<'static, OverlayState>,
    state: OverlayState,
    /// Fade generation the registered timer belongs to
    fade_timer: Option<(u64, RegistrationToken)>,
}

impl OverlayLoop {
    pub fn new(state: OverlayState) -> Result<Self, OverlayError> {
        let event_loop =
            EventLoop::try_new().map_err(|err| OverlayError::EventLoop(err.to_string()))?;
        Ok(Self {
            event_loop,
            state,
            fade_timer: None,
        })
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Runs `f` against the engine, then reschedules the fade timer if the
    /// call started or stopped a fade.
    pub fn with_state<R>(
        &mut self,
        f: impl FnOnce(&mut OverlayState) -> R,
    ) -> Result<R, OverlayError> {
        let result = f(&mut self.state);
        self.sync_fade_timer()?;
        Ok(result)
    }

    /// Feeds one pointer event to the engine.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<(), OverlayError> {
        self.with_state(|state| state.handle_pointer(event))?
    }

    pub fn is_fading(&self) -> bool {
        self.state.is_fading()
    }

    /// Runs one loop iteration, waiting at most `timeout` for a timer.
    pub fn dispatch(&mut self, timeout: Option<Duration>) -> Result<(), OverlayError> {
        self.event_loop
            .dispatch(timeout, &mut self.state)
            .map_err(|err| OverlayError::EventLoop(err.to_string()))?;

        // A finished fade drops its own timer source.
        if self.state.fade_generation().is_none() {
            self.fade_timer = None;
        }
        Ok(())
    }

    /// Dispatches until the running fade finishes or `max_iterations` is hit.
    ///
    /// Returns the number of iterations used.
    pub fn run_until_idle(&mut self, max_iterations: usize) -> Result<usize, OverlayError> {
        let tick = self.state.fade_settings().tick;
        let mut iterations = 0;
        while self.state.is_fading() && iterations < max_iterations {
            self.dispatch(Some(tick))?;
            iterations += 1;
        }
        if self.state.is_fading() {
            warn!("Fade still running after {iterations} loop iterations");
        }
        Ok(iterations)
    }

    /// Returns the engine, dropping the loop.
    pub fn into_state(self) -> OverlayState {
        self.state
    }

    fn sync_fade_timer(&mut self) -> Result<(), OverlayError> {
        let generation = self.state.fade_generation();
        if generation == self.fade_timer.map(|(current, _)| current) {
            return Ok(());
        }

        let handle = self.event_loop.handle();
        if let Some((stale, token)) = self.fade_timer.take() {
            debug!("Removing timer for fade {stale}");
            handle.remove(token);
        }

        let Some(generation) = generation else {
            return Ok(());
        };

        let tick = self.state.fade_settings().tick;
        let token = handle
            .insert_source(Timer::from_duration(tick), move |_, _, state| {
                if state.fade_generation() != Some(generation) {
                    return TimeoutAction::Drop;
                }
                match state.fade_tick() {
                    Ok(FadeTick::Continue) => TimeoutAction::ToDuration(tick),
                    Ok(FadeTick::Finished) => TimeoutAction::Drop,
                    Err(err) => {
                        warn!("Fade {generation} aborted: {err}");
                        state.cancel_fade();
                        TimeoutAction::Drop
                    }
                }
            })
            .map_err(|err| OverlayError::EventLoop(err.error.to_string()))?;

        debug!("Scheduled fade {generation} every {tick:?}");
        self.fade_timer = Some((generation, token));
        Ok(())
    }
}
