//! Gesture scripts: TOML files that replay pointer input and commands.
//!
//! # Example
//! ```toml
//! [[step]]
//! action = "brush"
//! brush = "arrow"
//!
//! [[step]]
//! action = "stroke"
//! points = [[10.0, 10.0], [120.0, 80.0]]
//!
//! [[step]]
//! action = "undo"
//! ```

use crate::config::ColorSpec;
use crate::draw::{BrushStyle, Point};
use crate::input::{BrushType, DrawMode, PointerEvent};
use crate::runtime::OverlayLoop;
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Loop iterations allowed for a `wait_fade` step without an explicit limit.
const DEFAULT_FADE_WAIT: usize = 1_000;

/// One scripted input or command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    /// Pointer-down on the first point, moves through the rest, release on the last
    Stroke { points: Vec<[f64; 2]> },
    Brush { brush: BrushType },
    Mode { mode: DrawMode },
    /// Updates only the given style fields
    Style {
        #[serde(default)]
        color: Option<ColorSpec>,
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        opacity: Option<f64>,
    },
    Undo,
    Redo,
    Reset,
    Fill { color: ColorSpec },
    Cancel,
    /// Runs the event loop until the current fade finishes
    WaitFade {
        #[serde(default)]
        max_iterations: Option<usize>,
    },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Down { .. } => "down",
            Step::Move { .. } => "move",
            Step::Up { .. } => "up",
            Step::Stroke { .. } => "stroke",
            Step::Brush { .. } => "brush",
            Step::Mode { .. } => "mode",
            Step::Style { .. } => "style",
            Step::Undo => "undo",
            Step::Redo => "redo",
            Step::Reset => "reset",
            Step::Fill { .. } => "fill",
            Step::Cancel => "cancel",
            Step::WaitFade { .. } => "wait_fade",
        }
    }
}

/// Counters reported after a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub steps: usize,
    pub strokes: usize,
    pub undone: usize,
    pub redone: usize,
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse gesture script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let script = Self::parse(&source)
            .with_context(|| format!("Invalid script {}", path.display()))?;
        info!("Loaded {} step(s) from {}", script.steps.len(), path.display());
        Ok(script)
    }

    /// Plays every step against the loop, stopping at the first failure.
    pub fn replay(&self, overlay: &mut OverlayLoop) -> Result<ReplayStats> {
        let mut stats = ReplayStats::default();
        for (index, step) in self.steps.iter().enumerate() {
            run_step(overlay, step, &mut stats)
                .with_context(|| format!("Step {} ({}) failed", index + 1, step.name()))?;
            stats.steps += 1;
        }
        debug!("Replay finished: {stats:?}");
        Ok(stats)
    }
}

fn run_step(overlay: &mut OverlayLoop, step: &Step, stats: &mut ReplayStats) -> Result<()> {
    match step {
        Step::Down { x, y } => overlay.handle_pointer(PointerEvent::Down(Point::new(*x, *y)))?,
        Step::Move { x, y } => overlay.handle_pointer(PointerEvent::Move(Point::new(*x, *y)))?,
        Step::Up { x, y } => {
            if overlay.state().is_drawing() {
                stats.strokes += 1;
            }
            overlay.handle_pointer(PointerEvent::Up(Point::new(*x, *y)))?;
        }
        Step::Stroke { points } => {
            let Some((first, rest)) = points.split_first() else {
                bail!("stroke needs at least one point");
            };
            overlay.handle_pointer(PointerEvent::Down(Point::new(first[0], first[1])))?;
            for [x, y] in rest {
                overlay.handle_pointer(PointerEvent::Move(Point::new(*x, *y)))?;
            }
            let last = rest.last().unwrap_or(first);
            overlay.handle_pointer(PointerEvent::Up(Point::new(last[0], last[1])))?;
            stats.strokes += 1;
        }
        Step::Brush { brush } => overlay.with_state(|state| state.set_brush_type(*brush))?,
        Step::Mode { mode } => overlay.with_state(|state| state.set_draw_mode(*mode))?,
        Step::Style {
            color,
            width,
            opacity,
        } => overlay.with_state(|state| {
            let current = state.style();
            state.set_style(BrushStyle {
                color: color
                    .as_ref()
                    .map_or(current.color, |spec| spec.to_color_or(current.color)),
                width: width.unwrap_or(current.width),
                opacity: opacity.unwrap_or(current.opacity),
            });
        })?,
        Step::Undo => {
            if overlay.with_state(|state| state.undo())?? {
                stats.undone += 1;
            }
        }
        Step::Redo => {
            if overlay.with_state(|state| state.redo())?? {
                stats.redone += 1;
            }
        }
        Step::Reset => overlay.with_state(|state| state.reset())??,
        Step::Fill { color } => {
            let color = color.to_color();
            overlay.with_state(|state| state.fill(color))??
        }
        Step::Cancel => {
            overlay.with_state(|state| state.cancel_stroke())?;
        }
        Step::WaitFade { max_iterations } => {
            let limit = max_iterations.unwrap_or(DEFAULT_FADE_WAIT);
            let used = overlay.run_until_idle(limit)?;
            if overlay.is_fading() {
                warn!("wait_fade gave up after {used} iteration(s)");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{SurfaceSize, read_pixel};
    use crate::fade::FadeSettings;
    use crate::input::{OverlaySettings, OverlayState};
    use std::time::Duration;

    fn overlay() -> OverlayLoop {
        let mut state = OverlayState::new(OverlaySettings {
            fade: FadeSettings {
                step: 0.5,
                tick: Duration::from_millis(1),
            },
            ..OverlaySettings::default()
        });
        state
            .configure_surface(SurfaceSize::new(50, 50, 1.0).unwrap())
            .unwrap();
        OverlayLoop::new(state).unwrap()
    }

    #[test]
    fn parses_every_step_kind() {
        let script = Script::parse(
            r#"
            [[step]]
            action = "brush"
            brush = "dotted"

            [[step]]
            action = "mode"
            mode = "fading"

            [[step]]
            action = "style"
            color = [0, 0, 255]
            width = 3.0

            [[step]]
            action = "down"
            x = 1.0
            y = 2.0

            [[step]]
            action = "move"
            x = 3.0
            y = 4.0

            [[step]]
            action = "up"
            x = 3.0
            y = 4.0

            [[step]]
            action = "wait_fade"

            [[step]]
            action = "fill"
            color = "black"

            [[step]]
            action = "undo"

            [[step]]
            action = "redo"

            [[step]]
            action = "reset"

            [[step]]
            action = "cancel"
            "#,
        )
        .unwrap();

        assert_eq!(script.steps.len(), 12);
        assert_eq!(
            script.steps[0],
            Step::Brush {
                brush: BrushType::Dotted
            }
        );
        assert_eq!(
            script.steps[2],
            Step::Style {
                color: Some(ColorSpec::Rgb([0, 0, 255])),
                width: Some(3.0),
                opacity: None,
            }
        );
        assert_eq!(script.steps[6], Step::WaitFade { max_iterations: None });
        assert_eq!(script.steps[8], Step::Undo);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = Script::parse("[[step]]\naction = \"teleport\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse gesture script"));
    }

    #[test]
    fn replay_draws_and_counts() {
        let script = Script::parse(
            r#"
            [[step]]
            action = "stroke"
            points = [[5.0, 25.0], [45.0, 25.0]]

            [[step]]
            action = "stroke"
            points = [[25.0, 5.0]]

            [[step]]
            action = "undo"

            [[step]]
            action = "undo"

            [[step]]
            action = "redo"
            "#,
        )
        .unwrap();

        let mut overlay = overlay();
        let stats = script.replay(&mut overlay).unwrap();
        assert_eq!(
            stats,
            ReplayStats {
                steps: 5,
                strokes: 2,
                undone: 2,
                redone: 1,
            }
        );

        let mut committed = overlay
            .state()
            .compositor()
            .unwrap()
            .committed_snapshot()
            .unwrap();
        assert_eq!(read_pixel(&mut committed, 25, 25).unwrap(), [255, 0, 0, 255]);
        assert_eq!(read_pixel(&mut committed, 25, 5).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn wait_fade_drains_a_fading_stroke() {
        let script = Script::parse(
            r#"
            [[step]]
            action = "mode"
            mode = "fading"

            [[step]]
            action = "stroke"
            points = [[5.0, 25.0], [45.0, 25.0]]

            [[step]]
            action = "wait_fade"
            "#,
        )
        .unwrap();

        let mut overlay = overlay();
        script.replay(&mut overlay).unwrap();
        assert!(!overlay.is_fading());
        assert!(overlay.state().compositor().unwrap().scratch_is_empty());
    }

    #[test]
    fn failing_step_reports_its_position() {
        let script = Script::parse(
            r#"
            [[step]]
            action = "undo"

            [[step]]
            action = "stroke"
            points = []
            "#,
        )
        .unwrap();

        let err = script.replay(&mut overlay()).unwrap_err();
        assert!(format!("{err:#}").contains("Step 2 (stroke)"));
    }
}
