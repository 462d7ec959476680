use serde::{Deserialize, Serialize};

use super::options::ContinuityOptions;
use super::{hold, ContinuityBehavior, ContinuityContext, ContinuityInfo, MovementState};
use crate::error::Result;
use crate::geometry::{calc_angle, is_equal, rotate_about, Coordinate};
use crate::movement::{push_merged, MoveCommand, MovementCommand};
use crate::show::DotId;

/// Swing every dot of the scope about a reference point. All dots share the
/// same angular step, sized so the outermost dot covers about one step of
/// arc per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateTurnContinuity {
    pub degrees: f64,
    #[serde(rename = "isCW")]
    pub is_cw: bool,
    pub reference: Coordinate,
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl GateTurnContinuity {
    pub fn new(degrees: f64, is_cw: bool, reference: Coordinate) -> Self {
        Self {
            degrees,
            is_cw,
            reference,
            options: ContinuityOptions::default(),
        }
    }

    /// Number of steps the turn takes for a given outermost radius.
    pub fn num_steps(&self, max_radius: f64) -> u32 {
        let arc = max_radius * self.degrees.abs().to_radians();
        arc.ceil().clamp(1.0, u32::MAX as f64) as u32
    }

    fn signed_degrees(&self) -> f64 {
        if self.is_cw {
            self.degrees
        } else {
            -self.degrees
        }
    }
}

impl ContinuityBehavior for GateTurnContinuity {
    fn info(&self) -> ContinuityInfo {
        ContinuityInfo {
            tag: "GATE",
            name: "Gate Turn",
        }
    }

    fn text(&self) -> String {
        let turn = if self.is_cw { "CW" } else { "CCW" };
        format!("GT {turn} {} deg", self.degrees)
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        _dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        if self.degrees == 0.0 {
            return Ok(Vec::new());
        }
        let resolved = self.options.resolve(&ctx.defaults);
        let bps = resolved.beats_per_step;

        let max_radius = ctx
            .dots_in_scope()
            .into_iter()
            .filter_map(|other| ctx.start_position(other))
            .chain(std::iter::once(state.position))
            .map(|position| position.distance(&self.reference))
            .fold(0.0, f64::max);
        let steps = self.num_steps(max_radius);
        let step_angle = self.signed_degrees() / steps as f64;
        // chords past the end of the sheet would be clipped anyway
        let fits = (state.remaining / bps as f64).ceil().clamp(0.0, u32::MAX as f64) as u32;

        if is_equal(state.position.distance(&self.reference), 0.0) {
            let beats = (steps as f64 * bps as f64).min(state.remaining);
            return Ok(hold(state.position, resolved.orientation, beats, true, bps)
                .into_iter()
                .collect());
        }

        let mut movements = Vec::new();
        let mut previous = state.position;
        for step in 1..=steps.min(fits) {
            let next = rotate_about(&state.position, &self.reference, step_angle * step as f64);
            let chord = previous.distance(&next);
            let direction = calc_angle(previous.x, previous.y, next.x, next.y);
            let movement = MoveCommand::new(previous, direction, bps as f64, bps)
                .with_step_size(chord)
                .with_step_type(resolved.step_type);
            push_merged(&mut movements, movement.into());
            previous = next;
        }
        Ok(movements)
    }
}
