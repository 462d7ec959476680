use serde::{Deserialize, Serialize};

use super::options::{ContinuityOptions, End};
use super::{hold, ContinuityBehavior, ContinuityContext, ContinuityInfo, MovementState};
use crate::error::Result;
use crate::geometry::{x_direction, y_direction, Coordinate};
use crate::movement::{total_duration, MoveCommand, MovementCommand};
use crate::show::DotId;

/// Straight legs along each axis to the next sheet: EWNS takes the y leg
/// first, NSEW the x leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FountainGridContinuity {
    #[serde(rename = "isEWNS")]
    pub is_ewns: bool,
    #[serde(default)]
    pub end: End,
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl FountainGridContinuity {
    pub fn new(is_ewns: bool, end: End) -> Self {
        Self {
            is_ewns,
            end,
            options: ContinuityOptions::default(),
        }
    }

    fn name(&self) -> &'static str {
        if self.is_ewns {
            "EWNS"
        } else {
            "NSEW"
        }
    }
}

impl ContinuityBehavior for FountainGridContinuity {
    fn info(&self) -> ContinuityInfo {
        ContinuityInfo {
            tag: "FOUNTAIN",
            name: self.name(),
        }
    }

    fn text(&self) -> String {
        match self.end {
            End::MT => self.name().to_string(),
            End::CL => format!("{} then close", self.name()),
        }
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        let resolved = self.options.resolve(&ctx.defaults);
        let bps = resolved.beats_per_step;
        let start = state.position;
        let mut movements = Vec::new();

        if let Some(end) = ctx.next_position(dot) {
            let delta_x = end.x - start.x;
            let delta_y = end.y - start.y;
            let y_leg = (delta_y, y_direction(delta_y));
            let x_leg = (delta_x, x_direction(delta_x));
            let legs = if self.is_ewns {
                [y_leg, x_leg]
            } else {
                [x_leg, y_leg]
            };

            let mut position: Coordinate = start;
            for (delta, direction) in legs {
                if delta == 0.0 {
                    continue;
                }
                let movement =
                    MoveCommand::new(position, direction, delta.abs() * bps as f64, bps)
                        .with_step_type(resolved.step_type);
                position = movement.end_position();
                movements.push(MovementCommand::Move(movement));
            }
        }

        let position = movements
            .last()
            .map_or(start, MovementCommand::end_position);
        let rest = state.remaining - total_duration(&movements);
        movements.extend(hold(
            position,
            resolved.orientation,
            rest,
            self.end.is_marktime(),
            bps,
        ));
        Ok(movements)
    }
}
