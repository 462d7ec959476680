use serde::{Deserialize, Serialize};

use super::options::ContinuityOptions;
use super::{hold, ContinuityBehavior, ContinuityContext, ContinuityInfo, MovementState};
use crate::error::Result;
use crate::geometry::calc_angle;
use crate::movement::{MoveCommand, MovementCommand};
use crate::show::DotId;

/// Straight line to the next sheet, spread evenly over every remaining beat.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvenContinuity {
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl ContinuityBehavior for EvenContinuity {
    fn info(&self) -> ContinuityInfo {
        ContinuityInfo {
            tag: "EVEN",
            name: "Even",
        }
    }

    fn text(&self) -> String {
        "Even".to_string()
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
        let Some(end) = ctx.next_position(dot) else {
            return Ok(Vec::new());
        };
        if state.remaining <= 0.0 {
            return Ok(Vec::new());
        }

        let distance = start.distance(&end);
        if distance == 0.0 {
            return Ok(hold(start, resolved.orientation, state.remaining, true, bps)
                .into_iter()
                .collect());
        }

        let direction = calc_angle(start.x, start.y, end.x, end.y);
        let steps = state.remaining / bps as f64;
        let movement = MoveCommand::new(start, direction, state.remaining, bps)
            .with_step_size(distance / steps)
            .with_step_type(resolved.step_type);
        Ok(vec![movement.into()])
    }
}
