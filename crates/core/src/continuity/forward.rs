use serde::{Deserialize, Serialize};

use super::options::ContinuityOptions;
use super::{direction_label, ContinuityBehavior, ContinuityContext, ContinuityInfo, MovementState};
use crate::error::Result;
use crate::movement::{MoveCommand, MovementCommand};
use crate::show::DotId;

/// Forward march a fixed number of steps along a heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardContinuity {
    pub steps: f64,
    pub direction: f64,
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl ForwardContinuity {
    pub fn new(steps: f64, direction: f64) -> Self {
        Self {
            steps,
            direction,
            options: ContinuityOptions::default(),
        }
    }
}

impl ContinuityBehavior for ForwardContinuity {
    fn info(&self) -> ContinuityInfo {
        ContinuityInfo {
            tag: "FORWARD",
            name: "Forward March",
        }
    }

    fn text(&self) -> String {
        format!("FM {} {}", self.steps, direction_label(self.direction))
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        _dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        if self.steps <= 0.0 {
            return Ok(Vec::new());
        }
        let resolved = self.options.resolve(&ctx.defaults);
        let bps = resolved.beats_per_step;
        let duration = (self.steps * bps as f64).min(state.remaining);
        let movement = MoveCommand::new(state.position, self.direction, duration, bps)
            .with_step_type(resolved.step_type);
        Ok(vec![movement.into()])
    }
}
