use serde::{Deserialize, Serialize};

use super::options::ContinuityOptions;
use super::{hold, ContinuityBehavior, ContinuityContext, ContinuityInfo, MovementState};
use crate::error::Result;
use crate::movement::MovementCommand;
use crate::show::{DotId, Orientation};

/// Mark time or close, for a fixed number of beats or for whatever is left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopContinuity {
    pub marktime: bool,
    /// Beats to hold; `None` holds for the rest of the sheet.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl StopContinuity {
    pub fn new(marktime: bool, duration: Option<f64>) -> Self {
        Self {
            marktime,
            duration,
            options: ContinuityOptions::default(),
        }
    }
}

impl ContinuityBehavior for StopContinuity {
    fn info(&self) -> ContinuityInfo {
        let name = match (self.marktime, self.duration) {
            (true, Some(_)) => "Mark Time",
            (true, None) => "Mark Time Remaining",
            (false, _) => "Close",
        };
        ContinuityInfo { tag: "STOP", name }
    }

    fn text(&self) -> String {
        let facing = match self.options.orientation {
            Orientation::East => " E",
            Orientation::West => " W",
            Orientation::Default => "",
        };
        match (self.marktime, self.duration) {
            (true, Some(beats)) => format!("MT {beats}{facing}"),
            (true, None) => format!("MTRM{facing}"),
            (false, _) => format!("Close{facing}"),
        }
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        _dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        let resolved = self.options.resolve(&ctx.defaults);
        let beats = self
            .duration
            .map_or(state.remaining, |beats| beats.min(state.remaining));
        Ok(hold(
            state.position,
            resolved.orientation,
            beats,
            self.marktime,
            resolved.beats_per_step,
        )
        .into_iter()
        .collect())
    }
}
