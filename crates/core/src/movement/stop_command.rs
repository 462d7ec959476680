use serde::{Deserialize, Serialize};

use super::AnimationState;
use crate::geometry::Coordinate;

/// A hold in place: either marking time or standing at a close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopCommand {
    pub position: Coordinate,
    pub orientation: f64,
    pub duration: f64,
    pub marktime: bool,
    pub beats_per_step: u32,
}

impl StopCommand {
    pub fn new(
        position: Coordinate,
        orientation: f64,
        duration: f64,
        marktime: bool,
        beats_per_step: u32,
    ) -> Self {
        Self {
            position,
            orientation,
            duration,
            marktime,
            beats_per_step: beats_per_step.max(1),
        }
    }

    pub fn animation_state(&self, _beat: f64) -> AnimationState {
        AnimationState {
            x: self.position.x,
            y: self.position.y,
            orientation: self.orientation,
            marktime: self.marktime,
        }
    }
}
