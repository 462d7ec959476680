use serde::{Deserialize, Serialize};

use super::AnimationState;
use crate::geometry::{is_equal, Coordinate};
use crate::show::StepType;

fn default_step_size() -> f64 {
    1.0
}

/// A straight-line move along a fixed heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCommand {
    pub start: Coordinate,
    /// Heading of travel, in calchart degrees.
    pub direction: f64,
    /// Length of the move, in beats.
    pub duration: f64,
    pub beats_per_step: u32,
    /// Distance covered per step. Diagonal steps cover one step on each axis.
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    /// Facing while moving; differs from `direction` for slides and backmarches.
    pub orientation: f64,
    #[serde(default)]
    pub step_type: StepType,
}

impl MoveCommand {
    pub fn new(start: Coordinate, direction: f64, duration: f64, beats_per_step: u32) -> Self {
        Self {
            start,
            direction,
            duration,
            beats_per_step: beats_per_step.max(1),
            step_size: 1.0,
            orientation: direction,
            step_type: StepType::Default,
        }
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_step_type(mut self, step_type: StepType) -> Self {
        self.step_type = step_type;
        self
    }

    /// Number of steps taken over the given number of beats.
    fn steps(&self, beats: f64) -> f64 {
        beats / self.beats_per_step as f64
    }

    pub fn position_at_beat(&self, beat: f64) -> Coordinate {
        let beat = beat.clamp(0.0, self.duration);
        self.start
            .offset(self.direction, self.steps(beat) * self.step_size)
    }

    pub fn end_position(&self) -> Coordinate {
        self.position_at_beat(self.duration)
    }

    pub fn animation_state(&self, beat: f64) -> AnimationState {
        let position = self.position_at_beat(beat);
        AnimationState {
            x: position.x,
            y: position.y,
            orientation: self.orientation,
            marktime: false,
        }
    }

    /// Whether `other` continues this move without a change of direction or
    /// stride.
    pub fn continues_with(&self, other: &MoveCommand) -> bool {
        self.direction == other.direction
            && self.beats_per_step == other.beats_per_step
            && is_equal(self.step_size, other.step_size)
            && self.orientation == other.orientation
            && self.step_type == other.step_type
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{NORTH, WEST};

    #[test]
    fn test_position_interpolates_and_clamps() {
        let movement = MoveCommand::new(Coordinate::new(0.0, 0.0), NORTH, 4.0, 1);
        assert!(movement.position_at_beat(2.0).approx_eq(&Coordinate::new(2.0, 0.0)));
        assert!(movement.position_at_beat(10.0).approx_eq(&Coordinate::new(4.0, 0.0)));
        assert!(movement.end_position().approx_eq(&Coordinate::new(4.0, 0.0)));
    }

    #[test]
    fn test_beats_per_step_slows_the_move() {
        let movement = MoveCommand::new(Coordinate::new(0.0, 0.0), WEST, 8.0, 2);
        assert_relative_eq!(movement.end_position().y, -4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_change_of_step_type_breaks_the_move() {
        let high = MoveCommand::new(Coordinate::new(0.0, 0.0), NORTH, 4.0, 1)
            .with_step_type(StepType::HighStep);
        let same = MoveCommand::new(high.end_position(), NORTH, 2.0, 1)
            .with_step_type(StepType::HighStep);
        let slide = same.clone().with_step_type(StepType::MiniMilitary);
        assert!(high.continues_with(&same));
        assert!(!high.continues_with(&slide));
    }

    #[test]
    fn test_diagonal_step_size() {
        let movement = MoveCommand::new(Coordinate::new(0.0, 0.0), 315.0, 3.0, 1)
            .with_step_size(std::f64::consts::SQRT_2);
        assert!(movement.end_position().approx_eq(&Coordinate::new(3.0, 3.0)));
    }
}
