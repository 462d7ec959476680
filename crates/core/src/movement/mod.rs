//! The two atomic movement kinds a continuity produces.

pub mod move_command;
pub mod stop_command;

use serde::{Deserialize, Serialize};

pub use move_command::MoveCommand;
pub use stop_command::StopCommand;

use crate::geometry::Coordinate;

/// A dot's position and facing at one instant of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub x: f64,
    pub y: f64,
    pub orientation: f64,
    pub marktime: bool,
}

impl AnimationState {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MovementCommand {
    #[serde(rename = "MOVE")]
    Move(MoveCommand),
    #[serde(rename = "STOP")]
    Stop(StopCommand),
}

impl MovementCommand {
    pub fn duration(&self) -> f64 {
        match self {
            MovementCommand::Move(movement) => movement.duration,
            MovementCommand::Stop(stop) => stop.duration,
        }
    }

    pub fn set_duration(&mut self, duration: f64) {
        match self {
            MovementCommand::Move(movement) => movement.duration = duration,
            MovementCommand::Stop(stop) => stop.duration = duration,
        }
    }

    pub fn start_position(&self) -> Coordinate {
        match self {
            MovementCommand::Move(movement) => movement.start,
            MovementCommand::Stop(stop) => stop.position,
        }
    }

    pub fn end_position(&self) -> Coordinate {
        match self {
            MovementCommand::Move(movement) => movement.end_position(),
            MovementCommand::Stop(stop) => stop.position,
        }
    }

    pub fn position_at_beat(&self, beat: f64) -> Coordinate {
        match self {
            MovementCommand::Move(movement) => movement.position_at_beat(beat),
            MovementCommand::Stop(stop) => stop.position,
        }
    }

    pub fn animation_state(&self, beat: f64) -> AnimationState {
        match self {
            MovementCommand::Move(movement) => movement.animation_state(beat),
            MovementCommand::Stop(stop) => stop.animation_state(beat),
        }
    }

    /// Heading of travel for moves; `None` for holds.
    pub fn direction(&self) -> Option<f64> {
        match self {
            MovementCommand::Move(movement) => Some(movement.direction),
            MovementCommand::Stop(_) => None,
        }
    }

    /// Final facing of the dot once this movement is done.
    pub fn orientation(&self) -> f64 {
        match self {
            MovementCommand::Move(movement) => movement.orientation,
            MovementCommand::Stop(stop) => stop.orientation,
        }
    }
}

impl From<MoveCommand> for MovementCommand {
    fn from(movement: MoveCommand) -> Self {
        MovementCommand::Move(movement)
    }
}

impl From<StopCommand> for MovementCommand {
    fn from(stop: StopCommand) -> Self {
        MovementCommand::Stop(stop)
    }
}

/// Total beats taken by a list of movements.
pub fn total_duration(movements: &[MovementCommand]) -> f64 {
    movements.iter().map(MovementCommand::duration).sum()
}

/// Append `next` to `movements`, folding it into the last move when both
/// travel the same way.
pub fn push_merged(movements: &mut Vec<MovementCommand>, next: MovementCommand) {
    if let (Some(MovementCommand::Move(last)), MovementCommand::Move(incoming)) =
        (movements.last_mut(), &next)
    {
        if last.continues_with(incoming) {
            last.duration += incoming.duration;
            return;
        }
    }
    movements.push(next);
}

/// Clip the movements so they take at most `limit` beats. The movement that
/// crosses the limit is shortened to land exactly on it and everything after
/// it is dropped.
pub fn truncate_to(movements: &mut Vec<MovementCommand>, limit: f64) {
    let mut beats = 0.0;
    for i in 0..movements.len() {
        let duration = movements[i].duration();
        if beats + duration >= limit {
            let fitted = (limit - beats).max(0.0);
            movements[i].set_duration(fitted);
            let keep = if fitted > 0.0 { i + 1 } else { i };
            movements.truncate(keep);
            return;
        }
        beats += duration;
    }
}

/// Sample a list of movements at `beat` beats into the sheet. Returns
/// `None` once the beat is past the last movement.
pub fn state_at_beat(movements: &[MovementCommand], beat: f64) -> Option<AnimationState> {
    let mut remaining = beat;
    for movement in movements {
        let beats = crate::geometry::round_small(remaining - movement.duration());
        if beats <= 0.0 {
            return Some(movement.animation_state(remaining));
        }
        remaining = beats;
    }
    None
}
