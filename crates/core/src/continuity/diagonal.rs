use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use super::options::{ContinuityOptions, End};
use super::{
    hold, ContinuityBehavior, ContinuityContext, ContinuityInfo, MovementState,
};
use crate::error::Result;
use crate::geometry::{diagonal_direction, is_equal, x_direction, y_direction, Coordinate};
use crate::movement::{total_duration, MoveCommand, MovementCommand};
use crate::show::{DotId, StepType};

/// Split `from -> to` into a 45 degree leg and a straight leg along the axis
/// with the larger delta. Zero-length legs are left out.
pub fn diagonal_moves(
    from: Coordinate,
    to: Coordinate,
    diag_first: bool,
    beats_per_step: u32,
    step_type: StepType,
) -> Vec<MovementCommand> {
    let delta_x = to.x - from.x;
    let delta_y = to.y - from.y;
    let bps = beats_per_step.max(1) as f64;

    let diagonal_steps = delta_x.abs().min(delta_y.abs());
    let straight = if delta_x.abs() > delta_y.abs() {
        (delta_x.abs() - diagonal_steps, x_direction(delta_x))
    } else {
        (delta_y.abs() - diagonal_steps, y_direction(delta_y))
    };

    let diagonal = |start: Coordinate| {
        MoveCommand::new(
            start,
            diagonal_direction(delta_x, delta_y),
            diagonal_steps * bps,
            beats_per_step,
        )
        .with_step_size(SQRT_2)
        .with_step_type(step_type)
    };
    let straight_leg = |start: Coordinate| {
        MoveCommand::new(start, straight.1, straight.0 * bps, beats_per_step)
            .with_step_type(step_type)
    };

    let mut movements = Vec::new();
    let mut position = from;
    let legs: [&dyn Fn(Coordinate) -> MoveCommand; 2] = if diag_first {
        [&diagonal, &straight_leg]
    } else {
        [&straight_leg, &diagonal]
    };
    for leg in legs {
        let movement = leg(position);
        if is_equal(movement.duration, 0.0) {
            continue;
        }
        position = movement.end_position();
        movements.push(MovementCommand::Move(movement));
    }
    movements
}

/// DMHS (diagonal first) or HSDM (straight first) to the next sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagonalContinuity {
    pub diag_first: bool,
    #[serde(default)]
    pub end: End,
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl DiagonalContinuity {
    pub fn new(diag_first: bool, end: End) -> Self {
        Self {
            diag_first,
            end,
            options: ContinuityOptions::default(),
        }
    }
}

impl ContinuityBehavior for DiagonalContinuity {
    fn info(&self) -> ContinuityInfo {
        ContinuityInfo {
            tag: "DIAGONAL",
            name: if self.diag_first { "DMHS" } else { "HSDM" },
        }
    }

    fn text(&self) -> String {
        let name = if self.diag_first { "DMHS" } else { "HSDM" };
        match self.end {
            End::MT => name.to_string(),
            End::CL => format!("{name} then close"),
        }
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        let resolved = self.options.resolve(&ctx.defaults);
        let mut movements = match ctx.next_position(dot) {
            Some(end) => diagonal_moves(
                state.position,
                end,
                self.diag_first,
                resolved.beats_per_step,
                resolved.step_type,
            ),
            None => Vec::new(),
        };

        let position = movements
            .last()
            .map_or(state.position, MovementCommand::end_position);
        let rest = state.remaining - total_duration(&movements);
        movements.extend(hold(
            position,
            resolved.orientation,
            rest,
            self.end.is_marktime(),
            resolved.beats_per_step,
        ));
        Ok(movements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_first_decomposition() {
        let movements = diagonal_moves(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(3.0, 5.0),
            true,
            1,
            StepType::Default,
        );
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].duration(), 3.0);
        assert_eq!(movements[0].direction(), Some(315.0));
        assert_eq!(movements[1].duration(), 2.0);
        assert_eq!(movements[1].direction(), Some(0.0));
        assert!(movements[1]
            .end_position()
            .approx_eq(&Coordinate::new(3.0, 5.0)));
    }

    #[test]
    fn test_straight_first_decomposition() {
        let movements = diagonal_moves(
            Coordinate::new(1.0, 1.0),
            Coordinate::new(-5.0, -1.0),
            false,
            2,
            StepType::Default,
        );
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].direction(), Some(90.0));
        assert_eq!(movements[0].duration(), 8.0);
        assert_eq!(movements[1].direction(), Some(135.0));
        assert_eq!(movements[1].duration(), 4.0);
        assert!(movements[1]
            .end_position()
            .approx_eq(&Coordinate::new(-5.0, -1.0)));
    }

    #[test]
    fn test_pure_diagonal_drops_straight_leg() {
        let movements = diagonal_moves(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(-2.0, 2.0),
            true,
            1,
            StepType::Default,
        );
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].direction(), Some(45.0));
    }

    #[test]
    fn test_no_displacement() {
        let at = Coordinate::new(4.0, 4.0);
        assert!(diagonal_moves(at, at, true, 1, StepType::Default).is_empty());
    }
}
