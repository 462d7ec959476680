use serde::{Deserialize, Serialize};

use super::options::{ContinuityOptions, End};
use super::{hold, ContinuityBehavior, ContinuityContext, ContinuityInfo, MovementState};
use crate::error::Result;
use crate::geometry::x_direction;
use crate::movement::{MoveCommand, MovementCommand};
use crate::show::DotId;

/// Sidestep north or south to the next sheet's x position while facing the
/// resolved orientation, then hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrapevineContinuity {
    #[serde(default)]
    pub end: End,
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl GrapevineContinuity {
    pub fn new(end: End) -> Self {
        Self {
            end,
            options: ContinuityOptions::default(),
        }
    }
}

impl ContinuityBehavior for GrapevineContinuity {
    fn info(&self) -> ContinuityInfo {
        ContinuityInfo {
            tag: "GRAPEVINE",
            name: "Grapevine",
        }
    }

    fn text(&self) -> String {
        "Grapevine".to_string()
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        let Some(end) = ctx.next_position(dot) else {
            return Ok(Vec::new());
        };
        let delta_x = end.x - state.position.x;
        if delta_x == 0.0 {
            return Ok(Vec::new());
        }

        let resolved = self.options.resolve(&ctx.defaults);
        let bps = resolved.beats_per_step;
        let duration = delta_x.abs() * bps as f64;
        let movement = MoveCommand::new(state.position, x_direction(delta_x), duration, bps)
            .with_orientation(resolved.orientation)
            .with_step_type(resolved.step_type);
        let position = movement.end_position();

        let mut movements = vec![MovementCommand::Move(movement)];
        movements.extend(hold(
            position,
            resolved.orientation,
            state.remaining - duration,
            self.end.is_marktime(),
            bps,
        ));
        Ok(movements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, NORTH, SOUTH};
    use crate::movement::total_duration;
    use crate::show::{DotType, SheetId, Show};

    fn grapevine_show(end: Coordinate, sheets: usize) -> (Show, SheetId) {
        let mut show = Show::new("Grapevine", 1);
        let first = show.add_sheet(8);
        for _ in 1..sheets {
            let next = show.add_sheet(8);
            show.set_position(&next, DotId(0), end).unwrap();
        }
        (show, first)
    }

    fn run(show: &Show, sheet: &SheetId) -> Vec<MovementCommand> {
        let owner = show.sheet(sheet).unwrap();
        let ctx = ContinuityContext::new(show, owner, DotType::Plain);
        let state = MovementState {
            position: Coordinate::default(),
            remaining: 8.0,
        };
        GrapevineContinuity::new(End::MT)
            .movements(&ctx, DotId(0), &state)
            .unwrap()
    }

    #[test]
    fn test_sidestep_then_mark_time() {
        let (show, sheet) = grapevine_show(Coordinate::new(3.0, 0.0), 2);
        let movements = run(&show, &sheet);

        assert_eq!(movements.len(), 2);
        match &movements[0] {
            MovementCommand::Move(movement) => {
                assert_eq!(movement.direction, NORTH);
                assert_eq!(movement.duration, 3.0);
            }
            other => panic!("expected a move, got {:?}", other),
        }
        match &movements[1] {
            MovementCommand::Stop(stop) => {
                assert_eq!(stop.duration, 5.0);
                assert!(stop.marktime);
                assert!(stop.position.approx_eq(&Coordinate::new(3.0, 0.0)));
            }
            other => panic!("expected a hold, got {:?}", other),
        }
        assert_eq!(total_duration(&movements), 8.0);

        let (show, sheet) = grapevine_show(Coordinate::new(-2.0, 0.0), 2);
        assert_eq!(run(&show, &sheet)[0].direction(), Some(SOUTH));
    }

    #[test]
    fn test_same_x_produces_nothing() {
        let (show, sheet) = grapevine_show(Coordinate::new(0.0, 6.0), 2);
        assert!(run(&show, &sheet).is_empty());
    }

    #[test]
    fn test_last_sheet_produces_nothing() {
        let (show, sheet) = grapevine_show(Coordinate::default(), 1);
        assert!(run(&show, &sheet).is_empty());
    }
}
