//! Helpers shared by continuities that act on an ordered list of dots.

use serde::{Deserialize, Serialize};

use super::diagonal::diagonal_moves;
use crate::geometry::Coordinate;
use crate::movement::{push_merged, MovementCommand};
use crate::show::{DotId, StepType};

/// What a path walk does when it reaches the end of its points and has to
/// start over from the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Keep walking around the path until the beats run out.
    #[default]
    Continue,
    /// Stop at the first wrap.
    Halt,
}

impl CyclePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePolicy::Continue => "continue",
            CyclePolicy::Halt => "halt",
        }
    }
}

/// Position of `dot` in `order`.
pub fn order_index(order: &[DotId], dot: DotId) -> Option<usize> {
    order.iter().position(|&d| d == dot)
}

/// Move the dot at `from` to `to`, shifting the dots in between.
pub fn move_in_order(order: &mut Vec<DotId>, from: usize, to: usize) -> bool {
    if from >= order.len() || to >= order.len() {
        return false;
    }
    let dot = order.remove(from);
    order.insert(to, dot);
    true
}

/// A restartable cursor over a fixed list of points.
pub struct PathCursor<'a> {
    points: &'a [Coordinate],
    index: usize,
}

impl<'a> PathCursor<'a> {
    /// Returns `None` for an empty path.
    pub fn new(points: &'a [Coordinate]) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self { points, index: 0 })
        }
    }

    pub fn current(&self) -> Coordinate {
        self.points[self.index]
    }

    /// True when the next advance goes back to the first point.
    pub fn at_end(&self) -> bool {
        self.index + 1 == self.points.len()
    }

    pub fn advance(&mut self) -> Coordinate {
        self.index = (self.index + 1) % self.points.len();
        self.current()
    }
}

/// Settings for a path walk.
#[derive(Debug, Clone, Copy)]
pub struct PathWalk {
    pub max_duration: f64,
    pub beats_per_step: u32,
    pub step_type: StepType,
    pub cycle: CyclePolicy,
}

/// Walk `points` pairwise with diagonal-first legs until `max_duration`
/// beats are used. A path that wraps before producing any movement yields
/// nothing.
pub fn follow_path(points: &[Coordinate], walk: &PathWalk) -> Vec<MovementCommand> {
    let mut movements: Vec<MovementCommand> = Vec::new();
    let Some(mut path) = PathCursor::new(points) else {
        return movements;
    };

    let mut prev = path.current();
    let mut beats = 0.0;
    while beats < walk.max_duration {
        if path.at_end() {
            if movements.is_empty() {
                return Vec::new();
            }
            if walk.cycle == CyclePolicy::Halt {
                break;
            }
        }
        let next = path.advance();

        let legs = diagonal_moves(prev, next, true, walk.beats_per_step, walk.step_type);
        for mut leg in legs {
            let duration = leg.duration();
            if beats + duration >= walk.max_duration {
                leg.set_duration(walk.max_duration - beats);
                beats = walk.max_duration;
                push_merged(&mut movements, leg);
                break;
            }
            beats += duration;
            push_merged(&mut movements, leg);
        }
        prev = next;
    }
    movements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::total_duration;

    fn walk(max_duration: f64, cycle: CyclePolicy) -> PathWalk {
        PathWalk {
            max_duration,
            beats_per_step: 1,
            step_type: StepType::Default,
            cycle,
        }
    }

    #[test]
    fn test_single_point_path_halts_without_movements() {
        let points = [Coordinate::new(2.0, 2.0)];
        assert!(follow_path(&points, &walk(16.0, CyclePolicy::Continue)).is_empty());
        assert!(follow_path(&[], &walk(16.0, CyclePolicy::Continue)).is_empty());
    }

    #[test]
    fn test_stationary_path_halts() {
        let points = [Coordinate::new(1.0, 1.0), Coordinate::new(1.0, 1.0)];
        assert!(follow_path(&points, &walk(8.0, CyclePolicy::Continue)).is_empty());
    }

    #[test]
    fn test_walk_truncates_on_budget() {
        let points = [Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 0.0)];
        let movements = follow_path(&points, &walk(4.0, CyclePolicy::Halt));
        assert_eq!(movements.len(), 1);
        assert_eq!(total_duration(&movements), 4.0);
        assert!(movements[0].end_position().approx_eq(&Coordinate::new(4.0, 0.0)));
    }

    #[test]
    fn test_cycle_policy_after_progress() {
        let points = [Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 0.0)];

        let halted = follow_path(&points, &walk(8.0, CyclePolicy::Halt));
        assert_eq!(total_duration(&halted), 2.0);

        let continued = follow_path(&points, &walk(8.0, CyclePolicy::Continue));
        assert_eq!(total_duration(&continued), 8.0);
        assert!(continued
            .last()
            .unwrap()
            .end_position()
            .approx_eq(&Coordinate::new(0.0, 0.0)));
    }

    #[test]
    fn test_collinear_legs_merge() {
        let points = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(2.0, 0.0),
            Coordinate::new(5.0, 0.0),
        ];
        let movements = follow_path(&points, &walk(5.0, CyclePolicy::Halt));
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].duration(), 5.0);
    }

    #[test]
    fn test_move_in_order() {
        let mut order = vec![DotId(0), DotId(1), DotId(2)];
        assert!(move_in_order(&mut order, 0, 2));
        assert_eq!(order, vec![DotId(1), DotId(2), DotId(0)]);
        assert!(!move_in_order(&mut order, 3, 0));
        assert_eq!(order_index(&order, DotId(0)), Some(2));
    }
}
