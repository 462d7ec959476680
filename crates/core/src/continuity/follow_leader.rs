use serde::{Deserialize, Serialize};

use super::options::ContinuityOptions;
use super::ordered::{self, follow_path, CyclePolicy, PathWalk};
use super::{ContinuityBehavior, ContinuityContext, ContinuityInfo, MovementState};
use crate::error::Result;
use crate::geometry::Coordinate;
use crate::movement::MovementCommand;
use crate::show::DotId;

/// Dots file behind a leader along a recorded path. Each dot first walks
/// through the positions of the dots ahead of it, then the path itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowLeaderContinuity {
    pub order: Vec<DotId>,
    pub path: Vec<Coordinate>,
    #[serde(default)]
    pub cycle: CyclePolicy,
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl FollowLeaderContinuity {
    pub fn new(order: Vec<DotId>, path: Vec<Coordinate>) -> Self {
        Self {
            order,
            path,
            cycle: CyclePolicy::default(),
            options: ContinuityOptions::default(),
        }
    }

    pub fn with_cycle(mut self, cycle: CyclePolicy) -> Self {
        self.cycle = cycle;
        self
    }

    pub fn order_index(&self, dot: DotId) -> Option<usize> {
        ordered::order_index(&self.order, dot)
    }

    pub fn set_order(&mut self, order: Vec<DotId>) {
        self.order = order;
    }

    pub fn move_in_order(&mut self, from: usize, to: usize) -> bool {
        ordered::move_in_order(&mut self.order, from, to)
    }

    pub fn add_point(&mut self, index: usize, point: Coordinate) {
        let index = index.min(self.path.len());
        self.path.insert(index, point);
    }

    pub fn remove_point(&mut self, index: usize) -> Option<Coordinate> {
        (index < self.path.len()).then(|| self.path.remove(index))
    }

    pub fn set_point(&mut self, index: usize, point: Coordinate) -> bool {
        match self.path.get_mut(index) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    pub fn set_path(&mut self, path: Vec<Coordinate>) {
        self.path = path;
    }

    /// The points `dot` walks: its own position, the dots ahead of it from
    /// nearest to the leader, then the recorded path.
    fn points_for(
        &self,
        ctx: &ContinuityContext<'_>,
        index: usize,
        start: Coordinate,
    ) -> Vec<Coordinate> {
        let mut points = vec![start];
        points.extend(
            self.order[..index]
                .iter()
                .rev()
                .filter_map(|&ahead| ctx.start_position(ahead)),
        );
        points.extend(self.path.iter().copied());
        points
    }
}

impl ContinuityBehavior for FollowLeaderContinuity {
    fn info(&self) -> ContinuityInfo {
        ContinuityInfo {
            tag: "FTL",
            name: "Follow the Leader",
        }
    }

    fn text(&self) -> String {
        "Follow the leader".to_string()
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        let Some(index) = self.order_index(dot) else {
            return Ok(Vec::new());
        };
        let resolved = self.options.resolve(&ctx.defaults);
        let points = self.points_for(ctx, index, state.position);
        Ok(follow_path(
            &points,
            &PathWalk {
                max_duration: state.remaining,
                beats_per_step: resolved.beats_per_step,
                step_type: resolved.step_type,
                cycle: self.cycle,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_editing() {
        let mut ftl = FollowLeaderContinuity::new(vec![DotId(0)], Vec::new());
        ftl.add_point(0, Coordinate::new(1.0, 1.0));
        ftl.add_point(5, Coordinate::new(2.0, 2.0));
        assert_eq!(ftl.path.len(), 2);
        assert!(ftl.set_point(1, Coordinate::new(3.0, 3.0)));
        assert!(!ftl.set_point(4, Coordinate::new(3.0, 3.0)));
        assert_eq!(ftl.remove_point(0), Some(Coordinate::new(1.0, 1.0)));
        assert_eq!(ftl.remove_point(3), None);
        assert_eq!(ftl.path, vec![Coordinate::new(3.0, 3.0)]);
    }

    #[test]
    fn test_cycle_policy_serializes_lowercase() {
        let ftl = FollowLeaderContinuity::new(vec![DotId(2)], Vec::new()).with_cycle(CyclePolicy::Halt);
        let value = serde_json::to_value(&ftl).unwrap();
        assert_eq!(value["cycle"], "halt");
        assert_eq!(value["order"], serde_json::json!([2]));
    }
}
