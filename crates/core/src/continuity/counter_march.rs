use serde::{Deserialize, Serialize};

use super::options::ContinuityOptions;
use super::ordered::{self, follow_path, CyclePolicy, PathWalk};
use super::{ContinuityBehavior, ContinuityContext, ContinuityInfo, MovementState};
use crate::error::Result;
use crate::geometry::Coordinate;
use crate::movement::MovementCommand;
use crate::show::DotId;

/// Each dot marches through the start positions of the dots ahead of it up
/// to the leader, then turns into the tail of the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterMarchContinuity {
    /// Head of the line; `None` uses the first dot in `order`.
    #[serde(default)]
    pub leader: Option<DotId>,
    pub order: Vec<DotId>,
    /// Beats to march; `None` marches for the rest of the sheet.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub cycle: CyclePolicy,
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl CounterMarchContinuity {
    pub fn new(order: Vec<DotId>) -> Self {
        Self {
            leader: order.first().copied(),
            order,
            duration: None,
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

    /// The order rotated so the leader comes first.
    fn line(&self) -> Vec<DotId> {
        let mut line = self.order.clone();
        if let Some(head) = self.leader.and_then(|leader| self.order_index(leader)) {
            line.rotate_left(head);
        }
        line
    }
}

impl ContinuityBehavior for CounterMarchContinuity {
    fn info(&self) -> ContinuityInfo {
        ContinuityInfo {
            tag: "CM",
            name: "Counter March",
        }
    }

    fn text(&self) -> String {
        match self.duration {
            Some(beats) => format!("Countermarch {beats}"),
            None => "Countermarch".to_string(),
        }
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        let line = self.line();
        let Some(index) = ordered::order_index(&line, dot) else {
            return Ok(Vec::new());
        };
        let resolved = self.options.resolve(&ctx.defaults);

        // ahead toward the leader, then wrap around to the tail
        let mut points: Vec<Coordinate> = vec![state.position];
        points.extend(
            line[..index]
                .iter()
                .rev()
                .chain(line[index + 1..].iter().rev())
                .filter_map(|&other| ctx.start_position(other)),
        );

        let max_duration = self
            .duration
            .map_or(state.remaining, |beats| beats.min(state.remaining));
        Ok(follow_path(
            &points,
            &PathWalk {
                max_duration,
                beats_per_step: resolved.beats_per_step,
                step_type: resolved.step_type,
                cycle: self.cycle,
            },
        ))
    }
}
