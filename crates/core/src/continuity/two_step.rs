use serde::{Deserialize, Serialize};

use super::options::ContinuityOptions;
use super::ordered;
use super::{
    append_clipped, hold, ContinuityBehavior, ContinuityContext, ContinuityInfo, ContinuityKind,
    MovementState,
};
use crate::error::{DrillError, Result};
use crate::movement::MovementCommand;
use crate::show::DotId;

fn default_step_delay() -> f64 {
    2.0
}

fn default_marktime() -> bool {
    true
}

/// A staggered chain: the dot at position i in the order waits
/// `i * step_delay` steps, then runs the sub-continuities in sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoStepContinuity {
    pub order: Vec<DotId>,
    #[serde(default = "default_step_delay")]
    pub step_delay: f64,
    #[serde(default = "default_marktime")]
    pub is_marktime: bool,
    #[serde(default)]
    continuities: Vec<ContinuityKind>,
    #[serde(flatten)]
    pub options: ContinuityOptions,
}

impl TwoStepContinuity {
    pub fn new(order: Vec<DotId>, continuities: Vec<ContinuityKind>) -> Result<Self> {
        let mut two_step = Self {
            order,
            step_delay: default_step_delay(),
            is_marktime: default_marktime(),
            continuities: Vec::with_capacity(continuities.len()),
            options: ContinuityOptions::default(),
        };
        for continuity in continuities {
            two_step.add_continuity(continuity)?;
        }
        Ok(two_step)
    }

    pub fn continuities(&self) -> &[ContinuityKind] {
        &self.continuities
    }

    pub fn add_continuity(&mut self, continuity: ContinuityKind) -> Result<()> {
        if matches!(continuity, ContinuityKind::TwoStep(_)) {
            return Err(DrillError::NestedTwoStep);
        }
        self.continuities.push(continuity);
        Ok(())
    }

    pub fn remove_continuity(&mut self, index: usize) -> Option<ContinuityKind> {
        (index < self.continuities.len()).then(|| self.continuities.remove(index))
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
}

impl ContinuityBehavior for TwoStepContinuity {
    fn info(&self) -> ContinuityInfo {
        ContinuityInfo {
            tag: "TWO",
            name: "Two Step",
        }
    }

    fn text(&self) -> String {
        let steps: Vec<String> = self.continuities.iter().map(|c| c.text()).collect();
        format!("2-Step: {}", steps.join(", "))
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        let resolved = self.options.resolve(&ctx.defaults);
        let bps = resolved.beats_per_step;
        let index = self.order_index(dot).unwrap_or(0);

        let mut movements = Vec::new();
        let mut chain = *state;
        let delay = index as f64 * self.step_delay * bps as f64;
        let wait: Vec<MovementCommand> = hold(
            chain.position,
            resolved.orientation,
            delay,
            self.is_marktime,
            bps,
        )
        .into_iter()
        .collect();
        append_clipped(&mut movements, &mut chain, wait);

        for continuity in &self.continuities {
            if chain.remaining <= 0.0 {
                break;
            }
            let produced = continuity.movements(ctx, dot, &chain)?;
            append_clipped(&mut movements, &mut chain, produced);
        }
        Ok(movements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuity::StopContinuity;

    #[test]
    fn test_rejects_nested_two_step() {
        let inner = TwoStepContinuity::new(Vec::new(), Vec::new()).unwrap();
        let err = TwoStepContinuity::new(Vec::new(), vec![ContinuityKind::TwoStep(inner)])
            .unwrap_err();
        assert!(matches!(err, DrillError::NestedTwoStep));
    }

    #[test]
    fn test_text_lists_sub_continuities() {
        let two = TwoStepContinuity::new(
            vec![DotId(0)],
            vec![ContinuityKind::Stop(StopContinuity::new(true, None))],
        )
        .unwrap();
        assert_eq!(two.text(), "2-Step: MTRM");
        assert_eq!(two.step_delay, 2.0);
        assert!(two.is_marktime);
    }
}
