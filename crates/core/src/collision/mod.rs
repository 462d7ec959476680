//! Collision detection: every beat of a sheet, every pair of dots.

pub mod queue;

use std::collections::BTreeSet;

pub use queue::{CollisionMessage, CollisionQueue};

use crate::error::{DrillError, Result};
use crate::geometry::Coordinate;
use crate::movement::{state_at_beat, total_duration, MovementCommand};
use crate::show::SheetId;

/// A dot's start position and movements, copied out of a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct DotTrack {
    pub start: Coordinate,
    pub movements: Vec<MovementCommand>,
}

/// Everything a collision pass reads, so it can run without the show.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionJob {
    pub sheet: SheetId,
    pub generation: u64,
    pub num_beats: u32,
    pub dots: Vec<DotTrack>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionReport {
    pub sheet: SheetId,
    pub generation: u64,
    /// Colliding beats for each dot, indexed by dot id.
    pub collisions: Vec<BTreeSet<u32>>,
}

/// Position of a dot at `beat`. Dots without movements have no animation
/// state and take no part in the pass.
fn sample(track: &DotTrack, dot: usize, beat: u32) -> Result<Option<Coordinate>> {
    if track.movements.is_empty() {
        return Ok(None);
    }
    let beat = beat as f64;
    state_at_beat(&track.movements, beat)
        .map(|state| Some(state.position()))
        .ok_or_else(|| DrillError::AnimationState {
            dot,
            beat,
            remaining: beat - total_duration(&track.movements),
        })
}

/// Compare every pair of dots on every beat of the sheet. A collision is
/// recorded on both dots of the pair.
pub fn detect(job: &CollisionJob) -> Result<CollisionReport> {
    let mut collisions = vec![BTreeSet::new(); job.dots.len()];
    for beat in 0..job.num_beats {
        let positions = job
            .dots
            .iter()
            .enumerate()
            .map(|(dot, track)| sample(track, dot, beat))
            .collect::<Result<Vec<_>>>()?;

        for (i, a) in positions.iter().enumerate() {
            let Some(a) = a else { continue };
            for (j, b) in positions.iter().enumerate().skip(i + 1) {
                if b.is_some_and(|b| a.approx_eq(&b)) {
                    collisions[i].insert(beat);
                    collisions[j].insert(beat);
                }
            }
        }
    }

    Ok(CollisionReport {
        sheet: job.sheet.clone(),
        generation: job.generation,
        collisions,
    })
}
