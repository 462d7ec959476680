use std::collections::{BTreeMap, HashMap};

use super::{Defaults, Dot, DotId, DotType, ResolvedDefaults, Sheet, SheetId, Song};
use crate::collision::{self, CollisionJob, DotTrack};
use crate::continuity::{append_clipped, Continuity, MovementState};
use crate::error::{DrillError, Result};
use crate::geometry::Coordinate;
use crate::movement::{state_at_beat, total_duration, AnimationState, MovementCommand};

/// Which dots of a sheet to recompute.
#[derive(Debug, Clone, PartialEq)]
pub enum DotTarget {
    All,
    Type(DotType),
    Dots(Vec<DotId>),
}

/// A drill show: the dot roster, its sheets in performance order and its
/// songs. Sheets are stored by id; continuities refer back to their sheet
/// through that id.
#[derive(Debug, Clone)]
pub struct Show {
    pub name: String,
    pub defaults: Defaults,
    dots: Vec<Dot>,
    sheets: HashMap<SheetId, Sheet>,
    order: Vec<SheetId>,
    songs: BTreeMap<String, Song>,
}

impl Show {
    pub fn new(name: impl Into<String>, num_dots: usize) -> Self {
        Self {
            name: name.into(),
            defaults: Defaults::show_fallback(),
            dots: (0..num_dots).map(Dot::new).collect(),
            sheets: HashMap::new(),
            order: Vec::new(),
            songs: BTreeMap::new(),
        }
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub(crate) fn set_dots(&mut self, dots: Vec<Dot>) {
        self.dots = dots;
    }

    pub fn num_dots(&self) -> usize {
        self.dots.len()
    }

    pub fn dot_ids(&self) -> Vec<DotId> {
        self.dots.iter().map(|dot| dot.id).collect()
    }

    pub fn num_sheets(&self) -> usize {
        self.order.len()
    }

    /// Sheets in performance order.
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.order.iter().filter_map(|id| self.sheets.get(id))
    }

    pub fn sheet(&self, id: &SheetId) -> Result<&Sheet> {
        self.sheets
            .get(id)
            .ok_or_else(|| DrillError::SheetNotFound(id.to_string()))
    }

    pub fn sheet_mut(&mut self, id: &SheetId) -> Result<&mut Sheet> {
        self.sheets
            .get_mut(id)
            .ok_or_else(|| DrillError::SheetNotFound(id.to_string()))
    }

    pub fn sheet_at(&self, index: usize) -> Option<&Sheet> {
        self.order.get(index).and_then(|id| self.sheets.get(id))
    }

    pub fn sheet_id_at(&self, index: usize) -> Result<SheetId> {
        self.order
            .get(index)
            .cloned()
            .ok_or_else(|| DrillError::SheetNotFound(format!("index {index}")))
    }

    pub fn next_sheet(&self, id: &SheetId) -> Option<&Sheet> {
        let index = self.sheets.get(id)?.index;
        self.sheet_at(index + 1)
    }

    pub fn prev_sheet(&self, id: &SheetId) -> Option<&Sheet> {
        let index = self.sheets.get(id)?.index;
        index.checked_sub(1).and_then(|prev| self.sheet_at(prev))
    }

    fn reindex(&mut self) {
        for (index, id) in self.order.iter().enumerate() {
            if let Some(sheet) = self.sheets.get_mut(id) {
                sheet.index = index;
            }
        }
    }

    /// Append a new sheet with every dot at the origin.
    pub fn add_sheet(&mut self, num_beats: u32) -> SheetId {
        let sheet = Sheet::new(num_beats, self.dots.len());
        self.insert_sheet(sheet, self.order.len())
    }

    /// Place an existing sheet at `index`, clamped to the end of the show.
    pub fn insert_sheet(&mut self, sheet: Sheet, index: usize) -> SheetId {
        let id = sheet.id().clone();
        let index = index.min(self.order.len());
        self.order.insert(index, id.clone());
        self.sheets.insert(id.clone(), sheet);
        self.reindex();
        log::debug!("Inserted sheet {} at {}", id, index);
        id
    }

    /// Remove a sheet, returning it with the index it held.
    pub fn remove_sheet(&mut self, id: &SheetId) -> Result<(usize, Sheet)> {
        let sheet = self
            .sheets
            .remove(id)
            .ok_or_else(|| DrillError::SheetNotFound(id.to_string()))?;
        let index = sheet.index;
        self.order.retain(|other| other != id);
        self.reindex();
        log::debug!("Removed sheet {} from {}", id, index);
        Ok((index, sheet))
    }

    /// Deep copy a sheet and insert the copy right after it.
    pub fn clone_sheet(&mut self, id: &SheetId) -> Result<SheetId> {
        let source = self.sheet(id)?;
        let index = source.index;
        let copy = source.clone_as(SheetId::random());
        Ok(self.insert_sheet(copy, index + 1))
    }

    pub fn move_sheet(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.order.len();
        if let Some(&index) = [from, to].iter().find(|&&index| index >= len) {
            return Err(DrillError::SheetNotFound(format!("index {index}")));
        }
        let id = self.order.remove(from);
        self.order.insert(to, id);
        self.reindex();
        Ok(())
    }

    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.songs.values()
    }

    pub fn song(&self, name: &str) -> Option<&Song> {
        self.songs.get(name)
    }

    pub fn add_song(&mut self, song: Song) {
        self.songs.insert(song.name.clone(), song);
    }

    /// Sheets assigned to a song, in performance order.
    pub fn song_sheets(&self, name: &str) -> Vec<&Sheet> {
        self.sheets()
            .filter(|sheet| sheet.song.as_deref() == Some(name))
            .collect()
    }

    /// Returns the previous song.
    pub fn set_sheet_song(&mut self, id: &SheetId, song: Option<String>) -> Result<Option<String>> {
        if let Some(name) = &song {
            if !self.songs.contains_key(name) {
                return Err(DrillError::SongNotFound(name.clone()));
            }
        }
        let sheet = self.sheet_mut(id)?;
        Ok(std::mem::replace(&mut sheet.song, song))
    }

    /// Settings for a sheet after falling back through its song and the show.
    pub fn resolved_defaults(&self, sheet: &Sheet) -> ResolvedDefaults {
        let song = sheet
            .song
            .as_deref()
            .and_then(|name| self.songs.get(name))
            .map(|song| &song.defaults);
        match song {
            Some(song) => ResolvedDefaults::resolve(&[&sheet.defaults, song, &self.defaults]),
            None => ResolvedDefaults::resolve(&[&sheet.defaults, &self.defaults]),
        }
    }

    pub fn set_position(&mut self, id: &SheetId, dot: DotId, position: Coordinate) -> Result<Coordinate> {
        self.sheet_mut(id)?.set_position(dot, position)
    }

    pub fn swap_dots(&mut self, id: &SheetId, a: DotId, b: DotId) -> Result<()> {
        self.sheet_mut(id)?.swap_dots(a, b)
    }

    /// Give `dots` a new type, returning each dot's previous type.
    pub fn change_dot_types(
        &mut self,
        id: &SheetId,
        dots: &[DotId],
        dot_type: DotType,
    ) -> Result<Vec<(DotId, DotType)>> {
        let sheet = self.sheet_mut(id)?;
        dots.iter()
            .map(|&dot| Ok((dot, sheet.set_dot_type(dot, dot_type)?)))
            .collect()
    }

    pub fn add_continuity(&mut self, continuity: Continuity) -> Result<()> {
        let id = continuity.sheet().clone();
        self.sheet_mut(&id)?.add_continuity(continuity);
        Ok(())
    }

    pub fn insert_continuity(&mut self, index: usize, continuity: Continuity) -> Result<()> {
        let id = continuity.sheet().clone();
        self.sheet_mut(&id)?.insert_continuity(index, continuity)
    }

    pub fn remove_continuity(
        &mut self,
        id: &SheetId,
        dot_type: DotType,
        index: usize,
    ) -> Result<Continuity> {
        self.sheet_mut(id)?.remove_continuity(dot_type, index)
    }

    pub fn move_continuity(
        &mut self,
        id: &SheetId,
        dot_type: DotType,
        from: usize,
        to: usize,
    ) -> Result<()> {
        self.sheet_mut(id)?.move_continuity(dot_type, from, to)
    }

    pub fn replace_continuity(&mut self, index: usize, continuity: Continuity) -> Result<Continuity> {
        let id = continuity.sheet().clone();
        self.sheet_mut(&id)?.replace_continuity(index, continuity)
    }

    /// Run a dot's continuity chain from its start position with the sheet's
    /// full beat count.
    pub fn compute_movements(&self, sheet: &Sheet, dot: DotId) -> Result<Vec<MovementCommand>> {
        let info = sheet.dot_info(dot).ok_or(DrillError::DotNotFound(dot.0))?;
        let mut state = MovementState {
            position: info.position,
            remaining: sheet.num_beats() as f64,
        };
        let mut movements = Vec::new();
        for continuity in sheet.chain(info.dot_type) {
            if state.remaining <= 0.0 {
                break;
            }
            let produced = continuity.movements(self, dot, &state)?;
            append_clipped(&mut movements, &mut state, produced);
        }
        Ok(movements)
    }

    /// Rebuild the movements of the targeted dots on a sheet.
    pub fn update_movements(&mut self, id: &SheetId, target: DotTarget) -> Result<()> {
        let sheet = self.sheet(id)?;
        let dots = match target {
            DotTarget::All => sheet.dot_ids(),
            DotTarget::Type(dot_type) => sheet.dots_of_type(dot_type),
            DotTarget::Dots(dots) => dots,
        };
        let computed = dots
            .iter()
            .map(|&dot| Ok((dot, self.compute_movements(sheet, dot)?)))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("Recomputed {} dots on sheet {}", computed.len(), id);
        let sheet = self.sheet_mut(id)?;
        for (dot, movements) in computed {
            sheet.set_movements(dot, movements)?;
        }
        Ok(())
    }

    /// Where a dot is at `beat` beats into a sheet. Dots with no movements
    /// yield `None`; sampling past the last movement is an error.
    pub fn get_animation_state(
        &self,
        id: &SheetId,
        dot: DotId,
        beat: f64,
    ) -> Result<Option<AnimationState>> {
        let sheet = self.sheet(id)?;
        let info = sheet.dot_info(dot).ok_or(DrillError::DotNotFound(dot.0))?;
        if info.movements.is_empty() {
            return Ok(None);
        }
        state_at_beat(&info.movements, beat)
            .map(Some)
            .ok_or_else(|| DrillError::AnimationState {
                dot: dot.0,
                beat,
                remaining: beat - total_duration(&info.movements),
            })
    }

    /// Where a dot ends up after its movements on a sheet.
    pub fn final_position(&self, id: &SheetId, dot: DotId) -> Result<Coordinate> {
        let sheet = self.sheet(id)?;
        let info = sheet.dot_info(dot).ok_or(DrillError::DotNotFound(dot.0))?;
        Ok(info
            .movements
            .last()
            .map_or(info.position, MovementCommand::end_position))
    }

    /// Snapshot what a collision pass needs from a sheet.
    pub fn collision_job(&self, id: &SheetId, generation: u64) -> Result<CollisionJob> {
        let sheet = self.sheet(id)?;
        Ok(CollisionJob {
            sheet: id.clone(),
            generation,
            num_beats: sheet.num_beats(),
            dots: sheet
                .dots()
                .iter()
                .map(|info| DotTrack {
                    start: info.position,
                    movements: info.movements.clone(),
                })
                .collect(),
        })
    }

    /// Run a collision pass inline and store the result on the sheet.
    pub fn detect_collisions(&mut self, id: &SheetId) -> Result<()> {
        let report = collision::detect(&self.collision_job(id, 0)?)?;
        self.sheet_mut(id)?.set_collisions(report.collisions);
        Ok(())
    }

    pub(crate) fn store_collisions(&mut self, report: collision::CollisionReport) -> Result<()> {
        self.sheet_mut(&report.sheet)?
            .set_collisions(report.collisions);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::show::StepType;

    #[test]
    fn test_sheet_ordering() {
        let mut show = Show::new("Test", 2);
        let a = show.add_sheet(8);
        let b = show.add_sheet(8);
        let c = show.add_sheet(8);

        assert_eq!(show.next_sheet(&a).unwrap().id(), &b);
        assert_eq!(show.prev_sheet(&a), None);
        assert!(show.next_sheet(&c).is_none());

        show.move_sheet(2, 0).unwrap();
        assert_eq!(show.sheet(&c).unwrap().index(), 0);
        assert_eq!(show.sheet(&b).unwrap().label(), "3");

        let (index, _) = show.remove_sheet(&c).unwrap();
        assert_eq!(index, 0);
        assert_eq!(show.sheet(&a).unwrap().index(), 0);
        assert!(matches!(show.sheet(&c), Err(DrillError::SheetNotFound(_))));
    }

    #[test]
    fn test_clone_sheet_lands_after_source() {
        let mut show = Show::new("Test", 2);
        let a = show.add_sheet(8);
        let b = show.add_sheet(8);
        show.set_position(&a, DotId(1), Coordinate::new(2.0, 2.0)).unwrap();

        let copy = show.clone_sheet(&a).unwrap();
        assert_ne!(copy, a);
        assert_eq!(show.sheet(&copy).unwrap().index(), 1);
        assert_eq!(show.sheet(&b).unwrap().index(), 2);
        assert_eq!(
            show.sheet(&copy).unwrap().position(DotId(1)),
            Some(Coordinate::new(2.0, 2.0))
        );
    }

    #[test]
    fn test_song_must_exist() {
        let mut show = Show::new("Test", 1);
        let a = show.add_sheet(8);
        let err = show.set_sheet_song(&a, Some("Opener".into())).unwrap_err();
        assert!(matches!(err, DrillError::SongNotFound(_)));

        show.add_song(Song::new("Opener"));
        assert_eq!(show.set_sheet_song(&a, Some("Opener".into())).unwrap(), None);
        assert_eq!(show.song_sheets("Opener").len(), 1);
    }

    #[test]
    fn test_default_cascade_reads_through() {
        let mut show = Show::new("Test", 1);
        let a = show.add_sheet(8);
        show.add_song(Song::new("Opener"));
        show.set_sheet_song(&a, Some("Opener".into())).unwrap();

        let resolved = show.resolved_defaults(show.sheet(&a).unwrap());
        assert_eq!(resolved.step_type, StepType::HighStep);

        show.defaults.step_type = StepType::JerkyStep;
        let resolved = show.resolved_defaults(show.sheet(&a).unwrap());
        assert_eq!(resolved.step_type, StepType::JerkyStep);
    }

    #[test]
    fn test_empty_movements_have_no_state() {
        let mut show = Show::new("Test", 1);
        let a = show.add_sheet(8);
        assert_eq!(show.get_animation_state(&a, DotId(0), 2.0).unwrap(), None);
        assert_eq!(show.final_position(&a, DotId(0)).unwrap(), Coordinate::default());
    }

    #[test]
    fn test_sheet_without_continuities_has_no_collisions() {
        let mut show = Show::new("Test", 2);
        let a = show.add_sheet(4);
        let at = Coordinate::new(2.0, 2.0);
        show.set_position(&a, DotId(0), at).unwrap();
        show.set_position(&a, DotId(1), at).unwrap();

        show.update_movements(&a, DotTarget::All).unwrap();
        show.detect_collisions(&a).unwrap();

        let sheet = show.sheet(&a).unwrap();
        assert!(sheet.movements(DotId(0)).is_empty());
        assert!(sheet.collisions(DotId(0)).unwrap().is_empty());
        assert!(sheet.collisions(DotId(1)).unwrap().is_empty());
    }
}
