use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Defaults, DotId, DotType};
use crate::continuity::Continuity;
use crate::error::{DrillError, Result};
use crate::geometry::Coordinate;
use crate::movement::MovementCommand;

/// Stable identifier of a sheet inside its show.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetId(String);

impl SheetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn random() -> Self {
        Self(format!("{:08x}", rand::random::<u32>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Background image settings, kept as-is for the grapher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub url: String,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
}

/// A dot's record on one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct DotInfo {
    pub dot_type: DotType,
    pub position: Coordinate,
    pub movements: Vec<MovementCommand>,
    /// Beats at which this dot shares a position with another dot.
    pub collisions: BTreeSet<u32>,
}

impl Default for DotInfo {
    fn default() -> Self {
        Self {
            dot_type: DotType::Plain,
            position: Coordinate::default(),
            movements: Vec::new(),
            collisions: BTreeSet::new(),
        }
    }
}

/// One formation of the show.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    id: SheetId,
    pub(crate) index: usize,
    num_beats: u32,
    pub label: Option<String>,
    pub song: Option<String>,
    pub background: Option<Background>,
    pub defaults: Defaults,
    dots: Vec<DotInfo>,
    continuities: BTreeMap<DotType, Vec<Continuity>>,
}

impl Sheet {
    /// A sheet with every dot at the origin as a plain dot.
    pub fn new(num_beats: u32, num_dots: usize) -> Self {
        Self::with_id(SheetId::random(), num_beats, num_dots)
    }

    pub fn with_id(id: SheetId, num_beats: u32, num_dots: usize) -> Self {
        Self {
            id,
            index: 0,
            num_beats,
            label: None,
            song: None,
            background: None,
            defaults: Defaults::default(),
            dots: vec![DotInfo::default(); num_dots],
            continuities: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &SheetId {
        &self.id
    }

    /// Position of the sheet within the show.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn num_beats(&self) -> u32 {
        self.num_beats
    }

    pub fn set_num_beats(&mut self, num_beats: u32) {
        self.num_beats = num_beats;
    }

    /// The sheet's label, or its 1-based index when none is set.
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| (self.index + 1).to_string())
    }

    pub fn num_dots(&self) -> usize {
        self.dots.len()
    }

    pub fn dot_ids(&self) -> Vec<DotId> {
        (0..self.dots.len()).map(DotId).collect()
    }

    pub fn dots_of_type(&self, dot_type: DotType) -> Vec<DotId> {
        self.dots
            .iter()
            .enumerate()
            .filter(|(_, info)| info.dot_type == dot_type)
            .map(|(id, _)| DotId(id))
            .collect()
    }

    /// Dot types with at least one dot on this sheet, in sort order.
    pub fn dot_types(&self) -> Vec<DotType> {
        self.dots
            .iter()
            .map(|info| info.dot_type)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn dot_info(&self, dot: DotId) -> Option<&DotInfo> {
        self.dots.get(dot.0)
    }

    pub(crate) fn dot_info_mut(&mut self, dot: DotId) -> Result<&mut DotInfo> {
        self.dots.get_mut(dot.0).ok_or(DrillError::DotNotFound(dot.0))
    }

    pub fn dots(&self) -> &[DotInfo] {
        &self.dots
    }

    pub fn position(&self, dot: DotId) -> Option<Coordinate> {
        self.dot_info(dot).map(|info| info.position)
    }

    pub fn dot_type(&self, dot: DotId) -> Option<DotType> {
        self.dot_info(dot).map(|info| info.dot_type)
    }

    pub fn movements(&self, dot: DotId) -> &[MovementCommand] {
        self.dot_info(dot).map_or(&[], |info| info.movements.as_slice())
    }

    pub fn collisions(&self, dot: DotId) -> Option<&BTreeSet<u32>> {
        self.dot_info(dot).map(|info| &info.collisions)
    }

    /// Returns the previous position.
    pub fn set_position(&mut self, dot: DotId, position: Coordinate) -> Result<Coordinate> {
        let info = self.dot_info_mut(dot)?;
        Ok(std::mem::replace(&mut info.position, position))
    }

    /// Returns the previous type.
    pub fn set_dot_type(&mut self, dot: DotId, dot_type: DotType) -> Result<DotType> {
        let info = self.dot_info_mut(dot)?;
        Ok(std::mem::replace(&mut info.dot_type, dot_type))
    }

    /// Swap the positions and types of two dots.
    pub fn swap_dots(&mut self, a: DotId, b: DotId) -> Result<()> {
        let len = self.dots.len();
        for dot in [a, b] {
            if dot.0 >= len {
                return Err(DrillError::DotNotFound(dot.0));
            }
        }
        let (first, second) = (self.dots[a.0].clone(), self.dots[b.0].clone());
        self.dots[a.0].position = second.position;
        self.dots[a.0].dot_type = second.dot_type;
        self.dots[b.0].position = first.position;
        self.dots[b.0].dot_type = first.dot_type;
        Ok(())
    }

    pub(crate) fn set_movements(&mut self, dot: DotId, movements: Vec<MovementCommand>) -> Result<()> {
        self.dot_info_mut(dot)?.movements = movements;
        Ok(())
    }

    /// Replace every dot's collision set. Dots past the end of `collisions`
    /// are cleared.
    pub(crate) fn set_collisions(&mut self, mut collisions: Vec<BTreeSet<u32>>) {
        collisions.resize(self.dots.len(), BTreeSet::new());
        for (info, beats) in self.dots.iter_mut().zip(collisions) {
            info.collisions = beats;
        }
    }

    pub fn continuities(&self, dot_type: DotType) -> &[Continuity] {
        self.continuities
            .get(&dot_type)
            .map_or(&[], |list| list.as_slice())
    }

    pub fn all_continuities(&self) -> &BTreeMap<DotType, Vec<Continuity>> {
        &self.continuities
    }

    /// The continuities a dot of `dot_type` runs: the all-before scope, its
    /// own type, then the all-after scope.
    pub fn chain(&self, dot_type: DotType) -> impl Iterator<Item = &Continuity> {
        self.continuities(DotType::AllBefore)
            .iter()
            .chain(self.continuities(dot_type))
            .chain(self.continuities(DotType::AllAfter))
    }

    pub fn add_continuity(&mut self, continuity: Continuity) {
        self.continuities
            .entry(continuity.dot_type())
            .or_default()
            .push(continuity);
    }

    pub fn insert_continuity(&mut self, index: usize, continuity: Continuity) -> Result<()> {
        let dot_type = continuity.dot_type();
        let list = self.continuities.entry(dot_type).or_default();
        if index > list.len() {
            return Err(DrillError::ContinuityNotFound { dot_type, index });
        }
        list.insert(index, continuity);
        Ok(())
    }

    pub fn remove_continuity(&mut self, dot_type: DotType, index: usize) -> Result<Continuity> {
        let list = self.continuities.entry(dot_type).or_default();
        if index >= list.len() {
            return Err(DrillError::ContinuityNotFound { dot_type, index });
        }
        let removed = list.remove(index);
        if list.is_empty() {
            self.continuities.remove(&dot_type);
        }
        Ok(removed)
    }

    pub fn move_continuity(&mut self, dot_type: DotType, from: usize, to: usize) -> Result<()> {
        let list = self.continuities.entry(dot_type).or_default();
        if let Some(&index) = [from, to].iter().find(|&&index| index >= list.len()) {
            return Err(DrillError::ContinuityNotFound { dot_type, index });
        }
        let continuity = list.remove(from);
        list.insert(to, continuity);
        Ok(())
    }

    /// Returns the continuity that was replaced.
    pub fn replace_continuity(&mut self, index: usize, continuity: Continuity) -> Result<Continuity> {
        let dot_type = continuity.dot_type();
        let slot = self
            .continuities
            .get_mut(&dot_type)
            .and_then(|list| list.get_mut(index))
            .ok_or(DrillError::ContinuityNotFound { dot_type, index })?;
        Ok(std::mem::replace(slot, continuity))
    }

    pub fn continuity_mut(&mut self, dot_type: DotType, index: usize) -> Result<&mut Continuity> {
        self.continuities
            .get_mut(&dot_type)
            .and_then(|list| list.get_mut(index))
            .ok_or(DrillError::ContinuityNotFound { dot_type, index })
    }

    /// Deep copy under a new id, with every continuity rebound to the copy.
    pub fn clone_as(&self, id: SheetId) -> Sheet {
        let mut sheet = self.clone();
        sheet.id = id.clone();
        for continuity in sheet.continuities.values_mut().flatten() {
            continuity.rebind(id.clone());
        }
        sheet
    }

    pub(crate) fn set_dots(&mut self, dots: Vec<DotInfo>) {
        self.dots = dots;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continuity::{ContinuityKind, StopContinuity};

    fn stop(sheet: &Sheet, dot_type: DotType, beats: f64) -> Continuity {
        Continuity::new(
            sheet.id().clone(),
            dot_type,
            ContinuityKind::Stop(StopContinuity::new(true, Some(beats))),
        )
    }

    #[test]
    fn test_new_sheet_has_plain_dots_at_origin() {
        let sheet = Sheet::new(16, 3);
        assert_eq!(sheet.dots_of_type(DotType::Plain).len(), 3);
        assert_eq!(sheet.position(DotId(2)), Some(Coordinate::default()));
        assert_eq!(sheet.label(), "1");
        assert_eq!(sheet.id().as_str().len(), 8);
    }

    #[test]
    fn test_chain_order() {
        let mut sheet = Sheet::new(16, 1);
        sheet.add_continuity(stop(&sheet, DotType::AllAfter, 3.0));
        sheet.add_continuity(stop(&sheet, DotType::Plain, 2.0));
        sheet.add_continuity(stop(&sheet, DotType::AllBefore, 1.0));
        sheet.add_continuity(stop(&sheet, DotType::Solid, 9.0));

        let types: Vec<DotType> = sheet.chain(DotType::Plain).map(|c| c.dot_type()).collect();
        assert_eq!(
            types,
            vec![DotType::AllBefore, DotType::Plain, DotType::AllAfter]
        );
    }

    #[test]
    fn test_continuity_list_editing() {
        let mut sheet = Sheet::new(16, 1);
        sheet.add_continuity(stop(&sheet, DotType::Plain, 1.0));
        sheet.add_continuity(stop(&sheet, DotType::Plain, 2.0));
        sheet.move_continuity(DotType::Plain, 0, 1).unwrap();
        assert_eq!(sheet.continuities(DotType::Plain)[0].text(), "MT 2");

        let err = sheet.remove_continuity(DotType::Plain, 5).unwrap_err();
        assert!(matches!(err, DrillError::ContinuityNotFound { index: 5, .. }));
        sheet.remove_continuity(DotType::Plain, 0).unwrap();
        sheet.remove_continuity(DotType::Plain, 0).unwrap();
        assert!(sheet.all_continuities().is_empty());
    }

    #[test]
    fn test_swap_dots() {
        let mut sheet = Sheet::new(8, 2);
        sheet.set_position(DotId(1), Coordinate::new(4.0, 4.0)).unwrap();
        sheet.set_dot_type(DotId(1), DotType::SolidX).unwrap();
        sheet.swap_dots(DotId(0), DotId(1)).unwrap();
        assert_eq!(sheet.position(DotId(0)), Some(Coordinate::new(4.0, 4.0)));
        assert_eq!(sheet.dot_type(DotId(0)), Some(DotType::SolidX));
        assert_eq!(sheet.dot_type(DotId(1)), Some(DotType::Plain));
        assert!(sheet.swap_dots(DotId(0), DotId(7)).is_err());
    }

    #[test]
    fn test_clone_rebinds_continuities() {
        let mut sheet = Sheet::new(8, 1);
        sheet.add_continuity(stop(&sheet, DotType::Plain, 1.0));
        let copy = sheet.clone_as(SheetId::new("copy"));
        assert_eq!(copy.continuities(DotType::Plain)[0].sheet(), copy.id());
        assert_eq!(sheet.continuities(DotType::Plain)[0].sheet(), sheet.id());
    }
}
