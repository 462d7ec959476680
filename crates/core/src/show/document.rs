//! The persisted JSON shape of a show.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Background, Defaults, Dot, DotInfo, DotType, Sheet, SheetId, Show, Song};
use crate::continuity::Continuity;
use crate::error::{DrillError, Result};
use crate::geometry::Coordinate;
use crate::movement::MovementCommand;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDocument {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(flatten)]
    pub defaults: Defaults,
    pub dots: Vec<Dot>,
    pub sheets: Vec<SheetDocument>,
    #[serde(default)]
    pub songs: Vec<SongDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDocument {
    pub id: SheetId,
    pub index: usize,
    pub num_beats: u32,
    pub options: SheetOptions,
    pub dots: Vec<DotDocument>,
    #[serde(default)]
    pub continuities: BTreeMap<DotType, Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetOptions {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub background: Option<Background>,
    #[serde(flatten)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotDocument {
    #[serde(rename = "type")]
    pub dot_type: DotType,
    pub position: Coordinate,
    #[serde(default)]
    pub movements: Vec<MovementCommand>,
    #[serde(default)]
    pub collisions: BTreeSet<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDocument {
    pub name: String,
    /// Indexes of the song's sheets.
    #[serde(default)]
    pub sheets: Vec<usize>,
    #[serde(flatten)]
    pub defaults: Defaults,
}

impl ShowDocument {
    pub fn from_show(show: &Show) -> Result<Self> {
        let sheets = show
            .sheets()
            .map(SheetDocument::from_sheet)
            .collect::<Result<Vec<_>>>()?;
        let songs = show
            .songs()
            .map(|song| SongDocument {
                name: song.name.clone(),
                sheets: show
                    .song_sheets(&song.name)
                    .iter()
                    .map(|sheet| sheet.index())
                    .collect(),
                defaults: song.defaults,
            })
            .collect();

        Ok(Self {
            name: show.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            defaults: show.defaults,
            dots: show.dots().to_vec(),
            sheets,
            songs,
        })
    }

    pub fn into_show(self) -> Result<Show> {
        check_beats_per_step(self.defaults.beats_per_step, "show")?;
        let mut show = Show::new(self.name, 0);
        show.defaults = self.defaults;
        let num_dots = self.dots.len();
        show.set_dots(self.dots);
        for song in self.songs {
            check_beats_per_step(song.defaults.beats_per_step, &format!("song {}", song.name))?;
            show.add_song(Song::new(song.name).with_defaults(song.defaults));
        }

        let mut sheets = self.sheets;
        sheets.sort_by_key(|sheet| sheet.index);
        let mut seen = HashSet::new();
        for document in sheets {
            if !seen.insert(document.id.clone()) {
                return Err(DrillError::InvalidDocument(format!(
                    "sheet id {} is used more than once",
                    document.id
                )));
            }
            if document.dots.len() != num_dots {
                return Err(DrillError::InvalidDocument(format!(
                    "sheet {} has {} dots, expected {}",
                    document.id,
                    document.dots.len(),
                    num_dots
                )));
            }
            if let Some(song) = &document.options.song {
                if show.song(song).is_none() {
                    return Err(DrillError::SongNotFound(song.clone()));
                }
            }
            let sheet = document.into_sheet()?;
            show.insert_sheet(sheet, usize::MAX);
        }
        Ok(show)
    }
}

impl SheetDocument {
    fn from_sheet(sheet: &Sheet) -> Result<Self> {
        let mut continuities = BTreeMap::new();
        for (dot_type, list) in sheet.all_continuities() {
            let values = list
                .iter()
                .map(Continuity::serialize)
                .collect::<Result<Vec<_>>>()?;
            continuities.insert(*dot_type, values);
        }

        Ok(Self {
            id: sheet.id().clone(),
            index: sheet.index(),
            num_beats: sheet.num_beats(),
            options: SheetOptions {
                label: sheet.label.clone(),
                song: sheet.song.clone(),
                background: sheet.background.clone(),
                defaults: sheet.defaults,
            },
            dots: sheet
                .dots()
                .iter()
                .map(|info| DotDocument {
                    dot_type: info.dot_type,
                    position: info.position,
                    movements: info.movements.clone(),
                    collisions: info.collisions.clone(),
                })
                .collect(),
            continuities,
        })
    }

    fn into_sheet(self) -> Result<Sheet> {
        let owner = format!("sheet {}", self.id);
        check_beats_per_step(self.options.defaults.beats_per_step, &owner)?;
        let mut sheet = Sheet::with_id(self.id.clone(), self.num_beats, 0);
        sheet.index = self.index;
        sheet.label = self.options.label;
        sheet.song = self.options.song;
        sheet.background = self.options.background;
        sheet.defaults = self.options.defaults;
        sheet.set_dots(
            self.dots
                .into_iter()
                .map(|dot| DotInfo {
                    dot_type: dot.dot_type,
                    position: dot.position,
                    movements: dot.movements,
                    collisions: dot.collisions,
                })
                .collect(),
        );
        for (dot_type, values) in self.continuities {
            for value in &values {
                let continuity = Continuity::deserialize(&self.id, dot_type, value)?;
                check_beats_per_step(continuity.kind.options().beats_per_step, &owner)?;
                sheet.add_continuity(continuity);
            }
        }
        Ok(sheet)
    }
}

fn check_beats_per_step(beats_per_step: Option<u32>, owner: &str) -> Result<()> {
    if beats_per_step == Some(0) {
        return Err(DrillError::InvalidDocument(format!(
            "{owner} has zero beats per step"
        )));
    }
    Ok(())
}

impl Show {
    pub fn to_document(&self) -> Result<ShowDocument> {
        ShowDocument::from_show(self)
    }

    pub fn from_document(document: ShowDocument) -> Result<Show> {
        document.into_show()
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.to_document()?)?)
    }

    pub fn from_json(value: Value) -> Result<Show> {
        let document: ShowDocument = serde_json::from_value(value)?;
        document.into_show()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::show::{DotId, StepType};

    #[test]
    fn test_document_shape() {
        let mut show = Show::new("Halftime", 2);
        let sheet = show.add_sheet(16);
        show.set_position(&sheet, DotId(1), Coordinate::new(4.0, -2.0))
            .unwrap();

        let value = show.to_json().unwrap();
        assert_eq!(value["stepType"], "HS");
        assert_eq!(value["dots"][1]["label"], "A1");
        assert_eq!(value["sheets"][0]["numBeats"], 16);
        assert_eq!(value["sheets"][0]["options"]["stepType"], "default");
        assert_eq!(value["sheets"][0]["dots"][1]["type"], "plain");
        assert_eq!(value["sheets"][0]["dots"][1]["position"], json!({"x": 4.0, "y": -2.0}));
    }

    #[test]
    fn test_load_keeps_order_and_songs() {
        let mut show = Show::new("Halftime", 1);
        let first = show.add_sheet(8);
        let second = show.add_sheet(12);
        show.add_song(Song::new("Opener").with_defaults(Defaults {
            step_type: StepType::MiniMilitary,
            ..Default::default()
        }));
        show.set_sheet_song(&second, Some("Opener".into())).unwrap();

        let loaded = Show::from_json(show.to_json().unwrap()).unwrap();
        let ids: Vec<&SheetId> = loaded.sheets().map(|sheet| sheet.id()).collect();
        assert_eq!(ids, vec![&first, &second]);
        let resolved = loaded.resolved_defaults(loaded.sheet(&second).unwrap());
        assert_eq!(resolved.step_type, StepType::MiniMilitary);
    }

    #[test]
    fn test_dot_count_mismatch_is_rejected() {
        let mut show = Show::new("Halftime", 2);
        show.add_sheet(8);
        let mut value = show.to_json().unwrap();
        value["dots"] = json!([{"id": 0, "label": "A0"}]);
        let err = Show::from_json(value).unwrap_err();
        assert!(matches!(err, DrillError::InvalidDocument(_)));
    }

    #[test]
    fn test_unknown_continuity_aborts_load() {
        let mut show = Show::new("Halftime", 1);
        show.add_sheet(8);
        let mut value = show.to_json().unwrap();
        value["sheets"][0]["continuities"] = json!({"plain": [{"type": "SPIN"}]});
        let err = Show::from_json(value).unwrap_err();
        assert!(matches!(err, DrillError::UnknownContinuityType(tag) if tag == "SPIN"));
    }

    #[test]
    fn test_zero_beats_per_step_is_rejected() {
        let mut show = Show::new("Halftime", 1);
        show.add_sheet(8);
        let value = show.to_json().unwrap();

        let mut at_show = value.clone();
        at_show["beatsPerStep"] = json!(0);
        let err = Show::from_json(at_show).unwrap_err();
        assert!(matches!(err, DrillError::InvalidDocument(_)));

        let mut at_sheet = value.clone();
        at_sheet["sheets"][0]["options"]["beatsPerStep"] = json!(0);
        let err = Show::from_json(at_sheet).unwrap_err();
        assert!(matches!(err, DrillError::InvalidDocument(_)));

        let mut at_continuity = value;
        at_continuity["sheets"][0]["continuities"] =
            json!({"plain": [{"type": "EVEN", "beatsPerStep": 0}]});
        let err = Show::from_json(at_continuity).unwrap_err();
        assert!(matches!(err, DrillError::InvalidDocument(_)));
    }

    #[test]
    fn test_duplicate_sheet_ids_are_rejected() {
        let mut show = Show::new("Halftime", 1);
        show.add_sheet(8);
        show.add_sheet(8);
        let mut value = show.to_json().unwrap();
        value["sheets"][1]["id"] = value["sheets"][0]["id"].clone();
        let err = Show::from_json(value).unwrap_err();
        assert!(matches!(err, DrillError::InvalidDocument(message) if message.contains("more than once")));
    }
}
