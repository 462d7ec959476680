use serde::{Deserialize, Serialize};

use crate::show::{Defaults, FieldType, Orientation, ResolvedDefaults, StepType};

/// Per-continuity overrides of the sheet's step settings. Anything left at
/// `default` falls back to the owning sheet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuityOptions {
    #[serde(default)]
    pub step_type: StepType,
    #[serde(default)]
    pub beats_per_step: Option<u32>,
    #[serde(default)]
    pub orientation: Orientation,
}

impl ContinuityOptions {
    pub fn resolve(&self, sheet: &ResolvedDefaults) -> ResolvedDefaults {
        Defaults {
            field_type: FieldType::Default,
            beats_per_step: self.beats_per_step,
            orientation: self.orientation,
            step_type: self.step_type,
        }
        .or(sheet)
    }
}

/// What a dot does once it reaches its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum End {
    /// Mark time in place.
    #[default]
    MT,
    /// Close, facing the final orientation.
    CL,
}

impl End {
    pub fn is_marktime(&self) -> bool {
        matches!(self, End::MT)
    }
}
