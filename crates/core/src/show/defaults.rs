//! Step size, field type, facing and step style settings, and their
//! Sheet -> Song -> Show resolution chain.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{EAST, WEST};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldType {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "college")]
    College,
    #[serde(rename = "high-school")]
    HighSchool,
}

/// Which way dots face while they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "east")]
    East,
    #[serde(rename = "west")]
    West,
}

impl Orientation {
    /// The orientation in calchart degrees, or `None` for `Default`.
    pub fn angle(&self) -> Option<f64> {
        match self {
            Orientation::Default => None,
            Orientation::East => Some(EAST),
            Orientation::West => Some(WEST),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StepType {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "HS")]
    HighStep,
    #[serde(rename = "MM")]
    MiniMilitary,
    #[serde(rename = "SH")]
    ShowHigh,
    #[serde(rename = "JS")]
    JerkyStep,
    #[serde(rename = "FF")]
    FullField,
}

impl StepType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::HighStep => "High Step",
            Self::MiniMilitary => "Mini Military",
            Self::ShowHigh => "Show High",
            Self::JerkyStep => "Jerky Step",
            Self::FullField => "Full Field",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One level of the defaults chain. Every field may defer to the level above;
/// `beats_per_step: None` means "default".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub beats_per_step: Option<u32>,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub step_type: StepType,
}

impl Defaults {
    /// The show-level fallbacks used when no level overrides a value.
    pub fn show_fallback() -> Self {
        Self {
            field_type: FieldType::College,
            beats_per_step: Some(1),
            orientation: Orientation::East,
            step_type: StepType::HighStep,
        }
    }

    /// Fill every `default` value of `self` from `parent`.
    pub fn or(&self, parent: &ResolvedDefaults) -> ResolvedDefaults {
        ResolvedDefaults {
            field_type: match self.field_type {
                FieldType::Default => parent.field_type,
                field_type => field_type,
            },
            beats_per_step: self.beats_per_step.unwrap_or(parent.beats_per_step),
            orientation: self.orientation.angle().unwrap_or(parent.orientation),
            step_type: match self.step_type {
                StepType::Default => parent.step_type,
                step_type => step_type,
            },
        }
    }
}

/// Fully resolved settings with no `default` left in them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDefaults {
    pub field_type: FieldType,
    pub beats_per_step: u32,
    /// Orientation in calchart degrees.
    pub orientation: f64,
    pub step_type: StepType,
}

impl ResolvedDefaults {
    /// Resolve a chain of levels, most specific first.
    pub fn resolve(levels: &[&Defaults]) -> ResolvedDefaults {
        let base = Defaults::show_fallback();
        let mut resolved = ResolvedDefaults {
            field_type: base.field_type,
            beats_per_step: 1,
            orientation: EAST,
            step_type: base.step_type,
        };
        for level in levels.iter().rev() {
            resolved = level.or(&resolved);
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_prefers_the_most_specific_level() {
        let show = Defaults {
            step_type: StepType::MiniMilitary,
            beats_per_step: Some(2),
            ..Default::default()
        };
        let song = Defaults {
            orientation: Orientation::West,
            ..Default::default()
        };
        let sheet = Defaults {
            beats_per_step: Some(4),
            ..Default::default()
        };

        let resolved = ResolvedDefaults::resolve(&[&sheet, &song, &show]);
        assert_eq!(resolved.beats_per_step, 4);
        assert_eq!(resolved.orientation, WEST);
        assert_eq!(resolved.step_type, StepType::MiniMilitary);
        assert_eq!(resolved.field_type, FieldType::College);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_value(StepType::HighStep).unwrap(), "HS");
        assert_eq!(serde_json::to_value(Orientation::Default).unwrap(), "default");
        let field: FieldType = serde_json::from_str("\"high-school\"").unwrap();
        assert_eq!(field, FieldType::HighSchool);
    }
}
