use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable index of a performer in the show roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DotId(pub usize);

impl From<usize> for DotId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl fmt::Display for DotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A performer. Dots carry no position; positions live in each sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub id: DotId,
    pub label: String,
}

impl Dot {
    pub fn new(id: usize) -> Self {
        Self {
            id: DotId(id),
            label: Self::default_label(id),
        }
    }

    /// Labels run A0..A9, B0..B9 and so on.
    pub fn default_label(id: usize) -> String {
        let letter = (b'A' + (id / 10 % 26) as u8) as char;
        format!("{}{}", letter, id % 10)
    }
}

/// A sheet-scoped label grouping dots that share a continuity chain. The two
/// `All*` scopes hold continuities that run for every dot before and after
/// its own type's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DotType {
    #[serde(rename = "all-before")]
    AllBefore,
    #[serde(rename = "plain")]
    Plain,
    #[serde(rename = "solid")]
    Solid,
    #[serde(rename = "plain-forwardslash")]
    PlainForwardslash,
    #[serde(rename = "solid-forwardslash")]
    SolidForwardslash,
    #[serde(rename = "plain-backslash")]
    PlainBackslash,
    #[serde(rename = "solid-backslash")]
    SolidBackslash,
    #[serde(rename = "plain-x")]
    PlainX,
    #[serde(rename = "solid-x")]
    SolidX,
    #[serde(rename = "all-after")]
    AllAfter,
}

impl DotType {
    pub const ALL: [DotType; 10] = [
        DotType::AllBefore,
        DotType::Plain,
        DotType::Solid,
        DotType::PlainForwardslash,
        DotType::SolidForwardslash,
        DotType::PlainBackslash,
        DotType::SolidBackslash,
        DotType::PlainX,
        DotType::SolidX,
        DotType::AllAfter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllBefore => "all-before",
            Self::Plain => "plain",
            Self::Solid => "solid",
            Self::PlainForwardslash => "plain-forwardslash",
            Self::SolidForwardslash => "solid-forwardslash",
            Self::PlainBackslash => "plain-backslash",
            Self::SolidBackslash => "solid-backslash",
            Self::PlainX => "plain-x",
            Self::SolidX => "solid-x",
            Self::AllAfter => "all-after",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == value)
    }

    /// True for the scopes that apply to every dot.
    pub fn is_all(&self) -> bool {
        matches!(self, DotType::AllBefore | DotType::AllAfter)
    }
}

impl fmt::Display for DotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        assert_eq!(Dot::new(0).label, "A0");
        assert_eq!(Dot::new(9).label, "A9");
        assert_eq!(Dot::new(10).label, "B0");
        assert_eq!(Dot::new(263).label, "A3");
    }

    #[test]
    fn test_dot_type_names_round_trip() {
        for dot_type in DotType::ALL {
            assert_eq!(DotType::from_value(dot_type.as_str()), Some(dot_type));
            assert_eq!(
                serde_json::to_value(dot_type).unwrap(),
                serde_json::Value::String(dot_type.as_str().to_string())
            );
        }
        assert_eq!(DotType::from_value("striped"), None);
    }

    #[test]
    fn test_all_scopes_sort_around_dot_types() {
        let mut types = vec![DotType::AllAfter, DotType::Solid, DotType::AllBefore];
        types.sort();
        assert_eq!(types, vec![DotType::AllBefore, DotType::Solid, DotType::AllAfter]);
        assert!(DotType::AllBefore.is_all());
        assert!(!DotType::Plain.is_all());
    }
}
