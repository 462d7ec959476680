use serde::{Deserialize, Serialize};

use super::Defaults;

/// A named group of sheets. Sheets point at their song by name; a song's
/// defaults sit between the sheet's and the show's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    #[serde(flatten)]
    pub defaults: Defaults,
}

impl Song {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Defaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }
}
