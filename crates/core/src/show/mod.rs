pub mod defaults;
pub mod document;
pub mod dot;
pub mod sheet;
#[allow(clippy::module_inception)]
pub mod show;
pub mod show_manager;
pub mod song;

pub use defaults::{Defaults, FieldType, Orientation, ResolvedDefaults, StepType};
pub use document::ShowDocument;
pub use dot::{Dot, DotId, DotType};
pub use sheet::{Background, DotInfo, Sheet, SheetId};
pub use show::{DotTarget, Show};
pub use show_manager::ShowManager;
pub use song::Song;
