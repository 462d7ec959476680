pub use actions::{parse_action, Action, ActionHistory, ActionKind};
pub use collision::{CollisionJob, CollisionMessage, CollisionQueue, CollisionReport};
pub use config::{ConfigError, ConfigManager, ConfigSchema};
pub use continuity::{Continuity, ContinuityInfo, ContinuityKind, CyclePolicy};
pub use editor::Editor;
pub use error::{DrillError, Result};
pub use geometry::Coordinate;
pub use messages::{EditorCommand, EditorEvent, EditorRequest, Settings};
pub use movement::{AnimationState, MoveCommand, MovementCommand, StopCommand};
pub use show::{
    Defaults, DotId, DotTarget, DotType, Sheet, SheetId, Show, ShowDocument, ShowManager, Song,
};

pub mod actions;
pub mod collision;
mod config;
pub mod continuity;
mod editor;
pub mod error;
pub mod geometry;
pub mod messages;
pub mod movement;
pub mod show;
