use serde::{Deserialize, Serialize};

use crate::continuity::{Continuity, CyclePolicy};
use crate::geometry::Coordinate;
use crate::show::{Defaults, DotId, DotTarget, DotType, Sheet, SheetId};

/// Undoable edits to a show. Applying one yields the command that reverts it.
#[derive(Debug, Clone)]
pub enum EditorCommand {
    // Sheets
    AddSheet {
        num_beats: u32,
    },
    RemoveSheet {
        sheet: SheetId,
    },
    RestoreSheet {
        sheet: Box<Sheet>,
        index: usize,
    },
    CloneSheet {
        sheet: SheetId,
    },

    // Continuities
    AddContinuity {
        continuity: Continuity,
    },
    InsertContinuity {
        index: usize,
        continuity: Continuity,
    },
    RemoveContinuity {
        sheet: SheetId,
        dot_type: DotType,
        index: usize,
    },
    MoveContinuity {
        sheet: SheetId,
        dot_type: DotType,
        from: usize,
        to: usize,
    },
    ReplaceContinuity {
        index: usize,
        continuity: Continuity,
    },

    // Dots
    SetDotTypes {
        sheet: SheetId,
        dots: Vec<(DotId, DotType)>,
    },
    SetPosition {
        sheet: SheetId,
        dot: DotId,
        position: Coordinate,
    },
    SwapDots {
        sheet: SheetId,
        a: DotId,
        b: DotId,
    },

    // Defaults
    SetSheetDefaults {
        sheet: SheetId,
        defaults: Defaults,
    },
    SetShowDefaults {
        defaults: Defaults,
    },

    UpdateMovements {
        sheet: SheetId,
        target: DotTarget,
    },
}

/// Requests accepted by a running editor loop.
#[derive(Debug, Clone)]
pub enum EditorRequest {
    Command(EditorCommand),
    /// A menu action string such as `"undo"` or `"addSheet(16)"`.
    Action(String),
    Shutdown,
}

/// Notifications sent from the editor
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    MovementsUpdated {
        sheet: SheetId,
    },
    CollisionsUpdated {
        sheet: SheetId,
        generation: u64,
    },
    CollisionsFailed {
        sheet: SheetId,
        generation: u64,
        error: String,
    },
    Error {
        message: String,
    },
    ShutdownComplete,
}

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // New sheets and shows
    pub default_num_beats: u32,
    pub default_num_dots: usize,

    // Editing
    pub history_limit: usize,

    // Collision detection
    pub collision_detection: bool,
    pub collision_queue_capacity: usize,

    // Continuities
    pub follow_leader_cycle: CyclePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_num_beats: 16,
            default_num_dots: 0,
            history_limit: 100,
            collision_detection: true,
            collision_queue_capacity: 256,
            follow_leader_cycle: CyclePolicy::Continue,
        }
    }
}
