//! Choreography policies that turn a dot's position and beat budget into
//! movements.
//!
//! Every continuity belongs to one sheet and one dot-type scope. The sheet
//! fold hands each continuity in a dot's chain the position left behind by
//! the previous one and the beats still unaccounted for.

pub mod counter_march;
pub mod diagonal;
pub mod even;
pub mod follow_leader;
pub mod forward;
pub mod fountain_grid;
pub mod gate_turn;
pub mod grapevine;
pub mod options;
pub mod ordered;
pub mod stop;
pub mod two_step;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use counter_march::CounterMarchContinuity;
pub use diagonal::{diagonal_moves, DiagonalContinuity};
pub use even::EvenContinuity;
pub use follow_leader::FollowLeaderContinuity;
pub use forward::ForwardContinuity;
pub use fountain_grid::FountainGridContinuity;
pub use gate_turn::GateTurnContinuity;
pub use grapevine::GrapevineContinuity;
pub use options::{ContinuityOptions, End};
pub use ordered::CyclePolicy;
pub use stop::StopContinuity;
pub use two_step::TwoStepContinuity;

use crate::error::{DrillError, Result};
use crate::geometry::{round_small, Coordinate, EAST};
use crate::movement::{push_merged, truncate_to, MovementCommand, StopCommand};
use crate::show::{DotId, DotType, ResolvedDefaults, Sheet, SheetId, Show};

/// Tags accepted by [`Continuity::create`].
pub const CREATE_TAGS: [&str; 14] = [
    "EWNS", "NSEW", "FM", "MT", "MTRM", "CL", "EVEN", "DMHS", "HSDM", "FTL", "CM", "TWO", "GT",
    "GV",
];

/// Tags that appear in the `type` field of a serialized continuity.
pub const SERIALIZED_TAGS: [&str; 10] = [
    "FOUNTAIN",
    "FORWARD",
    "STOP",
    "EVEN",
    "DIAGONAL",
    "FTL",
    "CM",
    "TWO",
    "GATE",
    "GRAPEVINE",
];

/// Where a dot is and how many beats are left when a continuity takes over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementState {
    pub position: Coordinate,
    pub remaining: f64,
}

/// Read-only view of the show a continuity computes against.
pub struct ContinuityContext<'a> {
    pub show: &'a Show,
    pub sheet: &'a Sheet,
    pub dot_type: DotType,
    /// The owning sheet's settings after the Sheet -> Song -> Show cascade.
    pub defaults: ResolvedDefaults,
}

impl<'a> ContinuityContext<'a> {
    pub fn new(show: &'a Show, sheet: &'a Sheet, dot_type: DotType) -> Self {
        Self {
            show,
            sheet,
            dot_type,
            defaults: show.resolved_defaults(sheet),
        }
    }

    /// Start position of a dot on the owning sheet.
    pub fn start_position(&self, dot: DotId) -> Option<Coordinate> {
        self.sheet.position(dot)
    }

    /// Position of a dot at the start of the following sheet.
    pub fn next_position(&self, dot: DotId) -> Option<Coordinate> {
        self.show
            .next_sheet(self.sheet.id())
            .and_then(|next| next.position(dot))
    }

    /// Dots this continuity's scope applies to.
    pub fn dots_in_scope(&self) -> Vec<DotId> {
        if self.dot_type.is_all() {
            self.sheet.dot_ids()
        } else {
            self.sheet.dots_of_type(self.dot_type)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuityInfo {
    pub tag: &'static str,
    pub name: &'static str,
}

/// Shared capability of every continuity variant.
pub trait ContinuityBehavior {
    fn info(&self) -> ContinuityInfo;

    /// Printable description of the continuity.
    fn text(&self) -> String;

    /// Movements for `dot` starting from `state`. Implementations must not
    /// consume more than `state.remaining` beats.
    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>>;
}

/// The closed set of continuity variants, serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContinuityKind {
    #[serde(rename = "FOUNTAIN")]
    FountainGrid(FountainGridContinuity),
    #[serde(rename = "FORWARD")]
    Forward(ForwardContinuity),
    #[serde(rename = "STOP")]
    Stop(StopContinuity),
    #[serde(rename = "EVEN")]
    Even(EvenContinuity),
    #[serde(rename = "DIAGONAL")]
    Diagonal(DiagonalContinuity),
    #[serde(rename = "FTL")]
    FollowLeader(FollowLeaderContinuity),
    #[serde(rename = "CM")]
    CounterMarch(CounterMarchContinuity),
    #[serde(rename = "TWO")]
    TwoStep(TwoStepContinuity),
    #[serde(rename = "GATE")]
    GateTurn(GateTurnContinuity),
    #[serde(rename = "GRAPEVINE")]
    Grapevine(GrapevineContinuity),
}

impl ContinuityKind {
    fn behavior(&self) -> &dyn ContinuityBehavior {
        match self {
            ContinuityKind::FountainGrid(c) => c,
            ContinuityKind::Forward(c) => c,
            ContinuityKind::Stop(c) => c,
            ContinuityKind::Even(c) => c,
            ContinuityKind::Diagonal(c) => c,
            ContinuityKind::FollowLeader(c) => c,
            ContinuityKind::CounterMarch(c) => c,
            ContinuityKind::TwoStep(c) => c,
            ContinuityKind::GateTurn(c) => c,
            ContinuityKind::Grapevine(c) => c,
        }
    }

    /// Build a variant from an editor-facing tag.
    pub fn create(tag: &str, dots: Vec<DotId>) -> Result<Self> {
        let kind = match tag {
            "EWNS" => ContinuityKind::FountainGrid(FountainGridContinuity::new(true, End::MT)),
            "NSEW" => ContinuityKind::FountainGrid(FountainGridContinuity::new(false, End::MT)),
            "FM" => ContinuityKind::Forward(ForwardContinuity::new(0.0, EAST)),
            "MT" => ContinuityKind::Stop(StopContinuity::new(true, Some(0.0))),
            "MTRM" => ContinuityKind::Stop(StopContinuity::new(true, None)),
            "CL" => ContinuityKind::Stop(StopContinuity::new(false, None)),
            "EVEN" => ContinuityKind::Even(EvenContinuity::default()),
            "DMHS" => ContinuityKind::Diagonal(DiagonalContinuity::new(true, End::MT)),
            "HSDM" => ContinuityKind::Diagonal(DiagonalContinuity::new(false, End::MT)),
            "FTL" => ContinuityKind::FollowLeader(FollowLeaderContinuity::new(dots, Vec::new())),
            "CM" => ContinuityKind::CounterMarch(CounterMarchContinuity::new(dots)),
            "TWO" => ContinuityKind::TwoStep(TwoStepContinuity::new(dots, Vec::new())?),
            "GT" => ContinuityKind::GateTurn(GateTurnContinuity::new(
                90.0,
                true,
                Coordinate::default(),
            )),
            "GV" => ContinuityKind::Grapevine(GrapevineContinuity::new(End::MT)),
            other => return Err(DrillError::UnknownContinuityType(other.to_string())),
        };
        Ok(kind)
    }

    /// Parse a serialized variant. The tag is checked against the closed set
    /// before any field is read.
    pub fn from_json(data: &Value) -> Result<Self> {
        check_tags(data, false)?;
        Ok(serde_json::from_value(data.clone())?)
    }

    pub fn options(&self) -> &ContinuityOptions {
        match self {
            ContinuityKind::FountainGrid(c) => &c.options,
            ContinuityKind::Forward(c) => &c.options,
            ContinuityKind::Stop(c) => &c.options,
            ContinuityKind::Even(c) => &c.options,
            ContinuityKind::Diagonal(c) => &c.options,
            ContinuityKind::FollowLeader(c) => &c.options,
            ContinuityKind::CounterMarch(c) => &c.options,
            ContinuityKind::TwoStep(c) => &c.options,
            ContinuityKind::GateTurn(c) => &c.options,
            ContinuityKind::Grapevine(c) => &c.options,
        }
    }

    pub fn options_mut(&mut self) -> &mut ContinuityOptions {
        match self {
            ContinuityKind::FountainGrid(c) => &mut c.options,
            ContinuityKind::Forward(c) => &mut c.options,
            ContinuityKind::Stop(c) => &mut c.options,
            ContinuityKind::Even(c) => &mut c.options,
            ContinuityKind::Diagonal(c) => &mut c.options,
            ContinuityKind::FollowLeader(c) => &mut c.options,
            ContinuityKind::CounterMarch(c) => &mut c.options,
            ContinuityKind::TwoStep(c) => &mut c.options,
            ContinuityKind::GateTurn(c) => &mut c.options,
            ContinuityKind::Grapevine(c) => &mut c.options,
        }
    }
}

impl ContinuityBehavior for ContinuityKind {
    fn info(&self) -> ContinuityInfo {
        self.behavior().info()
    }

    fn text(&self) -> String {
        self.behavior().text()
    }

    fn movements(
        &self,
        ctx: &ContinuityContext<'_>,
        dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        self.behavior().movements(ctx, dot, state)
    }
}

fn check_tags(data: &Value, nested: bool) -> Result<()> {
    let tag = data
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| DrillError::UnknownContinuityType(data["type"].to_string()))?;
    if !SERIALIZED_TAGS.contains(&tag) {
        return Err(DrillError::UnknownContinuityType(tag.to_string()));
    }
    if tag == "TWO" {
        if nested {
            return Err(DrillError::NestedTwoStep);
        }
        if let Some(children) = data.get("continuities").and_then(Value::as_array) {
            for child in children {
                check_tags(child, true)?;
            }
        }
    }
    Ok(())
}

/// A continuity bound to the sheet and dot-type scope that own it.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuity {
    sheet: SheetId,
    dot_type: DotType,
    pub kind: ContinuityKind,
}

impl Continuity {
    pub fn new(sheet: SheetId, dot_type: DotType, kind: ContinuityKind) -> Self {
        Self {
            sheet,
            dot_type,
            kind,
        }
    }

    /// Create a continuity from an editor tag. Ordered continuities start
    /// with every dot of the scope in roster order.
    pub fn create(tag: &str, show: &Show, sheet: &SheetId, dot_type: DotType) -> Result<Self> {
        let owner = show.sheet(sheet)?;
        let dots = if dot_type.is_all() {
            owner.dot_ids()
        } else {
            owner.dots_of_type(dot_type)
        };
        let reference = dots.first().and_then(|&dot| owner.position(dot));
        let mut kind = ContinuityKind::create(tag, dots)?;
        if let (ContinuityKind::GateTurn(gate), Some(reference)) = (&mut kind, reference) {
            // pivot on the first dot of the scope
            gate.reference = reference;
        }
        Ok(Self::new(sheet.clone(), dot_type, kind))
    }

    pub fn deserialize(sheet: &SheetId, dot_type: DotType, data: &Value) -> Result<Self> {
        let kind = ContinuityKind::from_json(data)?;
        Ok(Self::new(sheet.clone(), dot_type, kind))
    }

    pub fn serialize(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.kind)?)
    }

    pub fn sheet(&self) -> &SheetId {
        &self.sheet
    }

    pub fn dot_type(&self) -> DotType {
        self.dot_type
    }

    /// Move this continuity to another sheet, as done when a sheet is cloned.
    pub fn rebind(&mut self, sheet: SheetId) {
        self.sheet = sheet;
    }

    pub fn info(&self) -> ContinuityInfo {
        self.kind.info()
    }

    pub fn text(&self) -> String {
        self.kind.text()
    }

    /// Resolve the owning sheet through the show and compute the dot's
    /// movements.
    pub fn movements(
        &self,
        show: &Show,
        dot: DotId,
        state: &MovementState,
    ) -> Result<Vec<MovementCommand>> {
        let sheet = show.sheet(&self.sheet)?;
        let ctx = ContinuityContext::new(show, sheet, self.dot_type);
        self.kind.movements(&ctx, dot, state)
    }
}

/// Append one continuity's output to a chain, clipped to the beats the chain
/// has left, and advance `state` past it.
pub(crate) fn append_clipped(
    movements: &mut Vec<MovementCommand>,
    state: &mut MovementState,
    mut produced: Vec<MovementCommand>,
) {
    truncate_to(&mut produced, state.remaining);
    for movement in produced {
        state.remaining -= movement.duration();
        state.position = movement.end_position();
        push_merged(movements, movement);
    }
    state.remaining = round_small(state.remaining).max(0.0);
}

/// A hold for the given number of beats, or nothing if there are none.
pub(crate) fn hold(
    position: Coordinate,
    orientation: f64,
    beats: f64,
    marktime: bool,
    beats_per_step: u32,
) -> Option<MovementCommand> {
    if beats <= 0.0 {
        return None;
    }
    Some(StopCommand::new(position, orientation, beats, marktime, beats_per_step).into())
}

/// Short compass label for a heading in calchart degrees.
pub(crate) fn direction_label(direction: f64) -> String {
    let direction = crate::geometry::wrap(direction, 360.0);
    let label = match direction {
        d if d == 0.0 => "E",
        d if d == 45.0 => "SE",
        d if d == 90.0 => "S",
        d if d == 135.0 => "SW",
        d if d == 180.0 => "W",
        d if d == 225.0 => "NW",
        d if d == 270.0 => "N",
        d if d == 315.0 => "NE",
        d => return format!("{d}°"),
    };
    label.to_string()
}
