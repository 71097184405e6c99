/// Draw instructions emitted by `WorldState::apply`.
/// The presentation layer consumes these; the world never draws itself.

use crate::domain::coord::Coord;
use crate::domain::perk::PerkKind;
use crate::domain::player::{BodyId, Hue, PlayerId};
use crate::sprite::orientation::FrameIndex;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WorldEvent {
    /// Clear the cell, then draw `frame` tinted with `hue`.
    DrawFrame { cell: Coord, frame: FrameIndex, hue: Hue },
    ClearCell(Coord),
    DrawPerk { cell: Coord, kind: PerkKind, owned: bool },
    /// Everything on screen is invalid; redraw the whole world.
    Repaint,
    /// A mutation named a player or body that no longer exists.
    /// The mutation was skipped.
    StaleReference { player: PlayerId, body: Option<BodyId> },
}

impl WorldEvent {
    #[allow(dead_code)]
    pub fn is_draw(&self) -> bool {
        !matches!(self, WorldEvent::StaleReference { .. })
    }
}
