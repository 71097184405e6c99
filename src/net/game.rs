/// Game channel messages.
///
/// Server → client (tag byte first):
///   0 Create            u16 w, u16 h, u8 nameLen, name, u16 selfId
///   1 SetPlayers        repeated: u16 player, u16 hue, u8 bodyCount,
///                       per body: u16 body, u16 cellCount, cells (u16 x, u16 y)
///   2 AddPerks          repeated: u16 x, u16 y, u8 kind, [u16 owner]
///   3 AddPlayer         u16 player, u16 body, u16 hue, u16 x, u16 y
///   4 RemovePlayer      u16 player
///   5 ChangePlayerColor u16 player, u16 hue
///   6 SnakeChanges      repeated sub-ops, see `SnakeChange`
///
/// Client → server:
///   0 Move              u8 direction
///   1 RequestColorChange

use crate::domain::coord::{Coord, Direction, GridSize};
use crate::domain::perk::{Perk, PerkKind};
use crate::domain::player::{BodyId, Hue, PlayerId};

use super::wire::{length_prefix, Channel, DecodeError, EncodeError, WireReader, WireWriter};

// ══════════════════════════════════════════════════════════════
// Server → client
// ══════════════════════════════════════════════════════════════

/// One player record of a `SetPlayers` snapshot.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub hue: Hue,
    pub bodies: Vec<(BodyId, Vec<Coord>)>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SnakeChange {
    /// Pop the tail cell.
    Shrink { player: PlayerId, body: BodyId },
    /// Push a new head cell.
    GrowHead { player: PlayerId, body: BodyId, head: Coord },
    /// Replace the whole body with a single head cell.
    Respawn { player: PlayerId, body: BodyId, head: Coord },
    RemoveBody { player: PlayerId, body: BodyId },
    /// Reverse every body of the player.
    ReverseBody { player: PlayerId },
}

impl SnakeChange {
    fn sub_tag(&self) -> u8 {
        match self {
            SnakeChange::Shrink { .. } => 0,
            SnakeChange::GrowHead { .. } => 1,
            SnakeChange::Respawn { .. } => 2,
            SnakeChange::RemoveBody { .. } => 3,
            SnakeChange::ReverseBody { .. } => 4,
        }
    }

    pub fn player(&self) -> PlayerId {
        match *self {
            SnakeChange::Shrink { player, .. }
            | SnakeChange::GrowHead { player, .. }
            | SnakeChange::Respawn { player, .. }
            | SnakeChange::RemoveBody { player, .. }
            | SnakeChange::ReverseBody { player } => player,
        }
    }

    fn decode(r: &mut WireReader) -> Result<Self, DecodeError> {
        let tag = r.read_u8()?;
        Ok(match tag {
            0 => SnakeChange::Shrink { player: r.read_u16()?, body: r.read_u16()? },
            1 => SnakeChange::GrowHead { player: r.read_u16()?, body: r.read_u16()?, head: r.read_coord()? },
            2 => SnakeChange::Respawn { player: r.read_u16()?, body: r.read_u16()?, head: r.read_coord()? },
            3 => SnakeChange::RemoveBody { player: r.read_u16()?, body: r.read_u16()? },
            4 => SnakeChange::ReverseBody { player: r.read_u16()? },
            tag => return Err(DecodeError::UnknownSubTag { tag }),
        })
    }

    fn encode(&self, w: &mut WireWriter) {
        w.write_u8(self.sub_tag());
        match *self {
            SnakeChange::Shrink { player, body } | SnakeChange::RemoveBody { player, body } => {
                w.write_u16(player);
                w.write_u16(body);
            }
            SnakeChange::GrowHead { player, body, head } | SnakeChange::Respawn { player, body, head } => {
                w.write_u16(player);
                w.write_u16(body);
                w.write_coord(head);
            }
            SnakeChange::ReverseBody { player } => w.write_u16(player),
        }
    }
}

/// A decoded server → client game message.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Create { size: GridSize, name: String, self_id: PlayerId },
    SetPlayers(Vec<PlayerSnapshot>),
    AddPerks(Vec<Perk>),
    AddPlayer { player: PlayerId, body: BodyId, hue: Hue, head: Coord },
    RemovePlayer(PlayerId),
    ChangePlayerColor { player: PlayerId, hue: Hue },
    SnakeChanges(Vec<SnakeChange>),
}

impl GameEvent {
    fn tag(&self) -> u8 {
        match self {
            GameEvent::Create { .. } => 0,
            GameEvent::SetPlayers(_) => 1,
            GameEvent::AddPerks(_) => 2,
            GameEvent::AddPlayer { .. } => 3,
            GameEvent::RemovePlayer(_) => 4,
            GameEvent::ChangePlayerColor { .. } => 5,
            GameEvent::SnakeChanges(_) => 6,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Create { .. } => "Create",
            GameEvent::SetPlayers(_) => "SetPlayers",
            GameEvent::AddPerks(_) => "AddPerks",
            GameEvent::AddPlayer { .. } => "AddPlayer",
            GameEvent::RemovePlayer(_) => "RemovePlayer",
            GameEvent::ChangePlayerColor { .. } => "ChangePlayerColor",
            GameEvent::SnakeChanges(_) => "SnakeChanges",
        }
    }

    /// Decode one complete message. Either the whole message decodes
    /// or an error is returned; there is no partial event.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut r = WireReader::new(data);
        let tag = r.read_u8()?;
        let event = match tag {
            0 => {
                let size = GridSize::new(r.read_u16()?, r.read_u16()?);
                let name_len = r.read_u8()? as usize;
                let name = r.read_string(name_len)?;
                GameEvent::Create { size, name, self_id: r.read_u16()? }
            }
            1 => {
                let mut players = Vec::new();
                while r.available() {
                    players.push(decode_player(&mut r)?);
                }
                GameEvent::SetPlayers(players)
            }
            2 => {
                let mut perks = Vec::new();
                while r.available() {
                    perks.push(decode_perk(&mut r)?);
                }
                GameEvent::AddPerks(perks)
            }
            3 => GameEvent::AddPlayer {
                player: r.read_u16()?,
                body: r.read_u16()?,
                hue: r.read_u16()?,
                head: r.read_coord()?,
            },
            4 => GameEvent::RemovePlayer(r.read_u16()?),
            5 => GameEvent::ChangePlayerColor { player: r.read_u16()?, hue: r.read_u16()? },
            6 => {
                let mut changes = Vec::new();
                while r.available() {
                    changes.push(SnakeChange::decode(&mut r)?);
                }
                GameEvent::SnakeChanges(changes)
            }
            tag => return Err(DecodeError::UnknownTag { channel: Channel::Game, tag }),
        };
        Ok(event)
    }

    /// Server-side encoding. Used for captures, the demo session and tests.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut w = WireWriter::with_tag(self.tag());
        match self {
            GameEvent::Create { size, name, self_id } => {
                w.write_u16(size.width);
                w.write_u16(size.height);
                w.write_string_u8(name)?;
                w.write_u16(*self_id);
            }
            GameEvent::SetPlayers(players) => {
                for p in players {
                    w.write_u16(p.id);
                    w.write_u16(p.hue);
                    w.write_u8(length_prefix(p.bodies.len(), u8::MAX as usize)?);
                    for (body_id, cells) in &p.bodies {
                        w.write_u16(*body_id);
                        w.write_u16(length_prefix(cells.len(), u16::MAX as usize)?);
                        for &c in cells {
                            w.write_coord(c);
                        }
                    }
                }
            }
            GameEvent::AddPerks(perks) => {
                for perk in perks {
                    w.write_coord(perk.coord);
                    w.write_u8(perk.kind.wire_value());
                    if perk.kind.has_owner() {
                        w.write_u16(perk.owner.unwrap_or_default());
                    }
                }
            }
            GameEvent::AddPlayer { player, body, hue, head } => {
                w.write_u16(*player);
                w.write_u16(*body);
                w.write_u16(*hue);
                w.write_coord(*head);
            }
            GameEvent::RemovePlayer(player) => w.write_u16(*player),
            GameEvent::ChangePlayerColor { player, hue } => {
                w.write_u16(*player);
                w.write_u16(*hue);
            }
            GameEvent::SnakeChanges(changes) => {
                for change in changes {
                    change.encode(&mut w);
                }
            }
        }
        Ok(w.into_bytes())
    }
}

fn decode_player(r: &mut WireReader) -> Result<PlayerSnapshot, DecodeError> {
    let id = r.read_u16()?;
    let hue = r.read_u16()?;
    let body_count = r.read_u8()?;
    let mut bodies = Vec::with_capacity(body_count as usize);
    for _ in 0..body_count {
        let body_id = r.read_u16()?;
        let cell_count = r.read_u16()?;
        // Bound the allocation by what the buffer can actually hold.
        let mut cells = Vec::with_capacity((cell_count as usize).min(r.remaining() / 4));
        for _ in 0..cell_count {
            cells.push(r.read_coord()?);
        }
        bodies.push((body_id, cells));
    }
    Ok(PlayerSnapshot { id, hue, bodies })
}

fn decode_perk(r: &mut WireReader) -> Result<Perk, DecodeError> {
    let coord = r.read_coord()?;
    let kind = PerkKind::from_wire(r.read_u8()?);
    let owner = if kind.has_owner() { Some(r.read_u16()?) } else { None };
    Ok(Perk { coord, kind, owner })
}

// ══════════════════════════════════════════════════════════════
// Client → server
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameRequest {
    Move(Direction),
    RequestColorChange,
}

impl GameRequest {
    #[allow(dead_code)]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            GameRequest::Move(dir) => vec![0, dir.wire_value()],
            GameRequest::RequestColorChange => vec![1],
        }
    }

    #[allow(dead_code)]
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut r = WireReader::new(data);
        match r.read_u8()? {
            0 => {
                let value = r.read_u8()?;
                Direction::from_wire(value)
                    .map(GameRequest::Move)
                    .ok_or(DecodeError::InvalidDirection { value })
            }
            1 => Ok(GameRequest::RequestColorChange),
            tag => Err(DecodeError::UnknownTag { channel: Channel::Game, tag }),
        }
    }
}
