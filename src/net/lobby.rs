/// Lobby channel messages.
///
/// Server → client:
///   0 AddGames          repeated: u16 id, u8 nameLen, name, u16 w, u16 h, u8 speed, u8 players
///   1 RemoveGame        u16 id
///   2 UpdatePlayerCount u16 id, u8 count
///   3 JoinCreated       u16 id
///
/// Client → server:
///   0 CreateAndJoin     see `GameSettings`

use crate::domain::coord::GridSize;

use super::wire::{Channel, DecodeError, EncodeError, WireReader, WireWriter};

pub type GameId = u16;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameListing {
    pub id: GameId,
    pub name: String,
    pub size: GridSize,
    pub speed: u8,
    pub player_count: u8,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LobbyEvent {
    AddGames(Vec<GameListing>),
    RemoveGame(GameId),
    UpdatePlayerCount { game: GameId, count: u8 },
    /// The game we asked to create exists; join it.
    JoinCreated(GameId),
}

impl LobbyEvent {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut r = WireReader::new(data);
        match r.read_u8()? {
            0 => {
                let mut games = Vec::new();
                while r.available() {
                    let id = r.read_u16()?;
                    let name_len = r.read_u8()? as usize;
                    let name = r.read_string(name_len)?;
                    let size = GridSize::new(r.read_u16()?, r.read_u16()?);
                    games.push(GameListing {
                        id,
                        name,
                        size,
                        speed: r.read_u8()?,
                        player_count: r.read_u8()?,
                    });
                }
                Ok(LobbyEvent::AddGames(games))
            }
            1 => Ok(LobbyEvent::RemoveGame(r.read_u16()?)),
            2 => Ok(LobbyEvent::UpdatePlayerCount { game: r.read_u16()?, count: r.read_u8()? }),
            3 => Ok(LobbyEvent::JoinCreated(r.read_u16()?)),
            tag => Err(DecodeError::UnknownTag { channel: Channel::Lobby, tag }),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let bytes = match self {
            LobbyEvent::AddGames(games) => {
                let mut w = WireWriter::with_tag(0);
                for g in games {
                    w.write_u16(g.id);
                    w.write_string_u8(&g.name)?;
                    w.write_u16(g.size.width);
                    w.write_u16(g.size.height);
                    w.write_u8(g.speed);
                    w.write_u8(g.player_count);
                }
                w.into_bytes()
            }
            LobbyEvent::RemoveGame(id) => {
                let mut w = WireWriter::with_tag(1);
                w.write_u16(*id);
                w.into_bytes()
            }
            LobbyEvent::UpdatePlayerCount { game, count } => {
                let mut w = WireWriter::with_tag(2);
                w.write_u16(*game);
                w.write_u8(*count);
                w.into_bytes()
            }
            LobbyEvent::JoinCreated(id) => {
                let mut w = WireWriter::with_tag(3);
                w.write_u16(*id);
                w.into_bytes()
            }
        };
        Ok(bytes)
    }
}

/// Parameters of a new game. Perk toggles are flags; counted perks
/// use 0 for "disabled".
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameSettings {
    pub name: String,
    pub size: GridSize,
    pub speed: u8,
    pub food_count: u16,
    pub food_strength: u16,
    pub reserved_food: bool,
    pub reverser: bool,
    pub teleporter: bool,
    pub speed_boost_duration: u16,
    pub food_frenzy_count: u8,
    pub mines_trail_count: u8,
    pub multi_snake: bool,
    pub perk_spacing: u16,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            name: String::from("Game"),
            size: GridSize::new(32, 32),
            speed: 10,
            food_count: 16,
            food_strength: 1,
            reserved_food: false,
            reverser: false,
            teleporter: false,
            speed_boost_duration: 0,
            food_frenzy_count: 0,
            mines_trail_count: 0,
            multi_snake: false,
            perk_spacing: 1,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LobbyRequest {
    CreateAndJoin(GameSettings),
}

impl LobbyRequest {
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let LobbyRequest::CreateAndJoin(s) = self;
        let mut w = WireWriter::with_tag(0);
        w.write_string_u16(&s.name)?;
        w.write_u16(s.size.width);
        w.write_u16(s.size.height);
        w.write_u8(s.speed);
        w.write_u16(s.food_count);
        w.write_u16(s.food_strength);
        w.write_u8(s.reserved_food as u8);
        w.write_u8(s.reverser as u8);
        w.write_u8(s.teleporter as u8);
        w.write_u16(s.speed_boost_duration);
        w.write_u8(s.food_frenzy_count);
        w.write_u8(s.mines_trail_count);
        w.write_u8(s.multi_snake as u8);
        w.write_u16(s.perk_spacing);
        Ok(w.into_bytes())
    }

    #[allow(dead_code)]
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut r = WireReader::new(data);
        match r.read_u8()? {
            0 => {
                let name_len = r.read_u16()? as usize;
                let name = r.read_string(name_len)?;
                Ok(LobbyRequest::CreateAndJoin(GameSettings {
                    name,
                    size: GridSize::new(r.read_u16()?, r.read_u16()?),
                    speed: r.read_u8()?,
                    food_count: r.read_u16()?,
                    food_strength: r.read_u16()?,
                    reserved_food: r.read_u8()? > 0,
                    reverser: r.read_u8()? > 0,
                    teleporter: r.read_u8()? > 0,
                    speed_boost_duration: r.read_u16()?,
                    food_frenzy_count: r.read_u8()?,
                    mines_trail_count: r.read_u8()?,
                    multi_snake: r.read_u8()? > 0,
                    perk_spacing: r.read_u16()?,
                }))
            }
            tag => Err(DecodeError::UnknownTag { channel: Channel::Lobby, tag }),
        }
    }
}
