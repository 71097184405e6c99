/// Scripted session, encoded exactly as a server would send it.
///
/// The lobby prelude lists a few games and confirms ours. The game
/// channel part covers a wraparound run, eating a perk, a teleport,
/// a reversal, a colour change, a second body, a respawn and a player
/// leaving.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::domain::coord::{Coord, Direction, GridSize};
use crate::domain::perk::{Perk, PerkKind};
use crate::domain::player::{Body, BodyId, Hue, PlayerId};
use crate::net::game::{GameEvent, PlayerSnapshot, SnakeChange};
use crate::net::lobby::{GameId, GameListing, GameSettings, LobbyEvent, LobbyRequest};
use crate::net::wire::EncodeError;
use crate::sim::lobby::{LobbyOutcome, LobbyState};

pub const GRID: GridSize = GridSize::new(24, 14);
pub const SELF_ID: PlayerId = 1;
pub const DEMO_GAME: GameId = 7;

struct Snake {
    body: Body,
    dir: Direction,
}

/// Server-side bookkeeping while the script is written.
struct Script {
    snakes: BTreeMap<(PlayerId, BodyId), Snake>,
    perks: HashSet<Coord>,
    pending: Vec<SnakeChange>,
    messages: Vec<GameEvent>,
}

impl Script {
    fn new() -> Self {
        Script {
            snakes: BTreeMap::new(),
            perks: HashSet::new(),
            pending: Vec::new(),
            messages: Vec::new(),
        }
    }

    fn send(&mut self, event: GameEvent) {
        self.messages.push(event);
    }

    fn spawn_players(&mut self, players: &[(PlayerId, Hue, &[(u16, u16)], Direction)]) {
        let mut snapshots = Vec::new();
        for &(id, hue, cells, dir) in players {
            let cells: Vec<Coord> = cells.iter().map(|&(x, y)| Coord::new(x, y)).collect();
            self.snakes.insert((id, 0), Snake { body: Body::from(cells.clone()), dir });
            snapshots.push(PlayerSnapshot { id, hue, bodies: vec![(0, cells)] });
        }
        self.send(GameEvent::SetPlayers(snapshots));
    }

    fn add_player(&mut self, id: PlayerId, hue: Hue, head: Coord, dir: Direction) {
        self.snakes.insert((id, 0), Snake { body: Body::single(head), dir });
        self.send(GameEvent::AddPlayer { player: id, body: 0, hue, head });
    }

    fn remove_player(&mut self, id: PlayerId) {
        self.snakes.retain(|&(p, _), _| p != id);
        self.send(GameEvent::RemovePlayer(id));
    }

    fn add_perks(&mut self, perks: Vec<Perk>) {
        self.perks.extend(perks.iter().map(|p| p.coord));
        self.send(GameEvent::AddPerks(perks));
    }

    fn turn(&mut self, player: PlayerId, body: BodyId, dir: Direction) {
        if let Some(s) = self.snakes.get_mut(&(player, body)) {
            s.dir = dir;
        }
    }

    /// Relocate the head without a connecting step.
    fn teleport(&mut self, player: PlayerId, body: BodyId, to: Coord) {
        if let Some(s) = self.snakes.get_mut(&(player, body)) {
            s.body.shrink();
            s.body.grow_head(to);
            self.pending.push(SnakeChange::Shrink { player, body });
            self.pending.push(SnakeChange::GrowHead { player, body, head: to });
        }
    }

    fn reverse(&mut self, player: PlayerId) {
        for (&(p, _), s) in self.snakes.iter_mut() {
            if p != player {
                continue;
            }
            s.body.reverse();
            // keep moving away from the old neck
            if let (Some(head), Some(neck)) = (s.body.head(), s.body.get(1)) {
                if let Some(d) = Direction::ALL.into_iter().find(|&d| neck.step(d, GRID) == head) {
                    s.dir = d;
                }
            }
        }
        self.pending.push(SnakeChange::ReverseBody { player });
    }

    fn respawn(&mut self, player: PlayerId, body: BodyId, head: Coord, dir: Direction) {
        self.snakes.insert((player, body), Snake { body: Body::single(head), dir });
        self.pending.push(SnakeChange::Respawn { player, body, head });
    }

    /// One server tick: every snake advances one cell, growing instead
    /// of shrinking when it lands on a perk.
    fn tick(&mut self) {
        let mut changes = std::mem::take(&mut self.pending);
        for (&(player, body), s) in self.snakes.iter_mut() {
            let Some(head) = s.body.head() else { continue };
            let next = head.step(s.dir, GRID);
            if !self.perks.remove(&next) {
                s.body.shrink();
                changes.push(SnakeChange::Shrink { player, body });
            }
            s.body.grow_head(next);
            changes.push(SnakeChange::GrowHead { player, body, head: next });
        }
        self.send(GameEvent::SnakeChanges(changes));
    }

    fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }
}

/// The demo session as typed events.
pub fn events() -> Vec<GameEvent> {
    use Direction::*;

    let mut s = Script::new();
    s.send(GameEvent::Create { size: GRID, name: String::from("Demo"), self_id: SELF_ID });
    s.spawn_players(&[
        (SELF_ID, 120, &[(5, 3), (4, 3), (3, 3), (2, 3)], Right),
        (2, 280, &[(12, 9), (12, 10), (12, 11)], Up),
    ]);
    s.add_perks(vec![
        Perk::new(Coord::new(9, 3), PerkKind::Food),
        Perk::owned(Coord::new(15, 3), PerkKind::ReservedFood, SELF_ID),
        Perk::new(Coord::new(12, 5), PerkKind::Teleporter),
        Perk::new(Coord::new(18, 9), PerkKind::Reverser),
        Perk::new(Coord::new(16, 6), PerkKind::SpeedBoost),
        Perk::new(Coord::new(8, 12), PerkKind::FoodFrenzy),
        Perk::new(Coord::new(3, 7), PerkKind::MinesTrail),
        Perk::owned(Coord::new(20, 12), PerkKind::Mine, 2),
        Perk::new(Coord::new(21, 1), PerkKind::MultiSnakeGrant),
    ]);

    s.ticks(3);
    s.add_player(3, 200, Coord::new(20, 7), Left);
    s.ticks(1);
    // player 2 reaches the teleporter and comes out elsewhere
    s.teleport(2, 0, Coord::new(4, 11));
    s.turn(2, 0, Right);
    s.ticks(4);
    s.turn(3, 0, Down);
    s.ticks(3);
    // player 1 crosses the right edge
    s.ticks(12);
    s.reverse(SELF_ID);
    s.ticks(4);
    s.send(GameEvent::ChangePlayerColor { player: SELF_ID, hue: 30 });
    s.respawn(SELF_ID, 1, Coord::new(10, 10), Down);
    s.ticks(5);
    s.turn(SELF_ID, 1, Right);
    s.ticks(3);
    s.respawn(2, 0, Coord::new(18, 2), Left);
    s.ticks(3);
    s.remove_player(3);
    s.ticks(4);
    s.messages
}

/// The demo session as wire messages.
pub fn script() -> Result<Vec<Vec<u8>>, EncodeError> {
    events().iter().map(GameEvent::encode).collect()
}

/// What the client asks the lobby for before the demo game starts.
pub fn create_request() -> LobbyRequest {
    LobbyRequest::CreateAndJoin(GameSettings {
        name: String::from("Demo"),
        size: GRID,
        reverser: true,
        teleporter: true,
        multi_snake: true,
        ..GameSettings::default()
    })
}

/// Lobby traffic around the demo: a listing, a player count update,
/// a game going away, then the server confirming our created game.
pub fn lobby_script() -> Result<Vec<Vec<u8>>, EncodeError> {
    let listing = |id: GameId, name: &str, size: GridSize, players: u8| GameListing {
        id,
        name: name.to_string(),
        size,
        speed: 10,
        player_count: players,
    };
    [
        LobbyEvent::AddGames(vec![
            listing(DEMO_GAME - 1, "Arena", GridSize::new(32, 32), 3),
            listing(DEMO_GAME + 1, "Maze", GridSize::new(48, 24), 1),
        ]),
        LobbyEvent::UpdatePlayerCount { game: DEMO_GAME + 1, count: 0 },
        LobbyEvent::RemoveGame(DEMO_GAME + 1),
        LobbyEvent::AddGames(vec![listing(DEMO_GAME, "Demo", GRID, 0)]),
        LobbyEvent::JoinCreated(DEMO_GAME),
    ]
    .iter()
    .map(LobbyEvent::encode)
    .collect()
}

/// Run the lobby prelude and return the listing of the game to join.
pub fn join_via_lobby() -> Result<Option<GameListing>, Box<dyn std::error::Error>> {
    let request = create_request().encode()?;
    debug!(len = request.len(), "create-and-join request");

    let mut lobby = LobbyState::new();
    for bytes in lobby_script()? {
        let event = LobbyEvent::decode(&bytes)?;
        if let LobbyOutcome::Join(id) = lobby.apply(event) {
            let listing = lobby.get(id).cloned();
            info!(game = id, listed = lobby.games().count(), "joining game");
            return Ok(listing);
        }
    }
    Ok(None)
}
