/// WorldState: the client's copy of a running game.
///
/// `apply()` is the sole mutator. Each call returns the draw instructions
/// for exactly the cells it touched, in the order they must be issued:
///
///   SetPlayers         clear old cells, draw every listed segment
///   AddPlayer          draw the egg
///   RemovePlayer       clear every cell
///   ChangePlayerColor  redraw every segment in the new hue
///   Shrink             clear old tail, redraw new tail
///   GrowHead           redraw old head (now index 1), draw new head
///   Respawn            clear old body, draw the egg
///   RemoveBody         clear its cells
///   ReverseBody        redraw both ends of every body of the player
///   AddPerks           draw each perk
///   Create             full repaint
///
/// ## Predictive perk removal
///
/// GrowHead deletes any perk under the new head. The server never sends
/// a removal for eaten perks; this assumes the server decides the same.
///
/// ## Stale references
///
/// A mutation naming a missing player or body is skipped and reported as
/// `WorldEvent::StaleReference`. It never fails the whole message.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::domain::coord::{Coord, GridSize};
use crate::domain::perk::{Perk, PerkKind};
use crate::domain::player::{Body, BodyId, Hue, Player, PlayerId};
use crate::net::game::{GameEvent, PlayerSnapshot, SnakeChange};
use crate::sprite::orientation;

use super::event::WorldEvent;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldState {
    size: GridSize,
    name: String,
    self_id: PlayerId,
    players: BTreeMap<PlayerId, Player>,
    perks: HashMap<Coord, Perk>,
}

impl WorldState {
    pub fn new(size: GridSize, name: impl Into<String>, self_id: PlayerId) -> Self {
        WorldState {
            size,
            name: name.into(),
            self_id,
            players: BTreeMap::new(),
            perks: HashMap::new(),
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn self_id(&self) -> PlayerId {
        self.self_id
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    #[allow(dead_code)]
    pub fn body(&self, player: PlayerId, body: BodyId) -> Option<&Body> {
        self.players.get(&player)?.bodies.get(&body)
    }

    #[allow(dead_code)]
    pub fn perk_at(&self, cell: Coord) -> Option<&Perk> {
        self.perks.get(&cell)
    }

    pub fn perk_count(&self) -> usize {
        self.perks.len()
    }

    /// Hues currently in use, one entry per distinct hue.
    pub fn active_hues(&self) -> Vec<Hue> {
        let mut hues: Vec<Hue> = self.players.values().map(|p| p.hue).collect();
        hues.sort_unstable();
        hues.dedup();
        hues
    }

    // ══════════════════════════════════════════════════════════════
    // Transitions
    // ══════════════════════════════════════════════════════════════

    pub fn apply(&mut self, event: &GameEvent) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        match event {
            GameEvent::Create { size, name, self_id } => {
                *self = WorldState::new(*size, name.clone(), *self_id);
                events.push(WorldEvent::Repaint);
            }
            GameEvent::SetPlayers(snapshots) => {
                for snapshot in snapshots {
                    self.set_player(snapshot, &mut events);
                }
            }
            GameEvent::AddPerks(perks) => {
                for perk in perks {
                    self.add_perk(*perk, &mut events);
                }
            }
            GameEvent::AddPlayer { player, body, hue, head } => {
                if let Some(old) = self.players.remove(player) {
                    clear_player(&old, &mut events);
                }
                let mut p = Player::new(*player, *hue);
                p.bodies.insert(*body, Body::single(*head));
                self.players.insert(*player, p);
                self.draw_segment(*player, *body, 0, &mut events);
            }
            GameEvent::RemovePlayer(id) => match self.players.remove(id) {
                Some(old) => clear_player(&old, &mut events),
                None => events.push(stale(*id, None)),
            },
            GameEvent::ChangePlayerColor { player, hue } => match self.players.get_mut(player) {
                Some(p) => {
                    p.hue = *hue;
                    self.draw_player(*player, &mut events);
                }
                None => events.push(stale(*player, None)),
            },
            GameEvent::SnakeChanges(changes) => {
                for change in changes {
                    self.apply_change(change, &mut events);
                }
            }
        }
        events
    }

    fn set_player(&mut self, snapshot: &PlayerSnapshot, events: &mut Vec<WorldEvent>) {
        if let Some(old) = self.players.remove(&snapshot.id) {
            clear_player(&old, events);
        }
        let mut player = Player::new(snapshot.id, snapshot.hue);
        for (id, cells) in &snapshot.bodies {
            player.bodies.insert(*id, Body::from(cells.clone()));
        }
        self.players.insert(snapshot.id, player);
        self.draw_player(snapshot.id, events);
    }

    fn add_perk(&mut self, perk: Perk, events: &mut Vec<WorldEvent>) {
        if let PerkKind::Unknown(kind) = perk.kind {
            warn!(kind, cell = %perk.coord, "unknown perk kind, stored without a visual");
        }
        self.perks.insert(perk.coord, perk);
        events.push(WorldEvent::DrawPerk {
            cell: perk.coord,
            kind: perk.kind,
            owned: perk.is_owned_by(self.self_id),
        });
    }

    fn apply_change(&mut self, change: &SnakeChange, events: &mut Vec<WorldEvent>) {
        match *change {
            SnakeChange::Shrink { player, body } => {
                let Some(b) = self.body_mut(player, body) else {
                    events.push(stale(player, Some(body)));
                    return;
                };
                let popped = b.shrink();
                let len = b.len();
                if let Some(tail) = popped {
                    events.push(WorldEvent::ClearCell(tail));
                }
                if len > 0 {
                    self.draw_segment(player, body, len - 1, events);
                }
            }
            SnakeChange::GrowHead { player, body, head } => {
                let Some(b) = self.body_mut(player, body) else {
                    events.push(stale(player, Some(body)));
                    return;
                };
                b.grow_head(head);
                let len = b.len();
                if let Some(eaten) = self.perks.remove(&head) {
                    debug!(cell = %head, kind = ?eaten.kind, player, "perk eaten");
                    events.push(WorldEvent::ClearCell(head));
                }
                if len >= 2 {
                    self.draw_segment(player, body, 1, events);
                }
                self.draw_segment(player, body, 0, events);
            }
            SnakeChange::Respawn { player, body, head } => {
                let Some(p) = self.players.get_mut(&player) else {
                    events.push(stale(player, Some(body)));
                    return;
                };
                if let Some(old) = p.bodies.insert(body, Body::single(head)) {
                    events.extend(old.iter().map(WorldEvent::ClearCell));
                }
                self.draw_segment(player, body, 0, events);
            }
            SnakeChange::RemoveBody { player, body } => {
                match self.players.get_mut(&player).and_then(|p| p.bodies.remove(&body)) {
                    Some(old) => events.extend(old.iter().map(WorldEvent::ClearCell)),
                    None => events.push(stale(player, Some(body))),
                }
            }
            SnakeChange::ReverseBody { player } => {
                let Some(p) = self.players.get_mut(&player) else {
                    events.push(stale(player, None));
                    return;
                };
                let mut ends = Vec::with_capacity(p.bodies.len());
                for (id, b) in p.bodies.iter_mut().filter(|(_, b)| !b.is_empty()) {
                    b.reverse();
                    ends.push((*id, b.len()));
                }
                for (id, len) in ends {
                    self.draw_segment(player, id, 0, events);
                    if len > 1 {
                        self.draw_segment(player, id, len - 1, events);
                    }
                }
            }
        }
    }

    fn body_mut(&mut self, player: PlayerId, body: BodyId) -> Option<&mut Body> {
        self.players.get_mut(&player)?.bodies.get_mut(&body)
    }

    // ══════════════════════════════════════════════════════════════
    // Draw instructions
    // ══════════════════════════════════════════════════════════════

    fn draw_segment(&self, player: PlayerId, body: BodyId, index: usize, events: &mut Vec<WorldEvent>) {
        let Some(p) = self.players.get(&player) else { return };
        let Some(b) = p.bodies.get(&body) else { return };
        if let Some(cell) = b.get(index) {
            events.push(WorldEvent::DrawFrame {
                cell,
                frame: orientation::frame_for(b, index, self.size),
                hue: p.hue,
            });
        }
    }

    fn draw_player(&self, player: PlayerId, events: &mut Vec<WorldEvent>) {
        let Some(p) = self.players.get(&player) else { return };
        for (id, b) in &p.bodies {
            for index in 0..b.len() {
                self.draw_segment(player, *id, index, events);
            }
        }
    }

    /// Draw instructions for the whole world: every segment, then every perk.
    pub fn paint_all(&self) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        for id in self.players.keys() {
            self.draw_player(*id, &mut events);
        }
        let mut perks: Vec<&Perk> = self.perks.values().collect();
        perks.sort_by_key(|p| p.coord);
        events.extend(perks.into_iter().map(|p| WorldEvent::DrawPerk {
            cell: p.coord,
            kind: p.kind,
            owned: p.is_owned_by(self.self_id),
        }));
        events
    }
}

fn clear_player(player: &Player, events: &mut Vec<WorldEvent>) {
    for body in player.bodies.values() {
        events.extend(body.iter().map(WorldEvent::ClearCell));
    }
}

fn stale(player: PlayerId, body: Option<BodyId>) -> WorldEvent {
    match body {
        Some(body) => warn!(player, body, "stale reference, mutation skipped"),
        None => warn!(player, "stale reference, mutation skipped"),
    }
    WorldEvent::StaleReference { player, body }
}
