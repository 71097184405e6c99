/// Lobby registry: the games the server currently lists.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::net::lobby::{GameId, GameListing, LobbyEvent};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LobbyOutcome {
    Updated,
    /// The game we created is ready; open its game channel.
    Join(GameId),
    /// The event named a game that is not listed. Nothing changed.
    Stale(GameId),
}

#[derive(Clone, Debug, Default)]
pub struct LobbyState {
    games: BTreeMap<GameId, GameListing>,
}

impl LobbyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: LobbyEvent) -> LobbyOutcome {
        match event {
            LobbyEvent::AddGames(listings) => {
                for listing in listings {
                    debug!(game = listing.id, name = %listing.name, "game listed");
                    self.games.insert(listing.id, listing);
                }
                LobbyOutcome::Updated
            }
            LobbyEvent::RemoveGame(id) => match self.games.remove(&id) {
                Some(_) => LobbyOutcome::Updated,
                None => stale(id),
            },
            LobbyEvent::UpdatePlayerCount { game, count } => match self.games.get_mut(&game) {
                Some(listing) => {
                    listing.player_count = count;
                    LobbyOutcome::Updated
                }
                None => stale(game),
            },
            LobbyEvent::JoinCreated(id) => LobbyOutcome::Join(id),
        }
    }

    /// Listings in id order.
    pub fn games(&self) -> impl Iterator<Item = &GameListing> {
        self.games.values()
    }

    pub fn get(&self, id: GameId) -> Option<&GameListing> {
        self.games.get(&id)
    }
}

fn stale(id: GameId) -> LobbyOutcome {
    warn!(game = id, "lobby update for unlisted game ignored");
    LobbyOutcome::Stale(id)
}
