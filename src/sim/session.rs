/// Game-channel session: decode one message, apply it, hand back the
/// draw instructions. The world exists from `Create` until `close`.

use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::player::Hue;
use crate::net::game::GameEvent;
use crate::net::wire::DecodeError;

use super::event::WorldEvent;
use super::world::WorldState;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("corrupt game message: {0}")]
    Decode(#[from] DecodeError),

    #[error("{event} received before Create")]
    NotCreated { event: &'static str },
}

#[derive(Debug, Default)]
pub struct GameSession {
    world: Option<WorldState>,
    messages: u64,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> Option<&WorldState> {
        self.world.as_ref()
    }

    #[allow(dead_code)]
    pub fn messages(&self) -> u64 {
        self.messages
    }

    /// Decode and apply one complete message. On error nothing is applied.
    pub fn handle(&mut self, bytes: &[u8]) -> Result<Vec<WorldEvent>, SessionError> {
        let event = GameEvent::decode(bytes).map_err(|e| {
            error!(error = %e, len = bytes.len(), "game message rejected");
            e
        })?;
        self.messages += 1;
        debug!(n = self.messages, event = event.name(), len = bytes.len(), "game message");

        if let GameEvent::Create { size, name, self_id } = &event {
            info!(width = size.width, height = size.height, name = %name, self_id, "game created");
            let world = WorldState::new(*size, name.clone(), *self_id);
            self.world = Some(world);
            return Ok(vec![WorldEvent::Repaint]);
        }

        let world = self.world.as_mut().ok_or(SessionError::NotCreated { event: event.name() })?;
        Ok(world.apply(&event))
    }

    /// Draw instructions for the whole current world.
    pub fn repaint(&self) -> Vec<WorldEvent> {
        self.world.as_ref().map(WorldState::paint_all).unwrap_or_default()
    }

    pub fn active_hues(&self) -> Vec<Hue> {
        self.world.as_ref().map(WorldState::active_hues).unwrap_or_default()
    }

    /// Connection closed: drop the world immediately.
    pub fn close(&mut self) {
        if self.world.take().is_some() {
            info!(messages = self.messages, "game session closed");
        }
    }
}
