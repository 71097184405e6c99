/// Keyboard handling for the viewer.
///
/// Only two actions exist: quit (q, Esc, Ctrl-C) and pause (space).
/// Both are edge-triggered on Press events; Release and Repeat are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Quit,
    TogglePause,
}

pub struct InputState {
    actions: Vec<Action>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { actions: Vec::with_capacity(4) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame.
    pub fn drain_events(&mut self) {
        self.actions.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if let Some(action) = map_key(&key) {
                    self.actions.push(action);
                }
            }
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.actions.contains(&Action::Quit)
    }

    /// Number of pause presses this frame; an odd count flips the state.
    pub fn pause_toggled(&self) -> bool {
        self.actions.iter().filter(|a| **a == Action::TogglePause).count() % 2 == 1
    }
}

fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('C') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::Quit)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::TogglePause),
        _ => None,
    }
}
