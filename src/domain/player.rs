/// Players and their snake bodies.
///
/// A player owns one or more independent bodies (multi-snake mode).
/// Body index 0 is the head, the last index is the tail.

use std::collections::{BTreeMap, VecDeque};

use super::coord::Coord;

pub type PlayerId = u16;
pub type BodyId = u16;
/// Colour hue in degrees, 0..360.
pub type Hue = u16;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Body {
    cells: VecDeque<Coord>,
}

impl Body {
    /// A fresh one-cell body (spawn / respawn "egg").
    pub fn single(head: Coord) -> Self {
        let mut cells = VecDeque::with_capacity(8);
        cells.push_back(head);
        Body { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Coord> {
        self.cells.get(index).copied()
    }

    pub fn head(&self) -> Option<Coord> {
        self.cells.front().copied()
    }

    pub fn tail(&self) -> Option<Coord> {
        self.cells.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }

    pub fn grow_head(&mut self, head: Coord) {
        self.cells.push_front(head);
    }

    pub fn shrink(&mut self) -> Option<Coord> {
        self.cells.pop_back()
    }

    /// Head becomes tail: cell `i` moves to `len - 1 - i`.
    pub fn reverse(&mut self) {
        self.cells.make_contiguous().reverse();
    }
}

impl From<Vec<Coord>> for Body {
    fn from(cells: Vec<Coord>) -> Self {
        Body { cells: cells.into() }
    }
}

impl FromIterator<Coord> for Body {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Body { cells: iter.into_iter().collect() }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub hue: Hue,
    pub bodies: BTreeMap<BodyId, Body>,
}

impl Player {
    pub fn new(id: PlayerId, hue: Hue) -> Self {
        Player { id, hue, bodies: BTreeMap::new() }
    }

    pub fn cell_count(&self) -> usize {
        self.bodies.values().map(Body::len).sum()
    }
}
